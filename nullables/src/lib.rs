//! Nullable infrastructure for deterministic testing.
//!
//! External dependencies are abstracted behind traits. This crate provides
//! test-friendly implementations that:
//! - Record what they were asked to do
//! - Can be told to fail on demand
//! - Never touch the network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod audit;

pub use audit::{AuditRecorder, NullAuditBackend};
