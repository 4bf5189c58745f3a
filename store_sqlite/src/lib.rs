//! SQLite primary-store backend for the custodial bridge ledger.
//!
//! Implements the `custody-store` traits on a single-file SQLite database.
//! Table and column names follow the legacy schema (`usedDepositAddresses`,
//! `mintDepositAddresses`, `withdrawals`) so existing database files and
//! their SQL dumps stay usable.

pub mod deposit;
pub mod environment;
pub mod error;
pub mod maintenance;
pub mod migration;
pub mod mint;
pub mod withdrawal;

pub use environment::SqliteLedgerStore;
pub use error::SqliteError;
pub use maintenance::{dump, reset};
pub use migration::{Migrator, CURRENT_SCHEMA_VERSION};
