//! Logical backup and restore through the `sqlite3` command-line client.
//!
//! These are operator tools. They run outside the ledger's runtime path and
//! must not be pointed at a database another process is writing.

use std::io::{ErrorKind, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use crate::SqliteError;

/// Name of the external client binary.
pub const SQLITE3_BIN: &str = "sqlite3";

/// Produce a SQL text dump of the database at `path`.
pub fn dump(path: &Path) -> Result<String, SqliteError> {
    let output = Command::new(SQLITE3_BIN).arg(path).arg(".dump").output()?;
    if !output.status.success() {
        return Err(SqliteError::Command(format!(
            ".dump exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    String::from_utf8(output.stdout).map_err(|e| SqliteError::Command(e.to_string()))
}

/// Destroy the database at `path` and recreate it from `sql`.
///
/// A missing file is not an error.
pub fn reset(path: &Path, sql: &str) -> Result<(), SqliteError> {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::info!(path = %path.display(), "removed database file"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    let mut child = Command::new(SQLITE3_BIN)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()?;
    {
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| SqliteError::Command("sqlite3 stdin unavailable".to_string()))?;
        writeln!(stdin, ".open {}", dot_command_arg(path)?)?;
        stdin.write_all(sql.as_bytes())?;
        stdin.write_all(b"\n")?;
    }
    let output = child.wait_with_output()?;
    if !output.status.success() {
        return Err(SqliteError::Command(format!(
            "restore exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    tracing::info!(path = %path.display(), bytes = sql.len(), "restored database from SQL");
    Ok(())
}

/// Double-quote `path` for a dot-command. The shell resolves backslash
/// escapes inside double quotes, so backslashes and `"` are escaped.
fn dot_command_arg(path: &Path) -> Result<String, SqliteError> {
    let raw = path.to_str().ok_or_else(|| {
        SqliteError::Command(format!("path {} is not valid UTF-8", path.display()))
    })?;
    let mut quoted = String::with_capacity(raw.len() + 2);
    quoted.push('"');
    for c in raw.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    Ok(quoted)
}
