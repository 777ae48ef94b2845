//! Repository contracts and SQLite implementations.
//!
//! # Responsibility
//! - Expose the backend operations the journal consumes: select-with-filter,
//!   insert, update and delete, always scoped by owner.
//! - Keep SQL inside the persistence boundary.
//!
//! # Invariants
//! - Write paths validate their input before issuing SQL.
//! - Read paths reject invalid persisted rows instead of masking them.

pub mod entry_repo;
pub mod link_repo;

use crate::db::migrations::{latest_version, schema_version};
use entry_repo::{RepoError, RepoResult};
use rusqlite::Connection;

/// Rejects connections that were not opened through `db::open_*`.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    tables: &[&'static str],
) -> RepoResult<()> {
    let actual_version = schema_version(conn)?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &table in tables {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    Ok(())
}
