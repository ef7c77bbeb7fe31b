//! Read snapshots over a single connection.
//!
//! # Responsibility
//! - Group the reads of one use-case into a single deferred transaction.
//!
//! # Invariants
//! - The connection is back in autocommit mode when the closure returns,
//!   whether it succeeded or failed.

use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Runs `read` inside one deferred read transaction.
///
/// Every query issued by `read` observes the same database snapshot, so a
/// concurrent writer can never be seen half-applied. The transaction is
/// committed on success and rolled back on error.
pub fn with_read_snapshot<T, E>(
    conn: &Connection,
    read: impl FnOnce(&Connection) -> Result<T, E>,
) -> Result<T, E>
where
    E: From<rusqlite::Error>,
{
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Deferred)?;
    let value = read(&tx)?;
    tx.commit()?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::with_read_snapshot;
    use crate::db::{open_db_in_memory, DbError};

    #[test]
    fn snapshot_returns_value_and_leaves_autocommit_mode() {
        let conn = open_db_in_memory().unwrap();
        let count: i64 = with_read_snapshot(&conn, |conn| {
            conn.query_row("SELECT COUNT(*) FROM projects;", [], |row| row.get(0))
                .map_err(DbError::from)
        })
        .unwrap();
        assert_eq!(count, 0);
        assert!(conn.is_autocommit());
    }

    #[test]
    fn failed_read_rolls_back() {
        let conn = open_db_in_memory().unwrap();
        let result: Result<(), DbError> = with_read_snapshot(&conn, |conn| {
            conn.query_row("SELECT * FROM missing_table;", [], |_| Ok(()))
                .map_err(DbError::from)
        });
        assert!(result.is_err());
        assert!(conn.is_autocommit());
    }
}
