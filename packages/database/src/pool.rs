//! A small round-robin pool of `DuckDB` connections.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use duckdb::Connection;

use crate::{DbError, dataset};

/// Simple round-robin pool of `DuckDB` connections sharing one database.
///
/// `duckdb::Connection` is `Send` but not `Sync`, so each connection is
/// wrapped in a `Mutex`. The pool hands out connections round-robin via
/// an atomic counter; a caller holds its connection exclusively until the
/// guard is dropped, so no two queries ever share a connection.
pub struct DuckDbPool {
    connections: Vec<Mutex<Connection>>,
    next: AtomicUsize,
}

impl DuckDbPool {
    /// Opens the dataset at `path` and builds a pool of `size` connections
    /// to it.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the dataset cannot be opened.
    pub fn open(path: &Path, size: usize) -> Result<Self, DbError> {
        Self::from_connection(dataset::open(path)?, size)
    }

    /// Builds a pool of `size` connections (at least one) by cloning
    /// `conn`. Clones share the same database instance, so tables and
    /// views created on `conn` are visible through every pooled
    /// connection.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a connection cannot be cloned.
    pub fn from_connection(conn: Connection, size: usize) -> Result<Self, DbError> {
        let size = size.max(1);
        let mut connections = Vec::with_capacity(size);

        for _ in 1..size {
            connections.push(Mutex::new(conn.try_clone()?));
        }
        connections.push(Mutex::new(conn));

        log::debug!("Opened DuckDB pool with {size} connections");

        Ok(Self {
            connections,
            next: AtomicUsize::new(0),
        })
    }

    /// Returns the number of pooled connections.
    #[must_use]
    pub fn size(&self) -> usize {
        self.connections.len()
    }

    /// Acquires the next connection from the pool (round-robin), blocking
    /// until it is free.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::PoolPoisoned`] if a previous holder panicked.
    pub fn acquire(&self) -> Result<MutexGuard<'_, Connection>, DbError> {
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.connections.len();
        self.connections[idx]
            .lock()
            .map_err(|_| DbError::PoolPoisoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pooled_connections_share_the_database() {
        let conn = dataset::open_empty().unwrap();
        conn.execute_batch(
            "INSERT INTO locations VALUES
             ('LOC-1', 'A', 'A County', 'CA', 1, 1, 1, 1, 1, 1, 0, 0);",
        )
        .unwrap();

        let pool = DuckDbPool::from_connection(conn, 3).unwrap();
        assert_eq!(pool.size(), 3);

        for _ in 0..pool.size() {
            let conn = pool.acquire().unwrap();
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM locations", [], |row| row.get(0))
                .unwrap();
            assert_eq!(count, 1);
        }
    }

    #[test]
    fn zero_size_still_yields_one_connection() {
        let pool = DuckDbPool::from_connection(dataset::open_empty().unwrap(), 0).unwrap();
        assert_eq!(pool.size(), 1);
        assert!(pool.acquire().is_ok());
    }
}
