//! # comply-db
//!
//! libSQL store for Comply's tenant tree and audit log.
//!
//! Handles all relational state: organizations, regulations, articles,
//! obligations, systems, obligation/system mappings, and the append-only audit
//! log. Referential and uniqueness invariants live in the schema (composite
//! tenant-scoped foreign keys, scoped `UNIQUE` indexes, cascading deletes), so
//! no code path can bypass them.
//!
//! All access goes through one connection guarded by an async mutex. A
//! [`WriteTx`] holds that mutex for its whole lifetime, so readers never
//! observe a half-applied cascade or batch.

pub mod audit;
pub mod error;
pub mod export;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod service;
pub mod updates;

#[cfg(test)]
mod test_support;

use std::ops::Deref;

use error::DatabaseError;
use libsql::Builder;
use tokio::sync::{Mutex, MutexGuard};

/// Central database handle for all Comply state operations.
pub struct ComplyDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
    lock: Mutex<()>,
}

impl ComplyDb {
    /// Open a local database at the given path (`":memory:"` for tests).
    ///
    /// Enables foreign keys and runs migrations automatically.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let comply_db = Self {
            db,
            conn,
            lock: Mutex::new(()),
        };
        comply_db.run_migrations().await?;
        Ok(comply_db)
    }

    /// Access the underlying libSQL connection without taking the store lock.
    ///
    /// Intended for tests and diagnostics. Repository code goes through
    /// [`Self::lock`] or [`Self::begin_write`].
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Take the store lock for a consistent multi-statement read.
    pub async fn lock(&self) -> ConnGuard<'_> {
        ConnGuard {
            _guard: self.lock.lock().await,
            conn: &self.conn,
        }
    }

    /// Take the store lock and open a transaction.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if `BEGIN` fails.
    pub async fn begin_write(&self) -> Result<WriteTx<'_>, DatabaseError> {
        let guard = self.lock.lock().await;
        let tx = self.conn.transaction().await?;
        Ok(WriteTx { tx, _guard: guard })
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"obl-a3f8b2c1"`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        helpers::generate_id(&self.conn, prefix).await
    }
}

/// Shared access to the connection while holding the store lock.
pub struct ConnGuard<'a> {
    _guard: MutexGuard<'a, ()>,
    conn: &'a libsql::Connection,
}

impl Deref for ConnGuard<'_> {
    type Target = libsql::Connection;

    fn deref(&self) -> &Self::Target {
        self.conn
    }
}

/// An open transaction that owns the store lock until commit or rollback.
///
/// Must be finished explicitly: dropping it leaves the rollback to `SQLite`'s
/// next `BEGIN`, which fails.
pub struct WriteTx<'a> {
    tx: libsql::Transaction,
    _guard: MutexGuard<'a, ()>,
}

impl WriteTx<'_> {
    /// A handle to the same connection, scoped inside this transaction.
    #[must_use]
    pub fn connection(&self) -> libsql::Connection {
        let conn: &libsql::Connection = &self.tx;
        conn.clone()
    }

    /// Commit and release the store lock.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if `COMMIT` fails.
    pub async fn commit(self) -> Result<(), DatabaseError> {
        self.tx.commit().await?;
        Ok(())
    }

    /// Roll back and release the store lock.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if `ROLLBACK` fails.
    pub async fn rollback(self) -> Result<(), DatabaseError> {
        self.tx.rollback().await?;
        Ok(())
    }

    /// Commit on `Ok`, roll back on `Err`, and pass the result through.
    ///
    /// # Errors
    ///
    /// Returns the original error on `Err`, or the commit error if committing fails.
    pub async fn finish<T>(self, result: Result<T, DatabaseError>) -> Result<T, DatabaseError> {
        match result {
            Ok(value) => {
                self.commit().await?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback) = self.rollback().await {
                    tracing::error!(error = %rollback, "rollback failed after {e}");
                }
                Err(e)
            }
        }
    }
}

impl Deref for WriteTx<'_> {
    type Target = libsql::Connection;

    fn deref(&self) -> &Self::Target {
        &self.tx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    async fn test_db() -> ComplyDb {
        ComplyDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;

        let tables = [
            "organizations",
            "regulations",
            "articles",
            "obligations",
            "systems",
            "obligation_system_mappings",
            "audit_log",
        ];
        for table in &tables {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [*table],
                )
                .await
                .unwrap();
            let row = rows.next().await.unwrap();
            assert!(row.is_some(), "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn foreign_keys_enabled() {
        let db = test_db().await;
        let mut rows = db.conn().query("PRAGMA foreign_keys", ()).await.unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 1);
    }

    #[tokio::test]
    async fn generate_id_correct_format() {
        let db = test_db().await;
        let id = db.generate_id("obl").await.unwrap();
        assert!(id.starts_with("obl-"), "ID should start with 'obl-': {id}");
        assert_eq!(id.len(), 12, "3 prefix + 1 dash + 8 hex: {id}");
        assert!(id[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn generate_id_all_prefixes() {
        let db = test_db().await;
        for prefix in comply_core::ids::ALL_PREFIXES {
            let id = db.generate_id(prefix).await.unwrap();
            assert!(id.starts_with(&format!("{prefix}-")));
        }
    }

    #[tokio::test]
    async fn generate_id_uniqueness() {
        let db = test_db().await;
        let mut ids = HashSet::new();
        for _ in 0..100 {
            let id = db.generate_id("tst").await.unwrap();
            assert!(ids.insert(id.clone()), "Duplicate ID generated: {id}");
        }
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn rolled_back_write_leaves_no_row() {
        let db = test_db().await;

        let tx = db.begin_write().await.unwrap();
        tx.execute(
            "INSERT INTO organizations (id, name, slug) VALUES ('org-t1', 'T', 't')",
            (),
        )
        .await
        .unwrap();
        tx.rollback().await.unwrap();

        let guard = db.lock().await;
        let mut rows = guard
            .query("SELECT COUNT(*) FROM organizations", ())
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 0);
    }

    #[tokio::test]
    async fn audit_log_rejects_updates() {
        let db = test_db().await;
        db.conn()
            .execute(
                "INSERT INTO organizations (id, name, slug) VALUES ('org-t1', 'T', 't')",
                (),
            )
            .await
            .unwrap();
        db.conn()
            .execute(
                "INSERT INTO audit_log (id, organization_id, action, entity_type, entity_id, diff, created_at)
                 VALUES ('aud-t1', 'org-t1', 'created', 'organization', 'org-t1', '{\"before\":null,\"after\":{}}', '2026-01-01T00:00:00+00:00')",
                (),
            )
            .await
            .unwrap();

        let result = db
            .conn()
            .execute("UPDATE audit_log SET action = 'deleted' WHERE id = 'aud-t1'", ())
            .await;
        assert!(result.is_err(), "audit_log must be append-only");
    }
}
