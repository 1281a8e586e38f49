//! Database layer for download-sync
//!
//! Handles SQLite persistence for download records and implements the
//! [`RecordStore`](crate::store::RecordStore) contract.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`] — Database lifecycle, schema migrations
//! - [`records`] — Record CRUD and batched listing

use sqlx::{FromRow, sqlite::SqlitePool};

use crate::types::{DownloadId, DownloadRecord, Status};

mod migrations;
mod records;

/// Download record row from the database
#[derive(Debug, Clone, FromRow)]
pub struct RecordRow {
    /// Unique download id (primary key)
    pub id: i64,
    /// Display file name
    pub file_name: String,
    /// Integer status code (see [`Status::from_i32`])
    pub status: i32,
    /// Unix timestamp when the row was first inserted
    pub created_at: i64,
}

impl From<RecordRow> for DownloadRecord {
    fn from(row: RecordRow) -> Self {
        DownloadRecord {
            id: DownloadId(row.id),
            file_name: row.file_name,
            status: Status::from_i32(row.status),
        }
    }
}

/// Database handle for download-sync
pub struct Database {
    pool: SqlitePool,
    list_batch_size: i64,
}

#[cfg(test)]
impl Database {
    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
