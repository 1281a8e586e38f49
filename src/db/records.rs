//! Download record CRUD and batched listing.

use async_trait::async_trait;
use futures::StreamExt;

use crate::error::{DatabaseError, Error, Result};
use crate::store::{RecordBatchStream, RecordStore};
use crate::types::{DownloadId, DownloadRecord};

use super::{Database, RecordRow};

impl Database {
    /// Insert or replace a record, keyed by its id
    ///
    /// The `created_at` timestamp is set on first insert and preserved on
    /// later upserts of the same id.
    pub async fn upsert_record(&self, record: &DownloadRecord) -> Result<()> {
        let now = chrono::Utc::now().timestamp();

        sqlx::query(
            r#"
            INSERT INTO downloads (id, file_name, status, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                file_name = excluded.file_name,
                status = excluded.status
            "#,
        )
        .bind(record.id)
        .bind(&record.file_name)
        .bind(record.status.to_i32())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "failed to upsert download: {e}"
            )))
        })?;

        Ok(())
    }

    /// Get a record by ID
    pub async fn get_record(&self, id: DownloadId) -> Result<Option<DownloadRecord>> {
        let row = sqlx::query_as::<_, RecordRow>(
            "SELECT id, file_name, status, created_at FROM downloads WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "failed to get download: {e}"
            )))
        })?;

        Ok(row.map(DownloadRecord::from))
    }

    /// Delete a record by ID; no-op if absent
    pub async fn delete_record(&self, id: DownloadId) -> Result<()> {
        sqlx::query("DELETE FROM downloads WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "failed to delete download: {e}"
                )))
            })?;

        Ok(())
    }

    /// Count all stored records
    pub async fn count_records(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM downloads")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "failed to count downloads: {e}"
                )))
            })
    }

    /// Stream the durable set as keyset-paginated batches ordered by id
    ///
    /// Each call starts a fresh pass from the lowest id.
    fn list_batches(&self) -> RecordBatchStream {
        let pool = self.pool.clone();
        let limit = self.list_batch_size;

        futures::stream::try_unfold(i64::MIN, move |after| {
            let pool = pool.clone();
            async move {
                let rows = sqlx::query_as::<_, RecordRow>(
                    "SELECT id, file_name, status, created_at FROM downloads \
                     WHERE id > ? ORDER BY id LIMIT ?",
                )
                .bind(after)
                .bind(limit)
                .fetch_all(&pool)
                .await
                .map_err(|e| {
                    Error::Database(DatabaseError::QueryFailed(format!(
                        "failed to list downloads: {e}"
                    )))
                })?;

                match rows.last() {
                    None => Ok(None),
                    Some(last) => {
                        let next_after = last.id;
                        let batch: Vec<DownloadRecord> =
                            rows.into_iter().map(DownloadRecord::from).collect();
                        Ok(Some((batch, next_after)))
                    }
                }
            }
        })
        .boxed()
    }
}

#[async_trait]
impl RecordStore for Database {
    async fn add(&self, record: &DownloadRecord) -> Result<()> {
        self.upsert_record(record).await
    }

    async fn remove(&self, record: &DownloadRecord) -> Result<()> {
        self.delete_record(record.id).await
    }

    async fn update(&self, record: &DownloadRecord) -> Result<()> {
        self.upsert_record(record).await
    }

    fn list(&self) -> RecordBatchStream {
        self.list_batches()
    }

    fn same_for_storage(&self, old: &DownloadRecord, new: &DownloadRecord) -> bool {
        old.file_name == new.file_name && old.status == new.status
    }
}
