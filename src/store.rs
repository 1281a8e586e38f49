//! Persistent store contract for download records

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::Result;
use crate::types::DownloadRecord;

/// A finite stream of record batches produced by [`RecordStore::list`]
///
/// Each batch is an ordered, non-empty sequence of records; the stream ends
/// after the last batch. Every call to `list` starts a fresh pass over the
/// durable set.
pub type RecordBatchStream = BoxStream<'static, Result<Vec<DownloadRecord>>>;

/// Durable keyed storage for download records
///
/// Implementations must tolerate concurrent invocation: persistence calls are
/// scheduled fire-and-forget and may complete in any order. Correctness rests
/// on every write being an idempotent upsert or delete keyed by the record id,
/// carrying the latest value known at scheduling time.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert or replace a record, keyed by its id
    async fn add(&self, record: &DownloadRecord) -> Result<()>;

    /// Delete the record with this record's id; no-op if absent
    async fn remove(&self, record: &DownloadRecord) -> Result<()>;

    /// Insert or replace a record, keyed by its id
    async fn update(&self, record: &DownloadRecord) -> Result<()>;

    /// Produce a lazy, restartable stream of record batches covering the
    /// whole durable set
    fn list(&self) -> RecordBatchStream;

    /// Whether two records are equal in the fields this store persists
    ///
    /// Used to skip storage calls for updates that would not change the
    /// durable copy.
    fn same_for_storage(&self, old: &DownloadRecord, new: &DownloadRecord) -> bool;
}
