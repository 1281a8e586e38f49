//! Shared test helpers: recording doubles for the store and executor.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;

use crate::dispatcher::StateView;
use crate::error::{Error, Result};
use crate::executor::DownloadExecutor;
use crate::store::{RecordBatchStream, RecordStore};
use crate::types::{DownloadId, DownloadRecord, Status};

/// Store double that records every call and serves `list` from a seeded
/// durable set, in batches of `list_batch_size`.
pub(crate) struct RecordingStore {
    pub(crate) added: Mutex<Vec<DownloadRecord>>,
    pub(crate) removed: Mutex<Vec<DownloadRecord>>,
    pub(crate) updated: Mutex<Vec<DownloadRecord>>,
    pub(crate) durable: Mutex<Vec<DownloadRecord>>,
    pub(crate) fail_writes: AtomicBool,
    pub(crate) fail_list: AtomicBool,
    pub(crate) list_batch_size: usize,
}

impl Default for RecordingStore {
    fn default() -> Self {
        Self {
            added: Mutex::new(Vec::new()),
            removed: Mutex::new(Vec::new()),
            updated: Mutex::new(Vec::new()),
            durable: Mutex::new(Vec::new()),
            fail_writes: AtomicBool::new(false),
            fail_list: AtomicBool::new(false),
            list_batch_size: 2,
        }
    }
}

impl RecordingStore {
    pub(crate) fn with_durable(records: Vec<DownloadRecord>) -> Self {
        Self {
            durable: Mutex::new(records),
            ..Self::default()
        }
    }

    fn check_writes(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Other("storage unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for RecordingStore {
    async fn add(&self, record: &DownloadRecord) -> Result<()> {
        self.check_writes()?;
        self.added.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn remove(&self, record: &DownloadRecord) -> Result<()> {
        self.check_writes()?;
        self.removed.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn update(&self, record: &DownloadRecord) -> Result<()> {
        self.check_writes()?;
        self.updated.lock().unwrap().push(record.clone());
        Ok(())
    }

    fn list(&self) -> RecordBatchStream {
        if self.fail_list.load(Ordering::SeqCst) {
            let failed: Vec<Result<Vec<DownloadRecord>>> =
                vec![Err(Error::Other("durable listing unavailable".into()))];
            return futures::stream::iter(failed).boxed();
        }

        let records = self.durable.lock().unwrap().clone();
        let batches: Vec<Result<Vec<DownloadRecord>>> = records
            .chunks(self.list_batch_size.max(1))
            .map(|chunk| Ok(chunk.to_vec()))
            .collect();
        futures::stream::iter(batches).boxed()
    }

    fn same_for_storage(&self, old: &DownloadRecord, new: &DownloadRecord) -> bool {
        old.file_name == new.file_name && old.status == new.status
    }
}

/// Executor double that records signaled ids and can be made to fail.
#[derive(Default)]
pub(crate) struct RecordingExecutor {
    pub(crate) signaled: Mutex<Vec<DownloadId>>,
    pub(crate) fail: AtomicBool,
}

impl DownloadExecutor for RecordingExecutor {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn signal(&self, id: DownloadId) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Executor(format!("signal rejected for download {id}")));
        }
        self.signaled.lock().unwrap().push(id);
        Ok(())
    }
}

/// Build a record with the given id, name, and status.
pub(crate) fn record(id: i64, file_name: &str, status: Status) -> DownloadRecord {
    DownloadRecord::new(id, file_name, status)
}

/// Build a shared map pre-populated with the given records, plus a view of it.
pub(crate) fn state_of(
    records: &[DownloadRecord],
) -> (
    Arc<RwLock<HashMap<DownloadId, DownloadRecord>>>,
    StateView,
) {
    let map: HashMap<_, _> = records.iter().cloned().map(|r| (r.id, r)).collect();
    let shared = Arc::new(RwLock::new(map));
    (Arc::clone(&shared), StateView::new(shared))
}

/// Poll a condition until it holds, panicking after ~2 seconds.
///
/// Background persistence is fire-and-forget, so tests observe its outcome by
/// polling rather than awaiting a completion the router never exposes.
pub(crate) async fn wait_until<F>(cond: F, what: &str)
where
    F: Fn() -> bool,
{
    for _ in 0..400 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("timed out waiting for {what}");
}
