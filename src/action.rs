//! Actions routed through the dispatch pipeline

use crate::types::{DownloadId, DownloadRecord};

/// A state-changing request processed by the dispatcher
///
/// Every action passes through [`crate::ReconcileMiddleware`] exactly once
/// before the reducer applies it to the in-memory map. The middleware
/// recognizes the first four variants; anything else is forwarded untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Introduce a download into the in-memory map
    Add {
        /// The record to add
        record: DownloadRecord,
        /// True when the record is being reintroduced from durable storage
        /// rather than newly created; restored records are not re-persisted
        restored: bool,
    },

    /// Remove a download from the in-memory map and durable storage
    Remove {
        /// Download ID
        id: DownloadId,
    },

    /// Replace a download's record
    Update {
        /// The new record; keyed by `record.id`
        record: DownloadRecord,
    },

    /// Reintroduce downloads that are durable but missing from memory
    RestoreDownloadsState,

    /// Stop the dispatch loop after the reducer observes this action
    Shutdown,
}
