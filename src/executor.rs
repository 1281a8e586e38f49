//! Execution service capability interface
//!
//! The middleware does not transfer anything itself; it signals an
//! [`DownloadExecutor`] to begin or resume work on a download. The trait
//! decouples routing from any particular transfer engine, so an HTTP puller,
//! a local file mover, or a test double can be swapped in without touching
//! router logic.

use tokio::sync::mpsc;

use crate::error::{Error, Result};
use crate::types::DownloadId;

/// External subsystem that performs the actual download transfer
///
/// `signal` is called synchronously from the dispatch loop and must not
/// block; implementations hand the id off to their own scheduling.
pub trait DownloadExecutor: Send + Sync {
    /// Human-readable name for logging
    fn name(&self) -> &'static str;

    /// Request that execution of this download begins or resumes
    ///
    /// # Errors
    ///
    /// Returns an error when the request cannot be handed off (for example
    /// the executor has shut down). The middleware propagates the error to
    /// its caller without attempting recovery.
    fn signal(&self, id: DownloadId) -> Result<()>;
}

/// Executor used when no transfer engine is attached
///
/// Signals are acknowledged and dropped. Useful for embedding the store
/// without an execution backend and for tests.
pub struct NoOpExecutor;

impl DownloadExecutor for NoOpExecutor {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn signal(&self, id: DownloadId) -> Result<()> {
        tracing::debug!(download_id = id.0, "no-op executor dropping signal");
        Ok(())
    }
}

/// Executor that forwards signals into an unbounded channel
///
/// The embedding application drains the receiver returned by
/// [`ChannelExecutor::new`] and runs the actual transfers. Sends never block;
/// a signal fails only once the receiver has been dropped.
pub struct ChannelExecutor {
    tx: mpsc::UnboundedSender<DownloadId>,
}

impl ChannelExecutor {
    /// Create the executor and the receiver the worker side consumes
    pub fn new() -> (Self, mpsc::UnboundedReceiver<DownloadId>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl DownloadExecutor for ChannelExecutor {
    fn name(&self) -> &'static str {
        "channel"
    }

    fn signal(&self, id: DownloadId) -> Result<()> {
        self.tx.send(id).map_err(|_| {
            Error::Executor(format!(
                "execution channel closed, dropping signal for download {id}"
            ))
        })
    }
}
