//! # download-sync
//!
//! Reconciliation middleware for download state stores.
//!
//! The crate mediates between an in-memory map of download records, a durable
//! keyed store, and an out-of-process execution service. Every state-changing
//! action flows through the [`ReconcileMiddleware`], which decides when to
//! forward the action to the reducer, whether to persist or delete the
//! durable copy, and whether to signal the execution service to begin or
//! continue work. On startup, `Action::RestoreDownloadsState` reintroduces
//! durable records that are missing from memory and re-signals the ones that
//! were still running.
//!
//! ## Design Philosophy
//!
//! - **Single sequence** - Actions are routed one at a time; all decision
//!   logic is synchronous within that sequence.
//! - **Fire-and-forget persistence** - Storage calls run on background tasks
//!   with their own error boundaries; the in-memory map stays authoritative.
//! - **Pluggable execution** - The transfer engine is a capability interface;
//!   swap in an HTTP puller, a local mover, or a test double.
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use download_sync::{
//!     Action, Config, Database, Dispatcher, DownloadRecord, NoOpExecutor, Status,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let db = Arc::new(Database::new(&config).await?);
//!     let dispatcher = Dispatcher::new(db, Arc::new(NoOpExecutor), &config);
//!
//!     let handle = dispatcher.handle();
//!     tokio::spawn(dispatcher.run());
//!
//!     // Catch up with whatever the last process left behind
//!     handle.dispatch(Action::RestoreDownloadsState);
//!
//!     // Accept a new download
//!     handle.dispatch(Action::Add {
//!         record: DownloadRecord::new(1, "report.pdf", Status::Initiated),
//!         restored: false,
//!     });
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Actions routed through the pipeline
pub mod action;
/// Configuration types
pub mod config;
/// SQLite persistence layer
pub mod db;
/// Store and dispatch loop
pub mod dispatcher;
/// Error types
pub mod error;
/// Execution service capability interface
pub mod executor;
/// Reconciliation middleware (the action router)
pub mod middleware;
/// Persistent store contract
pub mod store;
/// Core types
pub mod types;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use action::Action;
pub use config::Config;
pub use db::Database;
pub use dispatcher::{DispatchHandle, Dispatcher, StateView};
pub use error::{DatabaseError, Error, Result};
pub use executor::{ChannelExecutor, DownloadExecutor, NoOpExecutor};
pub use middleware::ReconcileMiddleware;
pub use store::{RecordBatchStream, RecordStore};
pub use types::{DownloadId, DownloadRecord, Event, Status};

/// Helper function to run the dispatcher with graceful signal handling.
///
/// Spawns the dispatch loop, waits for a termination signal, then dispatches
/// [`Action::Shutdown`] and awaits the loop.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal
///   registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Errors
///
/// Returns an error if the dispatch loop task panics.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use download_sync::{Config, Database, Dispatcher, NoOpExecutor, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = Config::default();
///     let db = Arc::new(Database::new(&config).await?);
///     let dispatcher = Dispatcher::new(db, Arc::new(NoOpExecutor), &config);
///
///     run_with_shutdown(dispatcher).await?;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(dispatcher: Dispatcher) -> Result<()> {
    let handle = dispatcher.handle();
    let loop_task = tokio::spawn(dispatcher.run());

    wait_for_signal().await;
    handle.dispatch(Action::Shutdown);

    loop_task
        .await
        .map_err(|e| Error::Other(format!("dispatch loop task failed: {e}")))
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Signal registration may fail in restricted environments (containers, tests)
    match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("Received SIGTERM signal"),
                _ = sigint.recv() => tracing::info!("Received SIGINT signal (Ctrl+C)"),
            }
        }
        (Ok(mut sigterm), Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            sigterm.recv().await;
            tracing::info!("Received SIGTERM signal");
        }
        (Err(e), Ok(mut sigint)) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            sigint.recv().await;
            tracing::info!("Received SIGINT signal (Ctrl+C)");
        }
        (Err(e), Err(_)) => {
            tracing::error!(error = %e, "Could not register signal handlers, using ctrl_c fallback");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
