//! Reconciliation middleware — the action router.
//!
//! Sits between the dispatcher and the reducer. For every action it decides
//! whether to forward before or after its own work, whether to schedule a
//! persistence call against the [`RecordStore`], and whether to signal the
//! [`DownloadExecutor`]. All decision logic runs synchronously inside the
//! dispatch sequence; storage calls and the restore catch-up run on
//! fire-and-forget tasks with their own error boundaries.

use std::sync::Arc;

use futures::StreamExt;

use crate::action::Action;
use crate::dispatcher::{DispatchHandle, StateView};
use crate::error::Result;
use crate::executor::DownloadExecutor;
use crate::store::RecordStore;


/// Routes actions between the in-memory map, durable storage, and the
/// execution service
///
/// The middleware never holds state of its own: it reads the map through the
/// [`StateView`] passed to each [`handle`](Self::handle) call and mutates it
/// only by letting actions through to the reducer.
pub struct ReconcileMiddleware {
    store: Arc<dyn RecordStore>,
    executor: Arc<dyn DownloadExecutor>,
    dispatch: DispatchHandle,
}

impl ReconcileMiddleware {
    /// Create a middleware over the given store and executor
    ///
    /// `dispatch` re-enters the pipeline; the restore path uses it to emit
    /// synthetic `Add` actions for records found in storage but missing from
    /// memory.
    pub fn new(
        store: Arc<dyn RecordStore>,
        executor: Arc<dyn DownloadExecutor>,
        dispatch: DispatchHandle,
    ) -> Self {
        Self {
            store,
            executor,
            dispatch,
        }
    }

    /// Route one action
    ///
    /// `forward` continues the action through the remainder of the pipeline
    /// and is invoked exactly once. `Add` is forwarded before any side effect
    /// so the reducer sees the record first; every other recognized variant
    /// schedules its side effects and then forwards. Unrecognized actions
    /// pass through untouched.
    ///
    /// # Errors
    ///
    /// Returns an error when the execution service rejects a signal. Storage
    /// failures never surface here; they are logged inside the background
    /// tasks that perform the calls.
    pub fn handle<F>(&self, state: &StateView, forward: F, action: Action) -> Result<()>
    where
        F: FnOnce(Action),
    {
        match action {
            Action::Add { record, restored } => {
                let accepted = record.clone();
                forward(Action::Add { record, restored });

                // Restored records originated from storage and are already durable
                if !restored {
                    let store = Arc::clone(&self.store);
                    let persisted = accepted.clone();
                    tokio::spawn(async move {
                        if let Err(e) = store.add(&persisted).await {
                            tracing::error!(
                                download_id = persisted.id.0,
                                error = %e,
                                "failed to persist new download"
                            );
                        }
                    });
                }

                if !accepted.status.is_terminal() {
                    self.executor.signal(accepted.id)?;
                }
            }
            Action::Remove { id } => {
                if let Some(existing) = state.get(id) {
                    let store = Arc::clone(&self.store);
                    tokio::spawn(async move {
                        if let Err(e) = store.remove(&existing).await {
                            tracing::error!(
                                download_id = existing.id.0,
                                error = %e,
                                "failed to delete stored download"
                            );
                        }
                    });
                }
                forward(Action::Remove { id });
            }
            Action::Update { record } => {
                if let Some(old) = state.get(record.id)
                    && !self.store.same_for_storage(&old, &record)
                {
                    let store = Arc::clone(&self.store);
                    let updated = record.clone();
                    tokio::spawn(async move {
                        if let Err(e) = store.update(&updated).await {
                            tracing::error!(
                                download_id = updated.id.0,
                                error = %e,
                                "failed to persist download update"
                            );
                        }
                    });
                }
                forward(Action::Update { record });
            }
            Action::RestoreDownloadsState => {
                let store = Arc::clone(&self.store);
                let dispatch = self.dispatch.clone();
                let state = state.clone();
                tokio::spawn(async move {
                    restore_missing(store, dispatch, state).await;
                });
                forward(Action::RestoreDownloadsState);
            }
            other => forward(other),
        }

        Ok(())
    }
}

/// Walk the durable set and re-dispatch records missing from memory as
/// restored `Add` actions
///
/// Membership is read from the live map for every record, not from a snapshot
/// taken when the restore was requested: an Add dispatched for an earlier
/// batch may already have landed by the time a later batch arrives.
async fn restore_missing(
    store: Arc<dyn RecordStore>,
    dispatch: DispatchHandle,
    state: StateView,
) {
    let mut batches = store.list();
    let mut restored = 0usize;

    while let Some(batch) = batches.next().await {
        match batch {
            Ok(records) => {
                for record in records {
                    if !state.contains(record.id) {
                        restored += 1;
                        dispatch.dispatch(Action::Add {
                            record,
                            restored: true,
                        });
                    }
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "listing stored downloads failed, restore aborted");
                return;
            }
        }
    }

    tracing::info!(restored_count = restored, "Durable-state restore complete");
}
