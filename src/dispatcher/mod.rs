//! Store and dispatch loop.
//!
//! The [`Dispatcher`] owns the authoritative in-memory map of download
//! records and executes actions strictly one at a time: each action is handed
//! to the [`ReconcileMiddleware`], which forwards it into the reducer at the
//! point its routing contract requires. The reducer is the only writer of the
//! map; everything else sees it through read-only [`StateView`] accessors.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::{broadcast, mpsc};

use crate::action::Action;
use crate::config::Config;
use crate::executor::DownloadExecutor;
use crate::middleware::ReconcileMiddleware;
use crate::store::RecordStore;
use crate::types::{DownloadId, DownloadRecord, Event};


type DownloadMap = HashMap<DownloadId, DownloadRecord>;
type SharedDownloads = Arc<RwLock<DownloadMap>>;

/// Read-only view of the dispatcher's in-memory map
///
/// Cloning is cheap; every read goes to the live map, so two reads through
/// the same view can observe different states.
#[derive(Clone)]
pub struct StateView {
    downloads: SharedDownloads,
}

impl StateView {
    pub(crate) fn new(downloads: SharedDownloads) -> Self {
        Self { downloads }
    }

    /// Get a clone of the record for this id, if present
    pub fn get(&self, id: DownloadId) -> Option<DownloadRecord> {
        self.read().get(&id).cloned()
    }

    /// Whether a record with this id is currently in the map
    pub fn contains(&self, id: DownloadId) -> bool {
        self.read().contains_key(&id)
    }

    /// Clone the entire map as it is right now
    pub fn snapshot(&self) -> DownloadMap {
        self.read().clone()
    }

    /// Number of records currently in the map
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the map is currently empty
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, DownloadMap> {
        self.downloads.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Re-entry point into the dispatch pipeline
///
/// Handles are cheap to clone and safe to use from any task. Actions
/// dispatched after the loop has stopped are dropped with a warning.
#[derive(Clone)]
pub struct DispatchHandle {
    tx: mpsc::UnboundedSender<Action>,
}

impl DispatchHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Action>) -> Self {
        Self { tx }
    }

    /// Enqueue an action for the dispatch loop; never blocks
    pub fn dispatch(&self, action: Action) {
        if self.tx.send(action).is_err() {
            tracing::warn!("dispatch after the loop has stopped, action dropped");
        }
    }
}

/// Owns the in-memory download map and processes actions sequentially
///
/// Construct with [`Dispatcher::new`], hand out [`DispatchHandle`]s and event
/// subscriptions, then drive the loop with [`Dispatcher::run`] (usually via
/// `tokio::spawn`). The loop exits after the reducer observes
/// [`Action::Shutdown`].
pub struct Dispatcher {
    downloads: SharedDownloads,
    middleware: ReconcileMiddleware,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    event_tx: broadcast::Sender<Event>,
}

impl Dispatcher {
    /// Create a dispatcher over the given store and executor
    pub fn new(
        store: Arc<dyn RecordStore>,
        executor: Arc<dyn DownloadExecutor>,
        config: &Config,
    ) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let (event_tx, _rx) = broadcast::channel(config.event_capacity.max(1));
        let downloads: SharedDownloads = Arc::new(RwLock::new(HashMap::new()));

        tracing::info!(executor = executor.name(), "Dispatcher initialized");

        let middleware =
            ReconcileMiddleware::new(store, executor, DispatchHandle::new(action_tx.clone()));

        Self {
            downloads,
            middleware,
            action_tx,
            action_rx,
            event_tx,
        }
    }

    /// Get a handle for dispatching actions into the loop
    pub fn handle(&self) -> DispatchHandle {
        DispatchHandle::new(self.action_tx.clone())
    }

    /// Subscribe to reducer events
    ///
    /// Multiple subscribers are supported; each receives all events
    /// independently. A subscriber that falls behind by more than the
    /// configured capacity receives `RecvError::Lagged`.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get a read-only view of the in-memory map
    pub fn state(&self) -> StateView {
        StateView::new(Arc::clone(&self.downloads))
    }

    /// Process actions until `Shutdown` is reduced
    ///
    /// Consumes the dispatcher; run it on its own task. Execution-service
    /// signal failures are logged and do not stop the loop.
    pub async fn run(mut self) {
        tracing::info!("Dispatch loop started");

        while let Some(action) = self.action_rx.recv().await {
            let is_shutdown = matches!(action, Action::Shutdown);

            let state = StateView::new(Arc::clone(&self.downloads));
            let downloads = Arc::clone(&self.downloads);
            let event_tx = self.event_tx.clone();

            let routed = self.middleware.handle(
                &state,
                move |action| reduce(&downloads, &event_tx, action),
                action,
            );
            if let Err(e) = routed {
                tracing::error!(error = %e, "execution service signal failed");
            }

            if is_shutdown {
                break;
            }
        }

        tracing::info!("Dispatch loop stopped");
    }
}

/// Apply a forwarded action to the map and emit the matching event
fn reduce(downloads: &SharedDownloads, event_tx: &broadcast::Sender<Event>, action: Action) {
    match action {
        Action::Add { record, restored } => {
            let id = record.id;
            let file_name = record.file_name.clone();
            write(downloads).insert(id, record);
            emit(
                event_tx,
                Event::Added {
                    id,
                    file_name,
                    restored,
                },
            );
        }
        Action::Remove { id } => {
            if write(downloads).remove(&id).is_some() {
                emit(event_tx, Event::Removed { id });
            }
        }
        Action::Update { record } => {
            let mut map = write(downloads);
            if let Some(slot) = map.get_mut(&record.id) {
                let id = record.id;
                let status = record.status;
                *slot = record;
                drop(map);
                emit(event_tx, Event::Updated { id, status });
            }
        }
        Action::RestoreDownloadsState => {
            emit(event_tx, Event::RestoreRequested);
        }
        Action::Shutdown => {
            emit(event_tx, Event::Shutdown);
        }
    }
}

/// Emit an event to all subscribers
///
/// If there are no active subscribers the event is silently dropped; the
/// pipeline does not depend on anyone listening.
fn emit(event_tx: &broadcast::Sender<Event>, event: Event) {
    event_tx.send(event).ok();
}

fn write(downloads: &SharedDownloads) -> RwLockWriteGuard<'_, DownloadMap> {
    downloads.write().unwrap_or_else(PoisonError::into_inner)
}
