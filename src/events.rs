use crate::models::Query;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Event names - centralized for consistency
pub mod event_names {
    pub const QUERY_CHANGED: &str = "query:changed";
    pub const LIST_LOADING: &str = "list:loading";
    pub const LIST_LOADED: &str = "list:loaded";
    pub const LIST_FAILED: &str = "list:failed";
    pub const LIST_STALE_DISCARDED: &str = "list:stale-discarded";
    pub const TOGGLE_STARTED: &str = "toggle:started";
    pub const TOGGLE_CONFIRMED: &str = "toggle:confirmed";
    pub const TOGGLE_ROLLED_BACK: &str = "toggle:rolled-back";
    pub const TYPES_LOADED: &str = "types:loaded";
    pub const TYPES_FAILED: &str = "types:failed";
}

/// Default buffer for slow subscribers before they start lagging
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Query change event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryChangedEvent {
    pub query: Query,
    pub timestamp: String,
}

/// A fetch started and raised the loading flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListLoadingEvent {
    pub epoch: u64,
    pub query: Query,
    pub timestamp: String,
}

/// A fetch result replaced the list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListLoadedEvent {
    pub epoch: u64,
    pub version: u64,
    pub total_pages: u32,
    pub total_items: u32,
    pub timestamp: String,
}

/// A fetch failed; the previous list is still in place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFailedEvent {
    pub epoch: u64,
    pub error: String,
    pub timestamp: String,
}

/// A fetch resolved after a newer one was issued and was ignored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListStaleDiscardedEvent {
    pub epoch: u64,
    pub latest_epoch: u64,
    pub timestamp: String,
}

/// Optimistic selection flip published
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleStartedEvent {
    pub number: u32,
    pub optimistic: bool,
    pub version: u64,
    pub timestamp: String,
}

/// Remote service confirmed the selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleConfirmedEvent {
    pub number: u32,
    pub selected: bool,
    pub version: u64,
    pub timestamp: String,
}

/// Remote toggle failed and the prior value was restored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleRolledBackEvent {
    pub number: u32,
    pub restored: bool,
    pub error: String,
    pub version: u64,
    pub timestamp: String,
}

/// Filter options loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypesLoadedEvent {
    pub count: usize,
    pub timestamp: String,
}

/// Filter options failed to load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypesFailedEvent {
    pub error: String,
    pub timestamp: String,
}

/// Everything a renderer may want to react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum CatalogEvent {
    QueryChanged(QueryChangedEvent),
    ListLoading(ListLoadingEvent),
    ListLoaded(ListLoadedEvent),
    ListFailed(ListFailedEvent),
    ListStaleDiscarded(ListStaleDiscardedEvent),
    ToggleStarted(ToggleStartedEvent),
    ToggleConfirmed(ToggleConfirmedEvent),
    ToggleRolledBack(ToggleRolledBackEvent),
    TypesLoaded(TypesLoadedEvent),
    TypesFailed(TypesFailedEvent),
}

impl CatalogEvent {
    pub fn name(&self) -> &'static str {
        match self {
            CatalogEvent::QueryChanged(_) => event_names::QUERY_CHANGED,
            CatalogEvent::ListLoading(_) => event_names::LIST_LOADING,
            CatalogEvent::ListLoaded(_) => event_names::LIST_LOADED,
            CatalogEvent::ListFailed(_) => event_names::LIST_FAILED,
            CatalogEvent::ListStaleDiscarded(_) => event_names::LIST_STALE_DISCARDED,
            CatalogEvent::ToggleStarted(_) => event_names::TOGGLE_STARTED,
            CatalogEvent::ToggleConfirmed(_) => event_names::TOGGLE_CONFIRMED,
            CatalogEvent::ToggleRolledBack(_) => event_names::TOGGLE_ROLLED_BACK,
            CatalogEvent::TypesLoaded(_) => event_names::TYPES_LOADED,
            CatalogEvent::TypesFailed(_) => event_names::TYPES_FAILED,
        }
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Event emitter helper functions
///
/// Cloning shares the underlying channel. Emitting with no subscribers is
/// not an error.
#[derive(Debug, Clone)]
pub struct EventEmitter {
    sender: broadcast::Sender<CatalogEvent>,
}

impl EventEmitter {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.sender.subscribe()
    }

    fn emit(&self, event: CatalogEvent) {
        let name = event.name();
        if self.sender.send(event).is_err() {
            tracing::trace!(event = name, "no subscribers for event");
        }
    }

    pub fn query_changed(&self, query: &Query) {
        self.emit(CatalogEvent::QueryChanged(QueryChangedEvent {
            query: query.clone(),
            timestamp: now(),
        }));
    }

    pub fn list_loading(&self, epoch: u64, query: &Query) {
        self.emit(CatalogEvent::ListLoading(ListLoadingEvent {
            epoch,
            query: query.clone(),
            timestamp: now(),
        }));
    }

    pub fn list_loaded(&self, epoch: u64, version: u64, total_pages: u32, total_items: u32) {
        self.emit(CatalogEvent::ListLoaded(ListLoadedEvent {
            epoch,
            version,
            total_pages,
            total_items,
            timestamp: now(),
        }));
    }

    pub fn list_failed(&self, epoch: u64, error: &str) {
        self.emit(CatalogEvent::ListFailed(ListFailedEvent {
            epoch,
            error: error.to_string(),
            timestamp: now(),
        }));
    }

    pub fn list_stale_discarded(&self, epoch: u64, latest_epoch: u64) {
        self.emit(CatalogEvent::ListStaleDiscarded(ListStaleDiscardedEvent {
            epoch,
            latest_epoch,
            timestamp: now(),
        }));
    }

    pub fn toggle_started(&self, number: u32, optimistic: bool, version: u64) {
        self.emit(CatalogEvent::ToggleStarted(ToggleStartedEvent {
            number,
            optimistic,
            version,
            timestamp: now(),
        }));
    }

    pub fn toggle_confirmed(&self, number: u32, selected: bool, version: u64) {
        self.emit(CatalogEvent::ToggleConfirmed(ToggleConfirmedEvent {
            number,
            selected,
            version,
            timestamp: now(),
        }));
    }

    pub fn toggle_rolled_back(&self, number: u32, restored: bool, error: &str, version: u64) {
        self.emit(CatalogEvent::ToggleRolledBack(ToggleRolledBackEvent {
            number,
            restored,
            error: error.to_string(),
            version,
            timestamp: now(),
        }));
    }

    pub fn types_loaded(&self, count: usize) {
        self.emit(CatalogEvent::TypesLoaded(TypesLoadedEvent {
            count,
            timestamp: now(),
        }));
    }

    pub fn types_failed(&self, error: &str) {
        self.emit(CatalogEvent::TypesFailed(TypesFailedEvent {
            error: error.to_string(),
            timestamp: now(),
        }));
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
