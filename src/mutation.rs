use crate::api::PokedexApi;
use crate::app_log;
use crate::error::{PokedexError, PokedexResult};
use crate::store::{CatalogStore, ToggleSettled, ToggleStart};
use std::sync::Arc;

/// Error text carried by the rollback event when a toggle is abandoned
pub const TOGGLE_CANCELLED_MESSAGE: &str = "toggle cancelled before the service answered";

/// How a selection toggle ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// No record with that number on the current page
    NotFound,
    /// A toggle for the same record is still waiting on the service
    AlreadyPending,
    /// The service answered; `selected` is its authoritative value
    Confirmed { selected: bool },
    /// The service call failed and the prior value was restored
    RolledBack { error: String },
}

impl ToggleOutcome {
    /// Turn the rejected outcomes into errors.
    ///
    /// A rollback is not an error here; it has already been logged and the
    /// list is consistent again.
    pub fn into_result(self, number: u32) -> PokedexResult<Option<bool>> {
        match self {
            ToggleOutcome::NotFound => Err(PokedexError::PokemonNotFound(number)),
            ToggleOutcome::AlreadyPending => Err(PokedexError::MutationInFlight(number)),
            ToggleOutcome::Confirmed { selected } => Ok(Some(selected)),
            ToggleOutcome::RolledBack { .. } => Ok(None),
        }
    }
}

/// Optimistic selection changes against the shared catalog
pub struct MutationController {
    api: Arc<dyn PokedexApi>,
    store: CatalogStore,
}

impl MutationController {
    pub fn new(api: Arc<dyn PokedexApi>, store: CatalogStore) -> Self {
        Self { api, store }
    }

    /// Flip the selection of `number` now and reconcile with the service.
    ///
    /// The flipped value is published before the request goes out. The
    /// service answer, or the prior value on failure, is written back to
    /// whichever list is current when the request settles.
    pub async fn toggle(&self, number: u32) -> PokedexResult<ToggleOutcome> {
        let start = self.store.with_state(|state| state.begin_toggle(number))?;

        match start {
            ToggleStart::NotFound => {
                app_log!(LogLevel::Info, "Pokémon #{} is not on the current page", number);
                return Ok(ToggleOutcome::NotFound);
            }
            ToggleStart::AlreadyPending => {
                app_log!(LogLevel::Debug, "Toggle for #{} already in flight", number);
                return Ok(ToggleOutcome::AlreadyPending);
            }
            ToggleStart::Started {
                optimistic, version, ..
            } => {
                self.store.events().toggle_started(number, optimistic, version);
            }
        }

        let guard = InFlightGuard::new(self.store.clone(), number);

        match self.api.toggle_selection(number).await {
            Ok(selected) => {
                let settled = guard.settle(Some(selected))?;
                self.store
                    .events()
                    .toggle_confirmed(number, settled.selected, settled.version);
                Ok(ToggleOutcome::Confirmed { selected })
            }
            Err(err) => {
                app_log!(LogLevel::Warn, "Failed to toggle selection for #{}: {}", number, err);
                let settled = guard.settle(None)?;
                let error = err.to_string();
                self.store
                    .events()
                    .toggle_rolled_back(number, settled.selected, &error, settled.version);
                Ok(ToggleOutcome::RolledBack { error })
            }
        }
    }
}

/// Releases the in-flight entry of a started toggle.
///
/// Dropping it unsettled, as happens when a `toggle` future is abandoned
/// mid-request, rolls the record back to its prior value.
struct InFlightGuard {
    store: CatalogStore,
    number: u32,
    armed: bool,
}

impl InFlightGuard {
    fn new(store: CatalogStore, number: u32) -> Self {
        Self {
            store,
            number,
            armed: true,
        }
    }

    fn settle(mut self, authoritative: Option<bool>) -> PokedexResult<ToggleSettled> {
        self.armed = false;
        let number = self.number;
        self.store
            .with_state(|state| state.finish_toggle(number, authoritative))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let number = self.number;
        match self.store.with_state(|state| state.finish_toggle(number, None)) {
            Ok(settled) => {
                app_log!(LogLevel::Warn, "Toggle for #{} abandoned, prior value restored", number);
                self.store.events().toggle_rolled_back(
                    number,
                    settled.selected,
                    TOGGLE_CANCELLED_MESSAGE,
                    settled.version,
                );
            }
            Err(e) => {
                app_log!(
                    LogLevel::Error,
                    "Could not roll back abandoned toggle for #{}: {}",
                    number,
                    e
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockFailure, MockPokedexApi, MockStep};
    use crate::fetcher::ListFetcher;
    use crate::models::{Query, DEFAULT_IMAGE_BASE_URL};
    use std::time::Duration;

    async fn loaded() -> (Arc<MockPokedexApi>, CatalogStore, Arc<MutationController>) {
        let api = Arc::new(MockPokedexApi::with_seed_data());
        let store = CatalogStore::default();
        ListFetcher::new(api.clone(), store.clone(), DEFAULT_IMAGE_BASE_URL)
            .fetch(&Query::default())
            .await
            .unwrap();
        let controller = Arc::new(MutationController::new(api.clone(), store.clone()));
        (api, store, controller)
    }

    #[tokio::test]
    async fn test_optimistic_flip_is_visible_before_answer() {
        let (api, store, controller) = loaded().await;
        let gate = api.hold_next_toggle();

        let task = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.toggle(4).await })
        };
        tokio::task::yield_now().await;

        let record = store.find(4).unwrap().unwrap();
        assert!(record.selected);
        assert!(record.pending);
        assert!(!store.find(3).unwrap().unwrap().pending);

        gate.release();
        let outcome = task.await.unwrap().unwrap();
        assert_eq!(outcome, ToggleOutcome::Confirmed { selected: true });

        let record = store.find(4).unwrap().unwrap();
        assert!(record.selected);
        assert!(!record.pending);
        assert_eq!(api.server_selected(4), Some(true));
    }

    #[tokio::test]
    async fn test_failure_rolls_back() {
        let (api, store, controller) = loaded().await;
        api.fail_next_toggle(MockFailure::status(500, "database unavailable"));

        let outcome = controller.toggle(2).await.unwrap();
        assert!(matches!(outcome, ToggleOutcome::RolledBack { .. }));

        let record = store.find(2).unwrap().unwrap();
        assert!(!record.selected);
        assert!(!record.pending);
    }

    #[tokio::test]
    async fn test_authoritative_value_wins() {
        let (api, store, controller) = loaded().await;
        api.push_toggle_step(MockStep::new().answering(false));

        let outcome = controller.toggle(1).await.unwrap();
        assert_eq!(outcome, ToggleOutcome::Confirmed { selected: false });
        assert!(!store.find(1).unwrap().unwrap().selected);
    }

    #[tokio::test]
    async fn test_unknown_record_leaves_list_alone() {
        let (api, store, controller) = loaded().await;
        let before = store.snapshot().unwrap();

        let outcome = controller.toggle(150).await.unwrap();
        assert_eq!(outcome, ToggleOutcome::NotFound);
        assert_eq!(store.snapshot().unwrap(), before);
        assert!(api.toggle_requests().is_empty());
        assert!(matches!(
            outcome.into_result(150),
            Err(PokedexError::PokemonNotFound(150))
        ));
    }

    #[tokio::test]
    async fn test_second_toggle_on_same_record_is_rejected() {
        let (api, store, controller) = loaded().await;
        let gate = api.hold_next_toggle();

        let task = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.toggle(3).await })
        };
        tokio::task::yield_now().await;

        assert_eq!(controller.toggle(3).await.unwrap(), ToggleOutcome::AlreadyPending);

        gate.release();
        task.await.unwrap().unwrap();

        assert_eq!(api.toggle_requests(), vec![3]);
        assert!(store.find(3).unwrap().unwrap().selected);
    }

    #[tokio::test]
    async fn test_toggles_on_different_records_do_not_block() {
        let (api, store, controller) = loaded().await;
        let gate = api.hold_next_toggle();

        let held = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.toggle(1).await })
        };
        tokio::task::yield_now().await;

        let outcome = controller.toggle(2).await.unwrap();
        assert_eq!(outcome, ToggleOutcome::Confirmed { selected: true });
        assert!(store.find(1).unwrap().unwrap().pending);

        gate.release();
        held.await.unwrap().unwrap();
        assert!(!store.find(1).unwrap().unwrap().pending);
    }

    #[tokio::test]
    async fn test_abandoned_toggle_rolls_back_and_unlocks() {
        let (api, store, controller) = loaded().await;
        let mut events = store.events().subscribe();
        let gate = api.hold_next_toggle();

        let abandoned =
            tokio::time::timeout(Duration::from_millis(20), controller.toggle(2)).await;
        assert!(abandoned.is_err());

        let record = store.find(2).unwrap().unwrap();
        assert!(!record.selected);
        assert!(!record.pending);
        assert!(!store.is_pending(2).unwrap());

        let names: Vec<&str> = std::iter::from_fn(|| events.try_recv().ok())
            .map(|event| event.name())
            .collect();
        assert_eq!(names, vec!["toggle:started", "toggle:rolled-back"]);

        drop(gate);
        let outcome = controller.toggle(2).await.unwrap();
        assert_eq!(outcome, ToggleOutcome::Confirmed { selected: true });
        assert!(!store.find(2).unwrap().unwrap().pending);
    }
}
