use crate::api::PokedexApi;
use crate::app_log;
use crate::error::PokedexResult;
use crate::events::EventEmitter;
use std::sync::{Arc, Mutex};

/// Shown when the category request fails without an `error` payload
pub const TYPES_FALLBACK_MESSAGE: &str = "Error fetching Pokémon types";

/// Filter options as last loaded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeCatalogState {
    pub types: Vec<String>,
    pub loading: bool,
    pub error: Option<String>,
    pub loaded: bool,
}

/// Loads the category list that feeds the type filter.
///
/// Loaded once per session; [`TypeCatalog::reload`] forces another request.
pub struct TypeCatalog {
    api: Arc<dyn PokedexApi>,
    state: Mutex<TypeCatalogState>,
    events: EventEmitter,
}

impl TypeCatalog {
    pub fn new(api: Arc<dyn PokedexApi>, events: EventEmitter) -> Self {
        Self {
            api,
            state: Mutex::new(TypeCatalogState::default()),
            events,
        }
    }

    pub fn state(&self) -> PokedexResult<TypeCatalogState> {
        Ok(self.state.lock()?.clone())
    }

    /// Load the options unless they are already present
    pub async fn load(&self) -> PokedexResult<TypeCatalogState> {
        let cached = {
            let state = self.state.lock()?;
            (state.loaded || state.loading).then(|| state.clone())
        };

        match cached {
            Some(state) => Ok(state),
            None => self.reload().await,
        }
    }

    pub async fn reload(&self) -> PokedexResult<TypeCatalogState> {
        {
            let mut state = self.state.lock()?;
            state.loading = true;
            state.error = None;
        }

        let result = self.api.list_types().await;

        let mut state = self.state.lock()?;
        state.loading = false;
        match result {
            Ok(types) => {
                state.types = types;
                state.loaded = true;
                self.events.types_loaded(state.types.len());
            }
            Err(err) => {
                app_log!(LogLevel::Error, "Failed to fetch Pokémon types: {}", err);
                let message = err.user_message(TYPES_FALLBACK_MESSAGE);
                self.events.types_failed(&message);
                state.error = Some(message);
            }
        }

        Ok(state.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockFailure, MockPokedexApi};

    #[tokio::test]
    async fn test_load_once() {
        let api = Arc::new(MockPokedexApi::with_seed_data());
        let catalog = TypeCatalog::new(api.clone(), EventEmitter::default());

        let state = catalog.load().await.unwrap();
        assert!(state.loaded);
        assert!(state.types.contains(&"fire".to_string()));

        catalog.load().await.unwrap();
        assert_eq!(api.types_request_count(), 1);

        catalog.reload().await.unwrap();
        assert_eq!(api.types_request_count(), 2);
    }

    #[tokio::test]
    async fn test_failure_messages() {
        let api = Arc::new(MockPokedexApi::with_seed_data());
        let catalog = TypeCatalog::new(api.clone(), EventEmitter::default());

        api.fail_next_types(MockFailure::bare_status(503));
        let state = catalog.load().await.unwrap();
        assert_eq!(state.error.as_deref(), Some(TYPES_FALLBACK_MESSAGE));
        assert!(!state.loaded);
        assert!(!state.loading);

        api.fail_next_types(MockFailure::status(500, "types table missing"));
        let state = catalog.load().await.unwrap();
        assert_eq!(state.error.as_deref(), Some("types table missing"));

        let state = catalog.load().await.unwrap();
        assert!(state.error.is_none());
        assert!(state.loaded);
    }
}
