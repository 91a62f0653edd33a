//! One browsing session over the remote catalog.
//!
//! ```text
//!            set_page / set_page_size / set_sort_order / set_type_filter
//!                                   │
//!                        ┌──────────▼──────────┐
//!                        │     QueryState      │──► PreferenceStore
//!                        └──────────┬──────────┘
//!                                   │ begin (epoch n)
//!   toggle ──► MutationController   ▼
//!                   │          ListFetcher ──► PokedexApi
//!                   ▼               │
//!              ┌────────────────────▼───┐
//!              │      CatalogStore      │──► EventEmitter
//!              └────────────────────────┘
//! ```
//!
//! Query changes and epoch allocation happen under the same lock, so epochs
//! follow the order in which the user changed the query.

use crate::api::{PokedexApi, PokedexApiFactory};
use crate::config::ClientConfig;
use crate::error::PokedexResult;
use crate::events::{CatalogEvent, EventEmitter};
use crate::fetcher::{FetchOutcome, ListFetcher};
use crate::models::{Query, SortOrder};
use crate::mutation::{MutationController, ToggleOutcome};
use crate::preferences::PreferenceStore;
use crate::query::QueryState;
use crate::repository::{PreferencesRepository, RepositoryFactory};
use crate::store::{CatalogSnapshot, CatalogStore};
use crate::type_catalog::{TypeCatalog, TypeCatalogState};
use crate::view::{ListStatus, PaginationView};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

pub struct Session {
    query: Mutex<QueryState>,
    store: CatalogStore,
    fetcher: ListFetcher,
    mutations: MutationController,
    types: TypeCatalog,
}

impl Session {
    pub fn new(
        api: Arc<dyn PokedexApi>,
        repository: Arc<dyn PreferencesRepository>,
        image_base_url: &str,
    ) -> Self {
        let events = EventEmitter::default();
        let store = CatalogStore::new(events.clone());

        Self {
            query: Mutex::new(QueryState::new(PreferenceStore::new(repository))),
            fetcher: ListFetcher::new(api.clone(), store.clone(), image_base_url),
            mutations: MutationController::new(api.clone(), store.clone()),
            types: TypeCatalog::new(api, events),
            store,
        }
    }

    /// Build the service client and preference storage named by `config`
    pub fn from_config(config: &ClientConfig) -> PokedexResult<Self> {
        let api = PokedexApiFactory::create_api(config)?;
        let repository = RepositoryFactory::create_for_path(config.preferences_path.clone());
        Ok(Self::new(api, repository, &config.image_base_url))
    }

    /// Load the filter options and the first page together
    pub async fn start(&self) -> PokedexResult<FetchOutcome> {
        let (types, outcome) = futures::future::join(self.types.load(), self.refresh()).await;
        types?;
        outcome
    }

    pub fn query(&self) -> PokedexResult<Query> {
        Ok(self.query.lock()?.snapshot())
    }

    /// Fetch the current query again
    pub async fn refresh(&self) -> PokedexResult<FetchOutcome> {
        self.update_and_fetch(|_| {}).await
    }

    pub async fn set_page(&self, page: u32) -> PokedexResult<FetchOutcome> {
        self.update_and_fetch(|state| state.set_page(page)).await
    }

    pub async fn set_page_size(&self, page_size: u32) -> PokedexResult<FetchOutcome> {
        self.update_and_fetch(|state| state.set_page_size(page_size))
            .await
    }

    pub async fn set_sort_order(&self, order: SortOrder) -> PokedexResult<FetchOutcome> {
        self.update_and_fetch(|state| state.set_sort_order(order))
            .await
    }

    pub async fn toggle_sort_order(&self) -> PokedexResult<FetchOutcome> {
        self.update_and_fetch(|state| {
            state.toggle_sort_order();
        })
        .await
    }

    pub async fn set_type_filter(&self, type_filter: &str) -> PokedexResult<FetchOutcome> {
        self.update_and_fetch(|state| state.set_type_filter(type_filter))
            .await
    }

    /// Go forward one page. `None` when the control is disabled.
    pub async fn next_page(&self) -> PokedexResult<Option<FetchOutcome>> {
        match self.pagination()?.next_page() {
            Some(page) => Ok(Some(self.set_page(page).await?)),
            None => Ok(None),
        }
    }

    /// Go back one page. `None` when the control is disabled.
    pub async fn previous_page(&self) -> PokedexResult<Option<FetchOutcome>> {
        match self.pagination()?.previous_page() {
            Some(page) => Ok(Some(self.set_page(page).await?)),
            None => Ok(None),
        }
    }

    pub async fn toggle(&self, number: u32) -> PokedexResult<ToggleOutcome> {
        self.mutations.toggle(number).await
    }

    pub async fn load_types(&self) -> PokedexResult<TypeCatalogState> {
        self.types.load().await
    }

    pub fn types(&self) -> PokedexResult<TypeCatalogState> {
        self.types.state()
    }

    pub fn snapshot(&self) -> PokedexResult<CatalogSnapshot> {
        self.store.snapshot()
    }

    pub fn pagination(&self) -> PokedexResult<PaginationView> {
        let query = self.query()?;
        let snapshot = self.store.snapshot()?;
        let view = PaginationView::new(&query, &snapshot.page);
        Ok(if snapshot.loading {
            view.while_loading()
        } else {
            view
        })
    }

    pub fn list_status(&self) -> PokedexResult<ListStatus> {
        Ok(ListStatus::from_snapshot(&self.store.snapshot()?))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.store.events().subscribe()
    }

    async fn update_and_fetch(
        &self,
        update: impl FnOnce(&mut QueryState),
    ) -> PokedexResult<FetchOutcome> {
        let ticket = {
            let mut state = self.query.lock()?;
            update(&mut state);
            let query = state.snapshot();
            self.store.events().query_changed(&query);
            self.fetcher.begin(&query)?
        };

        self.fetcher.run(ticket).await
    }
}
