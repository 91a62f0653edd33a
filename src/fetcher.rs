use crate::api::PokedexApi;
use crate::app_log;
use crate::error::PokedexResult;
use crate::models::{PokemonListResponse, Query};
use crate::store::CatalogStore;
use std::sync::Arc;
use tokio::sync::watch;

/// Shown when a list request fails without an `error` payload
pub const LIST_FALLBACK_MESSAGE: &str = "Error fetching pokemons";

/// How a fetch ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page was published under `version`
    Loaded { epoch: u64, version: u64 },
    /// The error message was published; the previous list stays
    Failed { epoch: u64, message: String },
    /// A newer fetch was issued first; nothing was applied
    Stale { epoch: u64, latest_epoch: u64 },
}

impl FetchOutcome {
    pub fn is_stale(&self) -> bool {
        matches!(self, FetchOutcome::Stale { .. })
    }
}

/// A fetch that has raised the loading flag but not yet issued its request
#[derive(Debug, Clone)]
pub struct FetchTicket {
    epoch: u64,
    query: Query,
}

impl FetchTicket {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn query(&self) -> &Query {
        &self.query
    }
}

/// Retrieves pages and publishes them into the catalog store.
///
/// Every fetch gets an epoch. Only the newest epoch may touch the store; an
/// older request still running when a newer one starts is dropped, and if it
/// resolves anyway its result is discarded.
pub struct ListFetcher {
    api: Arc<dyn PokedexApi>,
    store: CatalogStore,
    image_base_url: String,
    latest: watch::Sender<u64>,
}

impl ListFetcher {
    pub fn new(api: Arc<dyn PokedexApi>, store: CatalogStore, image_base_url: impl Into<String>) -> Self {
        let (latest, _) = watch::channel(0);
        Self {
            api,
            store,
            image_base_url: image_base_url.into(),
            latest,
        }
    }

    /// Synchronous half of a fetch: allocate the epoch, raise loading, clear
    /// the error and announce the epoch so older requests stand down.
    pub fn begin(&self, query: &Query) -> PokedexResult<FetchTicket> {
        let epoch = self.store.with_state(|state| state.begin_fetch())?;
        self.latest.send_replace(epoch);
        self.store.events().list_loading(epoch, query);

        Ok(FetchTicket {
            epoch,
            query: query.clone(),
        })
    }

    /// Issue the request for a ticket and apply its result
    pub async fn run(&self, ticket: FetchTicket) -> PokedexResult<FetchOutcome> {
        let mut announcements = self.latest.subscribe();
        let epoch = ticket.epoch;

        let result = tokio::select! {
            result = self.api.list_pokemons(&ticket.query) => Some(result),
            _ = superseded(&mut announcements, epoch) => None,
        };

        match result {
            Some(result) => self.complete(epoch, result),
            None => {
                app_log!(LogLevel::Debug, "Cancelled list request for superseded epoch {}", epoch);
                self.discard(epoch)
            }
        }
    }

    /// Begin and run in one step
    pub async fn fetch(&self, query: &Query) -> PokedexResult<FetchOutcome> {
        let ticket = self.begin(query)?;
        self.run(ticket).await
    }

    /// Apply a finished request if its epoch is still the newest
    pub fn complete(
        &self,
        epoch: u64,
        result: PokedexResult<PokemonListResponse>,
    ) -> PokedexResult<FetchOutcome> {
        match result {
            Ok(response) => {
                let page = response.into_page(&self.image_base_url);
                let (total_pages, total_items) = (page.total_pages, page.total_items);

                match self.store.with_state(|state| state.apply_page(epoch, page))? {
                    Some(version) => {
                        self.store
                            .events()
                            .list_loaded(epoch, version, total_pages, total_items);
                        Ok(FetchOutcome::Loaded { epoch, version })
                    }
                    None => self.discard(epoch),
                }
            }
            Err(err) => {
                let message = err.user_message(LIST_FALLBACK_MESSAGE);
                let applied = self
                    .store
                    .with_state(|state| state.apply_failure(epoch, message.clone()))?;

                if !applied {
                    return self.discard(epoch);
                }

                app_log!(LogLevel::Error, "Failed to fetch pokemons: {}", err);
                self.store.events().list_failed(epoch, &message);
                Ok(FetchOutcome::Failed { epoch, message })
            }
        }
    }

    fn discard(&self, epoch: u64) -> PokedexResult<FetchOutcome> {
        let latest_epoch = self.store.with_state(|state| state.latest_epoch)?;
        app_log!(
            LogLevel::Debug,
            "Discarding list result for epoch {} (latest is {})",
            epoch,
            latest_epoch
        );
        self.store.events().list_stale_discarded(epoch, latest_epoch);
        Ok(FetchOutcome::Stale {
            epoch,
            latest_epoch,
        })
    }
}

/// Resolves once an epoch newer than `epoch` has been announced
async fn superseded(announcements: &mut watch::Receiver<u64>, epoch: u64) {
    let closed = announcements.wait_for(|latest| *latest > epoch).await.is_err();
    if closed {
        std::future::pending::<()>().await;
    }
}
