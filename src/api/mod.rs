//! Remote catalog service.
//!
//! The session only talks to the service through [`PokedexApi`], so the HTTP
//! client and the in-process emulation are interchangeable.

pub mod factory;
pub mod http;
pub mod mock;

pub use factory::PokedexApiFactory;
pub use http::HttpPokedexApi;
pub use mock::{seed_pokemons, MockFailure, MockGate, MockPokedexApi, MockStep};

use crate::error::PokedexResult;
use crate::models::{PokemonListResponse, Query};
use async_trait::async_trait;

/// Contract of the remote list/record service
#[async_trait]
pub trait PokedexApi: Send + Sync {
    /// Fetch one page of records for `query`
    async fn list_pokemons(&self, query: &Query) -> PokedexResult<PokemonListResponse>;

    /// Fetch every known type, used to populate the filter options
    async fn list_types(&self) -> PokedexResult<Vec<String>>;

    /// Flip the selection flag server-side; returns the authoritative value
    async fn toggle_selection(&self, number: u32) -> PokedexResult<bool>;
}
