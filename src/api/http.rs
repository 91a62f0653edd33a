//! HTTP client for the remote catalog service.

use super::PokedexApi;
use crate::error::{PokedexError, PokedexResult};
use crate::models::{ErrorPayload, PokemonListResponse, Query, ToggleResponse, TypesResponse};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// User agent string for API requests
const USER_AGENT_VALUE: &str = concat!("pokedex-client/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct HttpPokedexApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpPokedexApi {
    /// Creates a client for the service rooted at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> PokedexResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| PokedexError::NetworkError(format!("failed to create HTTP client: {e}")))?;

        // `Url::join` replaces the last path segment unless the base ends in '/'
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> PokedexResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Checks the status and decodes the body. Non-success responses become
    /// `PokedexError::Remote`, carrying the `error` payload when present.
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> PokedexResult<T> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorPayload>(&body)
                .ok()
                .map(|payload| payload.error);
            return Err(PokedexError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl PokedexApi for HttpPokedexApi {
    async fn list_pokemons(&self, query: &Query) -> PokedexResult<PokemonListResponse> {
        let url = self.endpoint("api/pokemons")?;
        tracing::debug!(%url, page = query.page, page_size = query.page_size, "listing pokemons");

        let response = self.client.get(url).query(&query.to_params()).send().await?;
        Self::handle_response(response).await
    }

    async fn list_types(&self) -> PokedexResult<Vec<String>> {
        let url = self.endpoint("api/pokemons/types")?;
        tracing::debug!(%url, "listing pokemon types");

        let response = self.client.get(url).send().await?;
        let body: TypesResponse = Self::handle_response(response).await?;
        Ok(body.types)
    }

    async fn toggle_selection(&self, number: u32) -> PokedexResult<bool> {
        let url = self.endpoint(&format!("api/pokemons/{}/toggle_selection", number))?;
        tracing::debug!(%url, number, "toggling selection");

        let response = self.client.post(url).send().await?;
        let body: ToggleResponse = Self::handle_response(response).await?;
        Ok(body.selected)
    }
}
