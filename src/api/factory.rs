use super::{HttpPokedexApi, MockPokedexApi, PokedexApi};
use crate::config::{ApiBackend, ClientConfig};
use crate::error::PokedexResult;
use std::sync::Arc;

/// Factory for creating remote service clients
///
/// Picks the implementation named by the configuration so the session never
/// depends on a concrete client type.
pub struct PokedexApiFactory;

impl PokedexApiFactory {
    /// Create a client from configuration
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built or the base URL
    /// does not parse
    pub fn create_api(config: &ClientConfig) -> PokedexResult<Arc<dyn PokedexApi>> {
        match config.backend {
            ApiBackend::Mock => Ok(Arc::new(MockPokedexApi::with_seed_data())),
            ApiBackend::Http => {
                let api = HttpPokedexApi::new(&config.api_base_url, config.request_timeout())?;
                Ok(Arc::new(api))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Query;

    #[tokio::test]
    async fn test_factory_creates_mock_backend() {
        let config = ClientConfig {
            backend: ApiBackend::Mock,
            ..ClientConfig::default()
        };

        let api = PokedexApiFactory::create_api(&config).unwrap();
        let page = api.list_pokemons(&Query::default()).await.unwrap();
        assert_eq!(page.total_items, 18);
    }

    #[test]
    fn test_factory_creates_http_backend() {
        let config = ClientConfig::default();
        assert!(PokedexApiFactory::create_api(&config).is_ok());
    }

    #[test]
    fn test_factory_rejects_bad_url() {
        let config = ClientConfig {
            api_base_url: "definitely not a url".to_string(),
            ..ClientConfig::default()
        };
        assert!(PokedexApiFactory::create_api(&config).is_err());
    }
}
