pub mod api;
pub mod commands;
pub mod config;
pub mod config_builder;
pub mod error;
pub mod events;
pub mod fetcher;
pub mod logger;
pub mod models;
pub mod mutation;
pub mod preferences;
pub mod query;
pub mod repository;
pub mod session;
pub mod store;
pub mod type_catalog;
pub mod view;

pub use config::{ApiBackend, ClientConfig};
pub use config_builder::ClientConfigBuilder;
pub use error::{PokedexError, PokedexResult};
pub use session::Session;
