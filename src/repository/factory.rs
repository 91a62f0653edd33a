//! Repository factory for creating repository instances
//!
//! Centralizes the choice of storage backend so the session never names a
//! concrete repository type.

use super::file::FilePreferencesRepository;
use super::memory::MemoryPreferencesRepository;
use super::traits::PreferencesRepository;
use std::path::PathBuf;
use std::sync::Arc;

/// Default store file, relative to the working directory
pub const DEFAULT_STORE_PATH: &str = "pokedex-store.json";

/// Repository factory for creating repository instances
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a file-based preferences repository
    ///
    /// # Arguments
    /// * `store_path` - Path to the store file (e.g., "pokedex-store.json")
    pub fn create_preferences_repository(store_path: PathBuf) -> Arc<dyn PreferencesRepository> {
        Arc::new(FilePreferencesRepository::new(store_path))
    }

    /// Create a preferences repository that lives only as long as the process
    pub fn create_in_memory_repository() -> Arc<dyn PreferencesRepository> {
        Arc::new(MemoryPreferencesRepository::new())
    }

    /// File-backed when a path is given, in-memory otherwise
    pub fn create_for_path(store_path: Option<PathBuf>) -> Arc<dyn PreferencesRepository> {
        match store_path {
            Some(path) => Self::create_preferences_repository(path),
            None => Self::create_in_memory_repository(),
        }
    }

    /// Create the preferences repository with default configuration
    pub fn create_default() -> Arc<dyn PreferencesRepository> {
        Self::create_preferences_repository(PathBuf::from(DEFAULT_STORE_PATH))
    }
}
