//! Repository trait definitions
//!
//! These traits define the abstract interfaces for data access operations.
//! Different implementations can provide different storage backends.

use crate::error::PokedexResult;
use std::collections::HashMap;

/// Repository for user preferences
///
/// Values are stored as strings so that the on-disk format stays readable
/// and tolerant of hand edits; interpretation is left to the caller.
pub trait PreferencesRepository: Send + Sync {
    /// Save a raw preference value under `key`
    fn save_value(&self, key: &str, value: &str) -> PokedexResult<()>;

    /// Load the raw preference value stored under `key`
    fn load_value(&self, key: &str) -> PokedexResult<Option<String>>;

    /// Load every stored preference
    fn load_all(&self) -> PokedexResult<HashMap<String, String>>;

    /// Delete the preference stored under `key`
    fn delete_value(&self, key: &str) -> PokedexResult<()>;

    /// Check if a preference exists
    fn has_value(&self, key: &str) -> PokedexResult<bool> {
        Ok(self.load_value(key)?.is_some())
    }

    /// Count stored preferences
    fn count_values(&self) -> PokedexResult<usize> {
        Ok(self.load_all()?.len())
    }
}
