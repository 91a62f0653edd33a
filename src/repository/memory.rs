//! In-memory repository implementation
//!
//! Nothing survives the process. Used for tests and for sessions started
//! without a preferences path.

use super::traits::PreferencesRepository;
use crate::error::PokedexResult;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryPreferencesRepository {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPreferencesRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pre-populated with raw values
    pub fn with_values<K, V>(values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: Mutex::new(
                values
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl PreferencesRepository for MemoryPreferencesRepository {
    fn save_value(&self, key: &str, value: &str) -> PokedexResult<()> {
        self.values
            .lock()?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn load_value(&self, key: &str) -> PokedexResult<Option<String>> {
        Ok(self.values.lock()?.get(key).cloned())
    }

    fn load_all(&self) -> PokedexResult<HashMap<String, String>> {
        Ok(self.values.lock()?.clone())
    }

    fn delete_value(&self, key: &str) -> PokedexResult<()> {
        self.values.lock()?.remove(key);
        Ok(())
    }
}
