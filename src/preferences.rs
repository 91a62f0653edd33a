//! Durable page and page-size preferences.
//!
//! Reads never fail: a missing, malformed or non-positive value is reported
//! as absent and the caller applies its default. Writes are fire-and-forget;
//! storage failures are logged and swallowed.

use crate::app_log;
use crate::repository::PreferencesRepository;
use std::sync::Arc;

/// Storage key for the last viewed page
pub const PAGE_KEY: &str = "currentPage";

/// Storage key for the last chosen page size
pub const PAGE_SIZE_KEY: &str = "pokemonsPerPage";

#[derive(Clone)]
pub struct PreferenceStore {
    repository: Arc<dyn PreferencesRepository>,
}

impl PreferenceStore {
    pub fn new(repository: Arc<dyn PreferencesRepository>) -> Self {
        Self { repository }
    }

    /// Positive integer stored under `key`, if there is one
    pub fn read(&self, key: &str) -> Option<u32> {
        let raw = match self.repository.load_value(key) {
            Ok(raw) => raw?,
            Err(e) => {
                app_log!(LogLevel::Warn, "Failed to read preference '{}': {}", key, e);
                return None;
            }
        };

        let parsed = parse_positive(&raw);
        if parsed.is_none() {
            app_log!(
                LogLevel::Debug,
                "Ignoring invalid stored value {:?} for preference '{}'",
                raw,
                key
            );
        }
        parsed
    }

    /// Persist `value` under `key` as a base-10 string
    pub fn write(&self, key: &str, value: u32) {
        if let Err(e) = self.repository.save_value(key, &value.to_string()) {
            app_log!(LogLevel::Warn, "Failed to persist preference '{}': {}", key, e);
        }
    }

    /// `read` with a fallback
    pub fn read_or(&self, key: &str, default: u32) -> u32 {
        self.read(key).unwrap_or(default)
    }
}

/// Base-10 positive integer; zero, negatives, junk and overflow are `None`
fn parse_positive(raw: &str) -> Option<u32> {
    match raw.trim().parse::<i64>() {
        Ok(n) if n > 0 => u32::try_from(n).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PokedexError, PokedexResult};
    use crate::repository::MemoryPreferencesRepository;
    use std::collections::HashMap;

    fn store_with(values: &[(&str, &str)]) -> PreferenceStore {
        PreferenceStore::new(Arc::new(MemoryPreferencesRepository::with_values(
            values.iter().copied(),
        )))
    }

    #[test]
    fn test_read_missing_is_absent() {
        let store = store_with(&[]);
        assert_eq!(store.read(PAGE_KEY), None);
        assert_eq!(store.read_or(PAGE_KEY, 1), 1);
    }

    #[test]
    fn test_read_valid_values() {
        let store = store_with(&[(PAGE_KEY, "3"), (PAGE_SIZE_KEY, " 20 ")]);
        assert_eq!(store.read(PAGE_KEY), Some(3));
        assert_eq!(store.read(PAGE_SIZE_KEY), Some(20));
    }

    #[test]
    fn test_read_rejects_invalid_values() {
        for raw in ["0", "-4", "abc", "", "3.5", "99999999999", "null"] {
            let store = store_with(&[(PAGE_KEY, raw)]);
            assert_eq!(store.read(PAGE_KEY), None, "value {:?} should be absent", raw);
        }
    }

    #[test]
    fn test_write_then_read() {
        let store = store_with(&[]);
        store.write(PAGE_SIZE_KEY, 10);
        store.write(PAGE_SIZE_KEY, 10);
        assert_eq!(store.read(PAGE_SIZE_KEY), Some(10));
    }

    struct BrokenRepo;

    impl PreferencesRepository for BrokenRepo {
        fn save_value(&self, _key: &str, _value: &str) -> PokedexResult<()> {
            Err(PokedexError::StorageSaveFailed("disk full".to_string()))
        }

        fn load_value(&self, _key: &str) -> PokedexResult<Option<String>> {
            Err(PokedexError::StorageLoadFailed("unreadable".to_string()))
        }

        fn load_all(&self) -> PokedexResult<HashMap<String, String>> {
            Err(PokedexError::StorageLoadFailed("unreadable".to_string()))
        }

        fn delete_value(&self, _key: &str) -> PokedexResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_storage_failures_are_swallowed() {
        let store = PreferenceStore::new(Arc::new(BrokenRepo));
        store.write(PAGE_KEY, 2);
        assert_eq!(store.read(PAGE_KEY), None);
    }
}
