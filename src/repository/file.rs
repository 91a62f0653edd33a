//! File-based repository implementation
//!
//! Preferences live in a single JSON object on disk. Every write rewrites the
//! whole file through a sibling temp file and a rename.

use super::traits::PreferencesRepository;
use crate::app_log;
use crate::error::{PokedexError, PokedexResult};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// File-based preferences repository backed by a JSON document
pub struct FilePreferencesRepository {
    store_path: PathBuf,
    /// Serializes read-modify-write cycles on the store file
    write_lock: Mutex<()>,
}

impl FilePreferencesRepository {
    /// Create a new file-based preferences repository
    pub fn new(store_path: impl Into<PathBuf>) -> Self {
        Self {
            store_path: store_path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    /// Raw store contents; `None` when the file is missing or blank
    fn read_contents(&self) -> PokedexResult<Option<String>> {
        let contents = match fs::read_to_string(&self.store_path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(PokedexError::StorageLoadFailed(format!(
                    "{}: {}",
                    self.store_path.display(),
                    e
                )))
            }
        };

        if contents.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(contents))
    }

    fn parse_document(&self, contents: &str) -> PokedexResult<Map<String, Value>> {
        match serde_json::from_str::<Value>(contents)? {
            Value::Object(map) => Ok(map),
            other => Err(PokedexError::StorageLoadFailed(format!(
                "{}: expected a JSON object, found {}",
                self.store_path.display(),
                json_kind(&other)
            ))),
        }
    }

    /// Read the store document; a missing or empty file is an empty store
    fn read_document(&self) -> PokedexResult<Map<String, Value>> {
        match self.read_contents()? {
            Some(contents) => self.parse_document(&contents),
            None => Ok(Map::new()),
        }
    }

    /// Document to modify on a write.
    ///
    /// Unreadable files still fail, but a document that does not parse into
    /// an object is discarded so the write replaces it.
    fn document_for_write(&self) -> PokedexResult<Map<String, Value>> {
        let Some(contents) = self.read_contents()? else {
            return Ok(Map::new());
        };

        match self.parse_document(&contents) {
            Ok(document) => Ok(document),
            Err(e) => {
                app_log!(
                    LogLevel::Warn,
                    "Discarding malformed preferences at {}: {}",
                    self.store_path.display(),
                    e
                );
                Ok(Map::new())
            }
        }
    }

    fn write_document(&self, document: &Map<String, Value>) -> PokedexResult<()> {
        if let Some(parent) = self.store_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| PokedexError::StorageSaveFailed(e.to_string()))?;
            }
        }

        let json = serde_json::to_string_pretty(document)?;
        let tmp_path = self.store_path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(|e| PokedexError::StorageSaveFailed(e.to_string()))?;
        fs::rename(&tmp_path, &self.store_path)
            .map_err(|e| PokedexError::StorageSaveFailed(e.to_string()))?;
        Ok(())
    }
}

/// Stored values are normally strings; anything else is read back as its
/// JSON text so the caller can decide whether it is usable.
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl PreferencesRepository for FilePreferencesRepository {
    fn save_value(&self, key: &str, value: &str) -> PokedexResult<()> {
        let _guard = self.write_lock.lock()?;

        // Load existing preferences
        let mut document = self.document_for_write()?;

        if document.get(key).and_then(Value::as_str) == Some(value) {
            return Ok(());
        }

        document.insert(key.to_string(), Value::String(value.to_string()));
        self.write_document(&document)
    }

    fn load_value(&self, key: &str) -> PokedexResult<Option<String>> {
        let document = self.read_document()?;
        Ok(document.get(key).map(value_to_string))
    }

    fn load_all(&self) -> PokedexResult<HashMap<String, String>> {
        let document = self.read_document()?;
        Ok(document
            .iter()
            .map(|(k, v)| (k.clone(), value_to_string(v)))
            .collect())
    }

    fn delete_value(&self, key: &str) -> PokedexResult<()> {
        let _guard = self.write_lock.lock()?;

        let mut document = self.document_for_write()?;
        if document.remove(key).is_some() {
            self.write_document(&document)?;
        }
        Ok(())
    }
}
