//! Key-value persistence for balances and best score
//!
//! Storage mechanics belong to the host. The session only needs
//! `get(key, default)` / `set(key, value)` over unsigned counters.
//! - `MemoryStore`: volatile map (tests, headless runs)
//! - `JsonFileStore`: JSON document on disk (tmp → save rename)

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted coin balance
pub const COIN_COUNT_KEY: &str = "CoinCount";
/// Persisted gem balance
pub const GEMS_COUNT_KEY: &str = "GemsCount";
/// Persisted best score (running maximum)
pub const BEST_SCORE_KEY: &str = "BestScore";

/// Host-provided persistent counter store
pub trait KeyValueStore {
    fn get(&self, key: &str, default: u32) -> u32;
    fn set(&mut self, key: &str, value: u32);
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, u32>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a value (e.g. an existing balance)
    pub fn with(mut self, key: &str, value: u32) -> Self {
        self.values.insert(key.to_string(), value);
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str, default: u32) -> u32 {
        self.values.get(key).copied().unwrap_or(default)
    }

    fn set(&mut self, key: &str, value: u32) {
        self.values.insert(key.to_string(), value);
    }
}

/// Store backed by a JSON object on disk
///
/// Every `set` rewrites the file. I/O problems are logged and the in-memory
/// value is kept, so a failing disk never interrupts a session.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, u32>,
}

impl JsonFileStore {
    /// Open (or lazily create) the store at `path`
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str::<BTreeMap<String, u32>>(&json) {
                Ok(values) => {
                    log::info!("Loaded {} stored values from {}", values.len(), path.display());
                    values
                }
                Err(e) => {
                    log::warn!("Ignoring corrupt store {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(_) => {
                log::info!("No store at {}, starting fresh", path.display());
                BTreeMap::new()
            }
        };
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) {
        let json = match serde_json::to_string_pretty(&self.values) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Failed to serialize store: {}", e);
                return;
            }
        };
        let tmp = self.path.with_extension("tmp");
        if let Err(e) = fs::write(&tmp, json).and_then(|_| fs::rename(&tmp, &self.path)) {
            log::warn!("Failed to write store {}: {}", self.path.display(), e);
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str, default: u32) -> u32 {
        self.values.get(key).copied().unwrap_or(default)
    }

    fn set(&mut self, key: &str, value: u32) {
        self.values.insert(key.to_string(), value);
        self.save();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_defaults() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get(COIN_COUNT_KEY, 0), 0);
        assert_eq!(store.get(BEST_SCORE_KEY, 7), 7);

        store.set(COIN_COUNT_KEY, 42);
        assert_eq!(store.get(COIN_COUNT_KEY, 0), 42);
    }

    #[test]
    fn test_json_file_store_survives_reopen() {
        let path = std::env::temp_dir().join(format!(
            "dash_survival_store_{}_{}.json",
            std::process::id(),
            line!()
        ));
        let _ = fs::remove_file(&path);

        let mut store = JsonFileStore::open(&path);
        assert_eq!(store.get(GEMS_COUNT_KEY, 0), 0);
        store.set(GEMS_COUNT_KEY, 15);

        let reopened = JsonFileStore::open(&path);
        assert_eq!(reopened.get(GEMS_COUNT_KEY, 0), 15);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_json_file_store_ignores_corrupt_file() {
        let path = std::env::temp_dir().join(format!(
            "dash_survival_store_{}_{}.json",
            std::process::id(),
            line!()
        ));
        fs::write(&path, "not json").unwrap();

        let store = JsonFileStore::open(&path);
        assert_eq!(store.get(COIN_COUNT_KEY, 3), 3);

        let _ = fs::remove_file(&path);
    }
}
