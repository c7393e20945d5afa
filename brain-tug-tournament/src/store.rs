//! Persistence boundary
//!
//! [`BlobStore`] is a string key/value store; [`Storage`] layers the typed
//! tournament records on top of it as JSON.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use brain_tug_core::GameMode;

use crate::error::StoreError;
use crate::stats::StatsBook;
use crate::tournament::TournamentSnapshot;

const ACTIVE_TOURNAMENT_KEY: &str = "brain_tug_active";
const HISTORY_KEY: &str = "brain_tug_history";
const PLAYER_STATS_KEY: &str = "brain_tug_stats";

/// A completed tournament
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub finished_at: DateTime<Utc>,
    pub mode: GameMode,
    pub champion: String,
    pub players: Vec<String>,
    /// Winners log, newest first
    pub log: Vec<String>,
}

/// Opaque string storage
pub trait BlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: FxHashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory
#[derive(Clone, Debug)]
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl BlobStore for DirStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(path)?))
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// Typed records over a blob store
#[derive(Clone, Debug)]
pub struct Storage<B: BlobStore> {
    backend: B,
}

impl<B: BlobStore> Storage<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn save_active_tournament(&mut self, snapshot: &TournamentSnapshot) -> Result<(), StoreError> {
        self.write(ACTIVE_TOURNAMENT_KEY, snapshot)
    }

    /// The saved blob is not validated here
    pub fn load_active_tournament(&self) -> Result<Option<TournamentSnapshot>, StoreError> {
        self.read(ACTIVE_TOURNAMENT_KEY)
    }

    pub fn clear_active_tournament(&mut self) -> Result<(), StoreError> {
        self.backend.remove(ACTIVE_TOURNAMENT_KEY)
    }

    /// Add a record to the front of the history
    pub fn append_history(&mut self, record: HistoryRecord) -> Result<(), StoreError> {
        let mut history = self.load_history()?;
        history.insert(0, record);
        self.write(HISTORY_KEY, &history)
    }

    /// Completed tournaments, newest first
    pub fn load_history(&self) -> Result<Vec<HistoryRecord>, StoreError> {
        Ok(self.read(HISTORY_KEY)?.unwrap_or_default())
    }

    pub fn save_player_stats(&mut self, stats: &StatsBook) -> Result<(), StoreError> {
        self.write(PLAYER_STATS_KEY, stats)
    }

    pub fn load_player_stats(&self) -> Result<StatsBook, StoreError> {
        Ok(self.read(PLAYER_STATS_KEY)?.unwrap_or_default())
    }

    fn write<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(value)?;
        self.backend.put(key, &content)
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.backend.get(key)? {
            Some(content) => Ok(Some(serde_json::from_str(&content)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournament::Tournament;

    fn record(champion: &str) -> HistoryRecord {
        HistoryRecord {
            finished_at: Utc::now(),
            mode: GameMode::Math,
            champion: champion.to_string(),
            players: vec!["A".into(), "B".into()],
            log: vec![format!("Round 1: {} def. B", champion)],
        }
    }

    #[test]
    fn test_memory_store_basics() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.put("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_history_newest_first() {
        let mut storage = Storage::new(MemoryStore::new());
        assert!(storage.load_history().unwrap().is_empty());
        storage.append_history(record("A")).unwrap();
        storage.append_history(record("B")).unwrap();
        let history = storage.load_history().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].champion, "B");
    }

    #[test]
    fn test_active_tournament_round_trip() {
        let mut storage = Storage::new(MemoryStore::new());
        assert!(storage.load_active_tournament().unwrap().is_none());

        let mut tournament = Tournament::new(GameMode::Vocabulary);
        tournament.add_player("A").unwrap();
        tournament.add_player("B").unwrap();
        tournament.add_player("C").unwrap();
        tournament.seed_in_order().unwrap();

        storage.save_active_tournament(&tournament.snapshot()).unwrap();
        let loaded = storage.load_active_tournament().unwrap().unwrap();
        assert_eq!(loaded, tournament.snapshot());

        storage.clear_active_tournament().unwrap();
        assert!(storage.load_active_tournament().unwrap().is_none());
    }

    #[test]
    fn test_malformed_blob_is_an_error() {
        let mut backend = MemoryStore::new();
        backend.put(ACTIVE_TOURNAMENT_KEY, "{not json").unwrap();
        let storage = Storage::new(backend);
        assert!(matches!(
            storage.load_active_tournament(),
            Err(StoreError::Json(_))
        ));
    }

    #[test]
    fn test_dir_store() {
        let dir = std::env::temp_dir().join(format!("brain-tug-store-{}", std::process::id()));
        let mut store = DirStore::new(&dir);
        assert_eq!(store.get("stats").unwrap(), None);
        store.put("stats", "{}").unwrap();
        assert!(dir.join("stats.json").exists());
        assert_eq!(store.get("stats").unwrap().as_deref(), Some("{}"));
        store.remove("stats").unwrap();
        store.remove("stats").unwrap();
        assert_eq!(store.get("stats").unwrap(), None);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_player_stats_default_when_missing() {
        let storage = Storage::new(MemoryStore::new());
        assert!(storage.load_player_stats().unwrap().is_empty());
    }
}
