//! Device-local wordbook kept as one JSON array in a key-value slot.

use super::WordbookBackend;
use crate::models::{key_for, SavedWord};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// Slot holding the serialized local wordbook.
pub const WORDBOOK_KEY: &str = "wordSceneAi_wordbook";

/// String-keyed storage scoped to this device.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Stores each key as `<dir>/<key>.json`.
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let dir = self.dir.clone();
        let path = self.path_for(key);
        let value = value.to_string();

        // Write to a sibling temp file, then rename over the slot.
        tokio::task::spawn_blocking(move || -> Result<()> {
            std::fs::create_dir_all(&dir)?;
            let mut temp_file = NamedTempFile::new_in(&dir)?;
            temp_file.write_all(value.as_bytes())?;
            temp_file.persist(&path).map_err(|e| Error::Io(e.error))?;
            Ok(())
        })
        .await
        .map_err(|e| Error::Storage(format!("Local write task failed: {}", e)))?
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Clone, Default)]
pub struct MemoryKeyValueStore {
    values: Arc<Mutex<HashMap<String, String>>>,
    write_count: Arc<Mutex<usize>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(self, key: &str, value: &str) -> Self {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn get_value(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    pub fn get_write_count(&self) -> usize {
        *self.write_count.lock().unwrap()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get_value(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        *self.write_count.lock().unwrap() += 1;
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Wordbook of the anonymous device user.
///
/// Entries are unique by lowercase english; matching on save and remove
/// ignores case. Each write rewrites the whole collection, so overlapping
/// writers can lose updates.
pub struct LocalWordbook<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> LocalWordbook<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    async fn load(&self) -> Result<Vec<SavedWord>> {
        match self.store.get(WORDBOOK_KEY).await? {
            Some(stored) if !stored.trim().is_empty() => Ok(serde_json::from_str(&stored)?),
            _ => Ok(Vec::new()),
        }
    }

    async fn persist(&self, words: &[SavedWord]) -> Result<()> {
        let serialized = serde_json::to_string(words)?;
        self.store.set(WORDBOOK_KEY, &serialized).await
    }
}

#[async_trait]
impl<'a> WordbookBackend for LocalWordbook<'a> {
    async fn list(&self) -> Result<Vec<SavedWord>> {
        self.load().await
    }

    async fn save(&self, word: &SavedWord) -> Result<()> {
        let mut words = self.load().await?;
        let key = word.key();

        match words.iter().position(|existing| existing.key() == key) {
            Some(index) => words[index] = word.clone(),
            None => words.push(word.clone()),
        }

        self.persist(&words).await
    }

    async fn remove(&self, english: &str) -> Result<()> {
        let mut words = self.load().await?;
        let key = key_for(english);
        words.retain(|existing| existing.key() != key);
        self.persist(&words).await
    }
}
