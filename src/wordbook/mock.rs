use super::RemoteWordTable;
use crate::models::{SavedWord, UserSession};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// In-memory stand-in for the remote wordbook table.
///
/// Rows are visible only to their owner, mirroring the backend's access
/// policy, and the conflict key `(user_id, english)` is case-sensitive.
#[derive(Clone)]
pub struct MockWordTable {
    rows: Arc<Mutex<Vec<(String, SavedWord)>>>,
    should_fail: bool,
    upsert_count: Arc<Mutex<usize>>,
    delete_count: Arc<Mutex<usize>>,
}

impl MockWordTable {
    pub fn new() -> Self {
        Self {
            rows: Arc::new(Mutex::new(Vec::new())),
            should_fail: false,
            upsert_count: Arc::new(Mutex::new(0)),
            delete_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_row(self, user_id: &str, word: SavedWord) -> Self {
        self.rows.lock().unwrap().push((user_id.to_string(), word));
        self
    }

    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    pub fn get_upsert_count(&self) -> usize {
        *self.upsert_count.lock().unwrap()
    }

    pub fn get_delete_count(&self) -> usize {
        *self.delete_count.lock().unwrap()
    }

    pub fn get_rows(&self) -> Vec<(String, SavedWord)> {
        self.rows.lock().unwrap().clone()
    }

    fn check_available(&self) -> Result<()> {
        if self.should_fail {
            Err(Error::Storage("Mock table unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

impl Default for MockWordTable {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteWordTable for MockWordTable {
    async fn select_all(&self, user: &UserSession) -> Result<Vec<SavedWord>> {
        self.check_available()?;

        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|(owner, _)| *owner == user.id)
            .map(|(_, word)| word.clone())
            .collect())
    }

    async fn upsert(&self, user: &UserSession, word: &SavedWord) -> Result<()> {
        *self.upsert_count.lock().unwrap() += 1;
        self.check_available()?;

        let mut rows = self.rows.lock().unwrap();
        match rows
            .iter()
            .position(|(owner, existing)| *owner == user.id && existing.english == word.english)
        {
            Some(index) => rows[index].1.korean = word.korean.clone(),
            None => rows.push((user.id.clone(), word.clone())),
        }
        Ok(())
    }

    async fn delete_by_english(&self, user: &UserSession, english: &str) -> Result<()> {
        *self.delete_count.lock().unwrap() += 1;
        self.check_available()?;

        self.rows
            .lock()
            .unwrap()
            .retain(|(owner, word)| !(*owner == user.id && word.english == english));
        Ok(())
    }
}
