//! Personal wordbook storage
//!
//! Signed-in callers read and write a remote per-user table; anonymous callers
//! use a single slot in local device storage. The backend is chosen per call
//! from the presence of a [`UserSession`].
//!
//! Every operation here is best effort: failures are logged and the caller
//! gets an empty list or a silent no-op.

pub mod local;
pub mod mock;
pub mod remote;

pub use local::{FileKeyValueStore, KeyValueStore, LocalWordbook, MemoryKeyValueStore, WORDBOOK_KEY};
pub use mock::MockWordTable;
pub use remote::{RemoteWordTable, RemoteWordbook, SupabaseWordTable};

use crate::models::{Config, SavedWord, UserSession};
use crate::{Error, Result};
use async_trait::async_trait;
use tracing::error;

/// A wordbook bound to one owner.
#[async_trait]
pub trait WordbookBackend: Send + Sync {
    async fn list(&self) -> Result<Vec<SavedWord>>;
    /// Insert `word`, or replace the korean of the entry with the same key.
    async fn save(&self, word: &SavedWord) -> Result<()>;
    async fn remove(&self, english: &str) -> Result<()>;
}

pub struct Wordbook {
    remote: Option<Box<dyn RemoteWordTable>>,
    local: Box<dyn KeyValueStore>,
}

fn target(user: Option<&UserSession>) -> &'static str {
    match user {
        Some(_) => "remote table",
        None => "local storage",
    }
}

impl Wordbook {
    pub fn new(remote: Option<Box<dyn RemoteWordTable>>, local: Box<dyn KeyValueStore>) -> Self {
        Self { remote, local }
    }

    pub fn from_config(config: &Config) -> Self {
        let remote = config.supabase.as_ref().map(|supabase| {
            Box::new(SupabaseWordTable::new(
                supabase.url.clone(),
                supabase.anon_key.clone(),
            )) as Box<dyn RemoteWordTable>
        });

        Self::new(
            remote,
            Box::new(FileKeyValueStore::new(&config.wordbook_dir)),
        )
    }

    /// Pick the backend for this call.
    pub fn backend<'a>(
        &'a self,
        user: Option<&'a UserSession>,
    ) -> Result<Box<dyn WordbookBackend + 'a>> {
        match user {
            Some(user) => {
                let table = self.remote.as_deref().ok_or_else(|| {
                    Error::Config(
                        "Remote wordbook is not configured (set SUPABASE_URL and SUPABASE_ANON_KEY)"
                            .to_string(),
                    )
                })?;
                Ok(Box::new(RemoteWordbook::new(table, user)))
            }
            None => Ok(Box::new(LocalWordbook::new(self.local.as_ref()))),
        }
    }

    async fn try_list(&self, user: Option<&UserSession>) -> Result<Vec<SavedWord>> {
        self.backend(user)?.list().await
    }

    async fn try_save(&self, word: &SavedWord, user: Option<&UserSession>) -> Result<()> {
        self.backend(user)?.save(word).await
    }

    async fn try_remove(&self, english: &str, user: Option<&UserSession>) -> Result<()> {
        self.backend(user)?.remove(english).await
    }

    /// All saved words; empty when the backend cannot be read.
    pub async fn list(&self, user: Option<&UserSession>) -> Vec<SavedWord> {
        self.try_list(user).await.unwrap_or_else(|e| {
            error!("Error reading wordbook from {}: {}", target(user), e);
            Vec::new()
        })
    }

    pub async fn save(&self, word: &SavedWord, user: Option<&UserSession>) {
        if let Err(e) = self.try_save(word, user).await {
            error!(
                "Error saving \"{}\" to wordbook in {}: {}",
                word.english,
                target(user),
                e
            );
        }
    }

    pub async fn remove(&self, english: &str, user: Option<&UserSession>) {
        if let Err(e) = self.try_remove(english, user).await {
            error!(
                "Error removing \"{}\" from wordbook in {}: {}",
                english,
                target(user),
                e
            );
        }
    }
}
