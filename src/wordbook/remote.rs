use super::WordbookBackend;
use crate::models::{SavedWord, UserSession};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use std::time::Duration;

pub const WORDBOOK_TABLE: &str = "wordbook";
const CONFLICT_COLUMNS: &str = "user_id,english";

/// Per-user wordbook rows held by a hosted backend.
///
/// Row visibility is enforced by the backend's access policy for the
/// session, not by filters sent from here.
#[async_trait]
pub trait RemoteWordTable: Send + Sync {
    async fn select_all(&self, user: &UserSession) -> Result<Vec<SavedWord>>;
    /// Insert or replace on the `(user_id, english)` key.
    async fn upsert(&self, user: &UserSession, word: &SavedWord) -> Result<()>;
    /// Delete rows whose english equals `english` exactly.
    async fn delete_by_english(&self, user: &UserSession, english: &str) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct WordbookRow<'a> {
    user_id: &'a str,
    english: &'a str,
    korean: &'a str,
}

/// `wordbook` table served through Supabase's PostgREST API.
pub struct SupabaseWordTable {
    client: Client,
    base_url: String,
    anon_key: String,
    timeout: Duration,
}

impl SupabaseWordTable {
    pub fn new(base_url: String, anon_key: String) -> Self {
        Self::new_with_client(base_url, anon_key, Client::new())
    }

    pub fn new_with_client(base_url: String, anon_key: String, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
            timeout: Duration::from_secs(15),
        }
    }

    fn request(&self, method: Method, user: &UserSession) -> RequestBuilder {
        self.client
            .request(method, format!("{}/rest/v1/{}", self.base_url, WORDBOOK_TABLE))
            .timeout(self.timeout)
            .header("apikey", &self.anon_key)
            .bearer_auth(&user.access_token)
    }

    async fn send(&self, action: &str, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(|e| {
            tracing::error!("Failed to send {} request to Supabase: {}", action, e);
            e
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            tracing::error!(
                "Supabase {} error (status {}): {}",
                action,
                status,
                error_text
            );
            return Err(Error::Storage(format!(
                "Supabase {} error (status {}): {}",
                action, status, error_text
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl RemoteWordTable for SupabaseWordTable {
    async fn select_all(&self, user: &UserSession) -> Result<Vec<SavedWord>> {
        let request = self.request(Method::GET, user).query(&[("select", "*")]);
        let body = self.send("select", request).await?.text().await?;

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Supabase rows: {}\nBody: {}", e, body);
            Error::Storage(format!("Failed to parse Supabase rows: {}", e))
        })
    }

    async fn upsert(&self, user: &UserSession, word: &SavedWord) -> Result<()> {
        let row = WordbookRow {
            user_id: &user.id,
            english: &word.english,
            korean: &word.korean,
        };

        let request = self
            .request(Method::POST, user)
            .query(&[("on_conflict", CONFLICT_COLUMNS)])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&row);
        self.send("upsert", request).await?;
        Ok(())
    }

    async fn delete_by_english(&self, user: &UserSession, english: &str) -> Result<()> {
        let filter = format!("eq.{}", english);
        let request = self
            .request(Method::DELETE, user)
            .query(&[("english", filter.as_str())]);
        self.send("delete", request).await?;
        Ok(())
    }
}

/// Remote wordbook bound to a signed-in user.
pub struct RemoteWordbook<'a> {
    table: &'a dyn RemoteWordTable,
    user: &'a UserSession,
}

impl<'a> RemoteWordbook<'a> {
    pub fn new(table: &'a dyn RemoteWordTable, user: &'a UserSession) -> Self {
        Self { table, user }
    }
}

#[async_trait]
impl<'a> WordbookBackend for RemoteWordbook<'a> {
    async fn list(&self) -> Result<Vec<SavedWord>> {
        self.table.select_all(self.user).await
    }

    async fn save(&self, word: &SavedWord) -> Result<()> {
        self.table.upsert(self.user, word).await
    }

    async fn remove(&self, english: &str) -> Result<()> {
        self.table.delete_by_english(self.user, english).await
    }
}
