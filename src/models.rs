//! Data models and structures
//!
//! Defines the records produced by the model service, the persisted wordbook
//! entry, the caller identity used to reach the remote wordbook, and the
//! runtime configuration.

use serde::{Deserialize, Serialize};

pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "imagen-3.0-generate-002";
pub const DEFAULT_WORDBOOK_DIR: &str = ".wordscene";

/// Morphological breakdown of an English word.
///
/// Absent morphemes come back as `"N/A"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EtymologyAnalysis {
    pub prefix: String,
    pub root: String,
    pub suffix: String,
    pub explanation: String,
    pub explanation_korean: String,
    pub related_words: Vec<String>,
}

/// One conversational usage of a word.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NuanceEntry {
    pub nuance: String,
    pub nuance_korean: String,
    pub explanation: String,
    pub explanation_korean: String,
    pub example: String,
    pub example_korean: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WordDefinition {
    pub part_of_speech: String,
    pub definition: String,
    pub definition_korean: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoryBundle {
    pub story: String,
    pub story_korean: String,
    pub image_prompt: String,
}

/// A nuance-bearing English word and the Korean chuimsae chosen for it.
///
/// `options[0]` is the recommended chuimsae, which the model places verbatim
/// in the full translation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedWord {
    pub english_word: String,
    pub recommended_chuimsae: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NuanceTranslation {
    pub full_translation: String,
    pub annotated_words: Vec<AnnotatedWord>,
}

/// Entry in a user's wordbook.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SavedWord {
    pub english: String,
    pub korean: String,
}

impl SavedWord {
    pub fn new(english: impl Into<String>, korean: impl Into<String>) -> Self {
        Self {
            english: english.into(),
            korean: korean.into(),
        }
    }

    /// Uniqueness key within the local wordbook.
    pub fn key(&self) -> String {
        key_for(&self.english)
    }
}

/// Local wordbook key for an english word.
pub fn key_for(english: &str) -> String {
    english.to_lowercase()
}

/// Authenticated caller of the remote wordbook.
///
/// `access_token` is the user's session JWT; the backend scopes rows to `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    pub id: String,
    pub access_token: String,
}

impl UserSession {
    pub fn new(id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            access_token: access_token.into(),
        }
    }
}

/// Connection details for the remote wordbook table.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Checked when the prompt gateway is built, so wordbook-only use works without it.
    pub gemini_api_key: Option<String>,
    pub text_model: String,
    pub image_model: String,
    pub supabase: Option<SupabaseConfig>,
    pub wordbook_dir: String,
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        let supabase = match (non_empty_env("SUPABASE_URL"), non_empty_env("SUPABASE_ANON_KEY")) {
            (Some(url), Some(anon_key)) => Some(SupabaseConfig { url, anon_key }),
            (None, None) => None,
            _ => {
                return Err(crate::Error::Config(
                    "SUPABASE_URL and SUPABASE_ANON_KEY must be set together".to_string(),
                ))
            }
        };

        Ok(Self {
            gemini_api_key: non_empty_env("GEMINI_API_KEY"),
            text_model: non_empty_env("TEXT_MODEL")
                .unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
            image_model: non_empty_env("IMAGE_MODEL")
                .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            supabase,
            wordbook_dir: non_empty_env("WORDBOOK_DIR")
                .unwrap_or_else(|| DEFAULT_WORDBOOK_DIR.to_string()),
        })
    }
}
