//! Language-learning assistant for Korean students of English
//!
//! Sends schema-constrained prompts to a generative model to produce word
//! etymologies, conversational nuances, definitions, illustrated stories and
//! nuance-annotated translations, and keeps a personal wordbook either in a
//! remote per-user table or in a local device slot.

pub mod ai;
pub mod error;
pub mod gateway;
pub mod models;
pub mod prompts;
pub mod schema;
pub mod wordbook;

pub use error::{Error, Result};
pub use gateway::{Operation, PromptGateway};
pub use wordbook::Wordbook;
