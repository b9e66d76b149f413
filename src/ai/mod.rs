//! AI service integration for structured text and image generation
//!
//! Text operations request JSON constrained by a declarative [`Schema`];
//! image operations return raw bytes plus their MIME type.

pub mod gemini;
pub mod mock;

pub use gemini::{GeminiImageClient, GeminiTextClient};
pub use mock::{MockImageClient, MockTextClient};

use crate::schema::Schema;
use crate::Result;
use async_trait::async_trait;
use base64::Engine as _;

#[async_trait]
pub trait TextGenerationService: Send + Sync {
    /// Returns the raw JSON text the model produced under `schema`.
    async fn generate_json(&self, prompt: &str, schema: &Schema) -> Result<String>;
}

#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl GeneratedImage {
    /// Encode as a `data:` URI suitable for an `<img src>`.
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}
