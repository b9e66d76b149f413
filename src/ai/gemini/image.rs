use super::client::GeminiHttpClient;
use crate::ai::{GeneratedImage, ImageGenerationService};
use crate::{Error, Result};
use async_trait::async_trait;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const IMAGE_COUNT: u32 = 1;
pub const IMAGE_ASPECT_RATIO: &str = "16:9";
pub const IMAGE_MIME_TYPE: &str = "image/jpeg";

#[derive(Debug, Serialize)]
struct PredictRequest {
    instances: Vec<ImageInstance>,
    parameters: ImageParameters,
}

#[derive(Debug, Serialize)]
struct ImageInstance {
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageParameters {
    sample_count: u32,
    aspect_ratio: &'static str,
    output_options: OutputOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OutputOptions {
    mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    #[serde(default)]
    bytes_base64_encoded: Option<String>,
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    rai_filtered_reason: Option<String>,
}

/// Format of a prediction that carried no `mimeType`.
///
/// Imagen sometimes omits the field; anything that is not PNG or WebP is
/// taken to be the JPEG we asked for.
fn predicted_mime_type(bytes: &[u8]) -> &'static str {
    match bytes {
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        [0xFF, 0xD8, 0xFF, ..] => IMAGE_MIME_TYPE,
        _ => {
            tracing::warn!(
                "Imagen returned {} bytes of unknown format, labelling as {}",
                bytes.len(),
                IMAGE_MIME_TYPE
            );
            IMAGE_MIME_TYPE
        }
    }
}

/// Imagen client producing one 16:9 JPEG per prompt.
pub struct GeminiImageClient {
    http: GeminiHttpClient,
}

impl GeminiImageClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(
                api_key,
                model,
                Duration::from_secs(120),
                client,
            ),
        }
    }
}

#[cfg(test)]
super::impl_with_gemini_base_url!(GeminiImageClient);

#[async_trait]
impl ImageGenerationService for GeminiImageClient {
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage> {
        let request = PredictRequest {
            instances: vec![ImageInstance {
                prompt: prompt.to_string(),
            }],
            parameters: ImageParameters {
                sample_count: IMAGE_COUNT,
                aspect_ratio: IMAGE_ASPECT_RATIO,
                output_options: OutputOptions {
                    mime_type: IMAGE_MIME_TYPE,
                },
            },
        };

        let response: PredictResponse = self.http.predict(&request).await?;

        let prediction = response
            .predictions
            .into_iter()
            .next()
            .ok_or_else(|| Error::AiProvider("No image in Imagen response".to_string()))?;

        let encoded = match prediction.bytes_base64_encoded {
            Some(encoded) => encoded,
            None => {
                let reason = prediction
                    .rai_filtered_reason
                    .unwrap_or_else(|| "no image bytes".to_string());
                return Err(Error::AiProvider(format!(
                    "Imagen returned no image: {}",
                    reason
                )));
            }
        };

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&encoded)
            .map_err(|e| Error::AiProvider(format!("Failed to decode Imagen base64 image: {}", e)))?;

        let mime_type = prediction
            .mime_type
            .unwrap_or_else(|| predicted_mime_type(&bytes).to_string());

        tracing::debug!(
            "Imagen returned {} bytes with mime_type: {}",
            bytes.len(),
            mime_type
        );

        Ok(GeneratedImage { mime_type, bytes })
    }
}
