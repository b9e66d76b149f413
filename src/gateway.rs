//! Prompt gateway: one schema-constrained model call per learning feature.
//!
//! Every operation builds its prompt, asks the model for JSON matching a
//! declared [`Schema`], and parses the trimmed response into a typed record.
//! Failures are logged with the operation's input and collapsed into
//! [`Error::Operation`], whose message is safe to show to a learner.

use crate::ai::{
    GeminiImageClient, GeminiTextClient, ImageGenerationService, TextGenerationService,
};
use crate::models::{
    EtymologyAnalysis, NuanceEntry, NuanceTranslation, StoryBundle, WordDefinition,
};
use crate::schema::{self, Schema};
use crate::{prompts, Error, Result};
use serde::de::DeserializeOwned;
use std::fmt::Display;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Etymology,
    Nuances,
    Definition,
    Story,
    Image,
    NuanceTranslation,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::Etymology => "etymology",
            Operation::Nuances => "nuances",
            Operation::Definition => "definition",
            Operation::Story => "story",
            Operation::Image => "image",
            Operation::NuanceTranslation => "nuance translation",
        }
    }

    /// Message shown to the learner when this operation fails.
    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::Etymology => "Failed to analyze the word. Please try again.",
            Operation::Nuances => {
                "Failed to find conversational nuances. The word might be too uncommon."
            }
            Operation::Definition => "Failed to get the word's definition.",
            Operation::Story => {
                "Failed to generate a story. Please check your words and try again."
            }
            Operation::Image => "Failed to generate an image. The prompt might be too complex.",
            Operation::NuanceTranslation => "Failed to get nuance translation. Please try again.",
        }
    }
}

/// Definition, etymology and nuances for one word, fetched together.
///
/// Each part fails independently.
#[derive(Debug)]
pub struct WordExploration {
    pub definition: Result<WordDefinition>,
    pub etymology: Result<EtymologyAnalysis>,
    pub nuances: Result<Vec<NuanceEntry>>,
}

/// Injectable model services used to construct [`PromptGateway`] in tests.
pub struct GatewayServices {
    pub text: Box<dyn TextGenerationService>,
    pub image: Box<dyn ImageGenerationService>,
}

pub struct PromptGateway {
    text: Box<dyn TextGenerationService>,
    image: Box<dyn ImageGenerationService>,
}

impl PromptGateway {
    pub fn with_services(services: GatewayServices) -> Self {
        Self {
            text: services.text,
            image: services.image,
        }
    }

    /// Build a gateway backed by Gemini text and Imagen models.
    ///
    /// Fails when `api_key` is blank.
    pub fn new(api_key: String, text_model: String, image_model: String) -> Result<Self> {
        let api_key = api_key.trim().to_string();
        if api_key.is_empty() {
            return Err(Error::Config(
                "A Gemini API key is required to build the prompt gateway".to_string(),
            ));
        }

        // Reuse one HTTP connection pool across both model clients.
        let http_client = reqwest::Client::new();

        info!("Text model: {}", text_model);
        info!("Image model: {}", image_model);

        Ok(Self::with_services(GatewayServices {
            text: Box::new(GeminiTextClient::new_with_client(
                api_key.clone(),
                text_model,
                http_client.clone(),
            )),
            image: Box::new(GeminiImageClient::new_with_client(
                api_key,
                image_model,
                http_client,
            )),
        }))
    }

    pub fn from_config(config: &crate::models::Config) -> Result<Self> {
        let api_key = config.gemini_api_key.clone().ok_or_else(|| {
            Error::Config(
                "GEMINI_API_KEY is not set. Add it to the environment or a .env file.".to_string(),
            )
        })?;
        Self::new(
            api_key,
            config.text_model.clone(),
            config.image_model.clone(),
        )
    }

    async fn structured<T: DeserializeOwned>(&self, prompt: &str, schema: &Schema) -> Result<T> {
        let text = self.text.generate_json(prompt, schema).await?;
        Ok(serde_json::from_str(text.trim())?)
    }

    /// Log the underlying failure and replace it with the operation's message.
    fn normalize<T>(operation: Operation, subject: impl Display, result: Result<T>) -> Result<T> {
        result.map_err(|e| {
            error!("Error fetching {} for \"{}\": {}", operation.name(), subject, e);
            Error::Operation(operation)
        })
    }

    pub async fn analyze_etymology(&self, word: &str) -> Result<EtymologyAnalysis> {
        let prompt = prompts::render(prompts::ETYMOLOGY, &[("word", word)]);
        let result = self.structured(&prompt, &schema::etymology()).await;
        Self::normalize(Operation::Etymology, word, result)
    }

    pub async fn find_nuances(&self, word: &str) -> Result<Vec<NuanceEntry>> {
        let prompt = prompts::render(prompts::NUANCES, &[("word", word)]);
        let result = self.structured(&prompt, &schema::nuances()).await;
        Self::normalize(Operation::Nuances, word, result)
    }

    pub async fn get_definition(&self, word: &str) -> Result<WordDefinition> {
        let prompt = prompts::render(prompts::DEFINITION, &[("word", word)]);
        let result = self.structured(&prompt, &schema::definition()).await;
        Self::normalize(Operation::Definition, word, result)
    }

    /// Short story using every word in order, its Korean translation and an
    /// image prompt for [`Self::generate_image`].
    pub async fn generate_story(&self, words: &[String]) -> Result<StoryBundle> {
        let words_str = prompts::join_words(words);
        let prompt = prompts::render(prompts::STORY, &[("words", &words_str)]);
        let result = self.structured(&prompt, &schema::story()).await;
        Self::normalize(Operation::Story, &words_str, result)
    }

    /// Generate one 16:9 image and return it as a `data:` URI.
    pub async fn generate_image(&self, prompt: &str) -> Result<String> {
        let result = self
            .image
            .generate_image(prompt)
            .await
            .map(|image| image.to_data_uri());
        Self::normalize(Operation::Image, prompt, result)
    }

    pub async fn nuance_translation(&self, sentence: &str) -> Result<NuanceTranslation> {
        let prompt = prompts::render(prompts::NUANCE_TRANSLATION, &[("sentence", sentence)]);
        let result = self.structured(&prompt, &schema::nuance_translation()).await;
        Self::normalize(Operation::NuanceTranslation, sentence, result)
    }

    /// Fetch definition, etymology and nuances for `word` concurrently.
    pub async fn explore_word(&self, word: &str) -> WordExploration {
        let (definition, etymology, nuances) = tokio::join!(
            self.get_definition(word),
            self.analyze_etymology(word),
            self.find_nuances(word)
        );

        WordExploration {
            definition,
            etymology,
            nuances,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{MockImageClient, MockTextClient};
    use crate::schema::SchemaType;
    use pretty_assertions::assert_eq;

    const ETYMOLOGY_JSON: &str = r#"
        {
            "prefix": "trans-",
            "root": "port",
            "suffix": "N/A",
            "explanation": "to carry across",
            "explanationKorean": "가로질러 나르다",
            "relatedWords": ["import", "export", "portable", "report", "support"]
        }
    "#;

    const NUANCES_JSON: &str = r#"[
        {"nuance": "Possibility", "nuanceKorean": "가능성", "explanation": "Something might happen.",
         "explanationKorean": "무언가 일어날 수 있다.", "example": "It could rain.", "exampleKorean": "비가 올 수도 있어요."},
        {"nuance": "Polite request", "nuanceKorean": "정중한 요청", "explanation": "Asking politely.",
         "explanationKorean": "정중하게 묻기.", "example": "Could you help me?", "exampleKorean": "도와주실 수 있나요?"},
        {"nuance": "Past ability", "nuanceKorean": "과거의 능력", "explanation": "Ability in the past.",
         "explanationKorean": "과거에 할 수 있었던 일.", "example": "I could swim.", "exampleKorean": "나는 수영할 수 있었어요."}
    ]"#;

    const TRANSLATION_JSON: &str = r#"{
        "fullTranslation": "그는 아마 늦을 거예요",
        "annotatedWords": [
            {"englishWord": "might", "recommendedChuimsae": "아마", "options": ["아마", "혹시", "어쩌면"]}
        ]
    }"#;

    fn gateway_with(text: MockTextClient, image: MockImageClient) -> PromptGateway {
        PromptGateway::with_services(GatewayServices {
            text: Box::new(text),
            image: Box::new(image),
        })
    }

    #[tokio::test]
    async fn test_analyze_etymology_parses_trimmed_response() {
        let text = MockTextClient::new().with_response(ETYMOLOGY_JSON);
        let probe = text.clone();
        let gateway = gateway_with(text, MockImageClient::new());

        let etymology = gateway.analyze_etymology("transport").await.unwrap();
        assert_eq!(etymology.root, "port");
        assert_eq!(etymology.suffix, "N/A");
        assert_eq!(etymology.related_words.len(), 5);

        let prompts = probe.get_prompts();
        assert!(prompts[0].contains("'transport'"));
        assert_eq!(probe.get_schemas()[0], schema::etymology());
    }

    #[tokio::test]
    async fn test_find_nuances_returns_all_entries() {
        let text = MockTextClient::new().with_response(NUANCES_JSON);
        let probe = text.clone();
        let gateway = gateway_with(text, MockImageClient::new());

        let nuances = gateway.find_nuances("could").await.unwrap();
        assert!(nuances.len() >= 3);
        assert!(nuances.iter().all(|n| !n.example_korean.is_empty()));
        assert_eq!(probe.get_schemas()[0].kind, SchemaType::Array);
    }

    #[tokio::test]
    async fn test_get_definition() {
        let text = MockTextClient::new().with_response(
            r#"{"partOfSpeech":"noun","definition":"a round fruit","definitionKorean":"둥근 과일"}"#,
        );
        let gateway = gateway_with(text, MockImageClient::new());

        let definition = gateway.get_definition("apple").await.unwrap();
        assert_eq!(
            definition,
            WordDefinition {
                part_of_speech: "noun".to_string(),
                definition: "a round fruit".to_string(),
                definition_korean: "둥근 과일".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_generate_story_lists_words_in_order() {
        let text = MockTextClient::new().with_response(
            r#"{"story":"A princess liked a ball.","storyKorean":"공주는 좋아했어요. 공을.","imagePrompt":"a princess with a red ball"}"#,
        );
        let probe = text.clone();
        let gateway = gateway_with(text, MockImageClient::new());

        let words = vec!["princess".to_string(), "ball".to_string()];
        let story = gateway.generate_story(&words).await.unwrap();

        assert_eq!(story.image_prompt, "a princess with a red ball");
        assert!(probe.get_prompts()[0].contains("English words: princess, ball."));
    }

    #[tokio::test]
    async fn test_generate_image_returns_data_uri() {
        let image = MockImageClient::new().with_image("image/jpeg", vec![0xFF, 0xD8, 0xFF]);
        let probe = image.clone();
        let gateway = gateway_with(MockTextClient::new(), image);

        let uri = gateway.generate_image("a princess").await.unwrap();
        assert_eq!(uri, "data:image/jpeg;base64,/9j/");
        assert_eq!(probe.get_prompts(), vec!["a princess"]);
    }

    #[tokio::test]
    async fn test_nuance_translation_keeps_recommended_first() {
        let text = MockTextClient::new().with_response(TRANSLATION_JSON);
        let gateway = gateway_with(text, MockImageClient::new());

        let translation = gateway
            .nuance_translation("He might be late")
            .await
            .unwrap();

        for word in &translation.annotated_words {
            assert!(translation.full_translation.contains(&word.recommended_chuimsae));
            assert_eq!(word.options[0], word.recommended_chuimsae);
        }
    }

    #[tokio::test]
    async fn test_provider_failure_is_normalized_per_operation() {
        let gateway = gateway_with(
            MockTextClient::new().with_failure(),
            MockImageClient::new().with_failure(),
        );

        let err = gateway.analyze_etymology("x").await.unwrap_err();
        assert!(matches!(err, Error::Operation(Operation::Etymology)));
        assert_eq!(err.to_string(), "Failed to analyze the word. Please try again.");

        let err = gateway.find_nuances("x").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to find conversational nuances. The word might be too uncommon."
        );

        let err = gateway.generate_image("x").await.unwrap_err();
        assert!(matches!(err, Error::Operation(Operation::Image)));
    }

    #[tokio::test]
    async fn test_malformed_json_is_normalized() {
        let text = MockTextClient::new().with_response("{\"story\": \"unterminated");
        let gateway = gateway_with(text, MockImageClient::new());

        let err = gateway
            .generate_story(&["cat".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Operation(Operation::Story)));
        assert!(!err.to_string().contains("unterminated"));
    }

    #[tokio::test]
    async fn test_schema_mismatch_is_normalized() {
        let text = MockTextClient::new().with_response(r#"{"partOfSpeech":"noun"}"#);
        let gateway = gateway_with(text, MockImageClient::new());

        let err = gateway.get_definition("apple").await.unwrap_err();
        assert!(matches!(err, Error::Operation(Operation::Definition)));
    }

    #[tokio::test]
    async fn test_explore_word_reports_parts_independently() {
        // Every call receives the definition JSON, which fits neither the
        // etymology nor the nuances schema.
        let text = MockTextClient::new().with_response(
            r#"{"partOfSpeech":"verb","definition":"to move","definitionKorean":"움직이다"}"#,
        );
        let probe = text.clone();
        let gateway = gateway_with(text, MockImageClient::new());

        let exploration = gateway.explore_word("move").await;
        assert_eq!(exploration.definition.unwrap().part_of_speech, "verb");
        assert!(matches!(
            exploration.etymology,
            Err(Error::Operation(Operation::Etymology))
        ));
        assert!(matches!(
            exploration.nuances,
            Err(Error::Operation(Operation::Nuances))
        ));
        assert_eq!(probe.get_call_count(), 3);
    }

    #[test]
    fn test_new_rejects_blank_api_key() {
        let result = PromptGateway::new(
            "  ".to_string(),
            "gemini-2.5-flash".to_string(),
            "imagen-3.0-generate-002".to_string(),
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
