use pretty_assertions::assert_eq;
use wordscene::{
    ai::{MockImageClient, MockTextClient},
    gateway::GatewayServices,
    models::{SavedWord, UserSession},
    schema::SchemaType,
    wordbook::{FileKeyValueStore, MemoryKeyValueStore, MockWordTable, WORDBOOK_KEY},
    Error, Operation, PromptGateway, Wordbook,
};

const STORY_JSON: &str = r#"{
    "story": "The princess lost her glass ball under the moon.",
    "storyKorean": "공주는 달빛 아래에서 유리 공을 잃어버렸다.",
    "imagePrompt": "A princess searching for a glass ball under a full moon, storybook style"
}"#;

fn gateway(text: &MockTextClient, image: &MockImageClient) -> PromptGateway {
    PromptGateway::with_services(GatewayServices {
        text: Box::new(text.clone()),
        image: Box::new(image.clone()),
    })
}

#[tokio::test]
async fn test_story_then_illustration_workflow() {
    let text = MockTextClient::new().with_response(STORY_JSON);
    let image = MockImageClient::new();
    let gateway = gateway(&text, &image);

    let words = vec![
        "princess".to_string(),
        "glass".to_string(),
        "moon".to_string(),
    ];
    let story = gateway.generate_story(&words).await.unwrap();
    let uri = gateway.generate_image(&story.image_prompt).await.unwrap();

    assert!(text.get_prompts()[0].contains("princess, glass, moon"));
    assert_eq!(
        text.get_schemas()[0].property_names(),
        vec!["story", "storyKorean", "imagePrompt"]
    );
    assert_eq!(image.get_prompts(), vec![story.image_prompt.clone()]);
    assert!(uri.starts_with("data:image/jpeg;base64,"));
}

#[tokio::test]
async fn test_every_failure_carries_its_operation_message() {
    let text = MockTextClient::new().with_failure();
    let image = MockImageClient::new().with_failure();
    let gateway = gateway(&text, &image);

    let failures = vec![
        (
            Operation::Etymology,
            gateway.analyze_etymology("portable").await.unwrap_err(),
        ),
        (
            Operation::Nuances,
            gateway.find_nuances("portable").await.unwrap_err(),
        ),
        (
            Operation::Definition,
            gateway.get_definition("portable").await.unwrap_err(),
        ),
        (
            Operation::Story,
            gateway
                .generate_story(&["portable".to_string()])
                .await
                .unwrap_err(),
        ),
        (
            Operation::Image,
            gateway.generate_image("a suitcase").await.unwrap_err(),
        ),
        (
            Operation::NuanceTranslation,
            gateway.nuance_translation("It could work.").await.unwrap_err(),
        ),
    ];

    for (operation, err) in failures {
        assert!(matches!(err, Error::Operation(op) if op == operation));
        assert_eq!(err.to_string(), operation.failure_message());
    }
    assert_eq!(text.get_call_count(), 5);
    assert_eq!(image.get_call_count(), 1);
}

#[tokio::test]
async fn test_malformed_model_output_fails_the_operation() {
    let text = MockTextClient::new().with_response(r#"{"prefix": "un""#);
    let gateway = gateway(&text, &MockImageClient::new());

    let err = gateway.analyze_etymology("undo").await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Failed to analyze the word. Please try again."
    );
}

#[tokio::test]
async fn test_translation_schema_requests_annotations() {
    let text = MockTextClient::new().with_response(
        r#"{"fullTranslation": "그건 아마 될 거예요.",
            "annotatedWords": [{"englishWord": "could", "recommendedChuimsae": "아마", "options": ["아마", "혹시"]}]}"#,
    );
    let gateway = gateway(&text, &MockImageClient::new());

    let translation = gateway.nuance_translation("It could work.").await.unwrap();
    let annotated = &translation.annotated_words[0];
    assert_eq!(annotated.options[0], annotated.recommended_chuimsae);
    assert!(translation
        .full_translation
        .contains(&annotated.recommended_chuimsae));

    let schema = &text.get_schemas()[0];
    assert_eq!(schema.kind, SchemaType::Object);
    assert_eq!(
        schema.property("annotatedWords").map(|s| s.kind),
        Some(SchemaType::Array)
    );
}

#[tokio::test]
async fn test_anonymous_wordbook_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();

    let first = Wordbook::new(None, Box::new(FileKeyValueStore::new(dir.path())));
    first.save(&SavedWord::new("Apple", "사과"), None).await;
    first.save(&SavedWord::new("moon", "달"), None).await;
    first.save(&SavedWord::new("apple", "능금"), None).await;

    let second = Wordbook::new(None, Box::new(FileKeyValueStore::new(dir.path())));
    assert_eq!(
        second.list(None).await,
        vec![SavedWord::new("apple", "능금"), SavedWord::new("moon", "달")]
    );

    second.remove("MOON", None).await;
    assert_eq!(
        second.list(None).await,
        vec![SavedWord::new("apple", "능금")]
    );

    let raw = std::fs::read_to_string(dir.path().join(format!("{}.json", WORDBOOK_KEY))).unwrap();
    assert_eq!(raw, r#"[{"english":"apple","korean":"능금"}]"#);
}

#[tokio::test]
async fn test_signed_in_and_anonymous_wordbooks_are_separate() {
    let table = MockWordTable::new().with_row("bob", SavedWord::new("river", "강"));
    let store = MemoryKeyValueStore::new();
    let wordbook = Wordbook::new(Some(Box::new(table.clone())), Box::new(store.clone()));
    let alice = UserSession::new("alice", "alice-token");

    wordbook.save(&SavedWord::new("apple", "사과"), Some(&alice)).await;
    wordbook.save(&SavedWord::new("moon", "달"), None).await;

    assert_eq!(
        wordbook.list(Some(&alice)).await,
        vec![SavedWord::new("apple", "사과")]
    );
    assert_eq!(wordbook.list(None).await, vec![SavedWord::new("moon", "달")]);
    assert_eq!(table.get_rows().len(), 2);
    assert_eq!(store.get_write_count(), 1);
}

#[tokio::test]
async fn test_remote_matching_is_case_sensitive() {
    let table = MockWordTable::new();
    let wordbook = Wordbook::new(
        Some(Box::new(table.clone())),
        Box::new(MemoryKeyValueStore::new()),
    );
    let alice = UserSession::new("alice", "alice-token");

    wordbook.save(&SavedWord::new("Apple", "사과"), Some(&alice)).await;
    wordbook.remove("apple", Some(&alice)).await;

    assert_eq!(
        wordbook.list(Some(&alice)).await,
        vec![SavedWord::new("Apple", "사과")]
    );
    assert_eq!(table.get_delete_count(), 1);
}

#[tokio::test]
async fn test_unavailable_remote_fails_open() {
    let table = MockWordTable::new().with_failure();
    let store = MemoryKeyValueStore::new();
    let wordbook = Wordbook::new(Some(Box::new(table.clone())), Box::new(store.clone()));
    let alice = UserSession::new("alice", "alice-token");

    wordbook.save(&SavedWord::new("apple", "사과"), Some(&alice)).await;
    wordbook.remove("apple", Some(&alice)).await;

    assert_eq!(wordbook.list(Some(&alice)).await, Vec::<SavedWord>::new());
    assert_eq!(table.get_upsert_count(), 1);
    assert_eq!(store.get_write_count(), 0);
}
