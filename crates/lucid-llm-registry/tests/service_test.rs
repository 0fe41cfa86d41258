use std::sync::Arc;

use lucid_llm::{DreamData, Error, GenerationOptions, StaticSecrets};
use lucid_llm_registry::{
    AiModel, MemoryConfigStore, ProviderConfig, ProviderService, ProviderType, TaskKind,
};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn claude_config(base_url: Option<String>, text: bool, images: bool) -> ProviderConfig {
    ProviderConfig {
        id: "cfg-claude".into(),
        provider_type: ProviderType::Claude,
        name: "Claude".into(),
        base_url,
        api_key_env: "ANTHROPIC_API_KEY".into(),
        options: GenerationOptions::default(),
        is_active_for_text: text,
        is_active_for_images: images,
        default_text_model_id: text.then(|| "m1".to_string()),
        default_image_model_id: images.then(|| "m1".to_string()),
    }
}

fn claude_model() -> AiModel {
    AiModel {
        id: "m1".into(),
        name: "Claude X".into(),
        model_id: "claude-x".into(),
        provider_type: ProviderType::Claude,
        supports_images: false,
        supports_reasoning: false,
        context_window: 200_000,
        cost: Default::default(),
        tier: Default::default(),
        options: GenerationOptions::default(),
    }
}

fn service_with(store: MemoryConfigStore) -> ProviderService {
    ProviderService::new(
        Arc::new(store),
        Arc::new(StaticSecrets::new().with("ANTHROPIC_API_KEY", "test-key")),
    )
}

fn canonical_reply() -> serde_json::Value {
    json!({
        "content": [{
            "type": "text",
            "text": json!({
                "summary": "A dream about thresholds.",
                "symbolism": [{"name": "door", "meaning": "a decision not yet made"}],
                "analysis": "Full analysis.",
                "advice": ["Decide slowly."],
                "questions": ["Which door is yours?"],
            })
            .to_string(),
        }]
    })
}

#[tokio::test]
async fn provider_is_reused_within_the_freshness_window() {
    let store = MemoryConfigStore::new();
    store.add_config(claude_config(None, true, false));
    store.add_model(claude_model());
    let service = service_with(store);

    let first = service.provider(TaskKind::Text).await.unwrap();
    let second = service.provider(TaskKind::Text).await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn clearing_one_task_slot_leaves_the_other_untouched() {
    let store = MemoryConfigStore::new();
    store.add_config(claude_config(None, true, true));
    store.add_model(claude_model());
    let service = service_with(store);

    let text_before = service.provider(TaskKind::Text).await.unwrap();
    let image_before = service.provider(TaskKind::Image).await.unwrap();

    service.clear_cache(Some(TaskKind::Text));

    let text_after = service.provider(TaskKind::Text).await.unwrap();
    let image_after = service.provider(TaskKind::Image).await.unwrap();
    assert!(!Arc::ptr_eq(&text_before, &text_after));
    assert!(Arc::ptr_eq(&image_before, &image_after));
}

#[tokio::test]
async fn missing_image_configuration_fails_before_any_network_call() {
    let store = MemoryConfigStore::new();
    store.add_config(claude_config(None, true, false));
    store.add_model(claude_model());
    let service = service_with(store);

    let err = service.generate_image("a door in the fog").await.unwrap_err();
    match err {
        Error::Configuration(message) => assert!(message.contains("image"), "{message}"),
        other => panic!("expected configuration error, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_default_model_names_the_provider() {
    let store = MemoryConfigStore::new();
    let mut config = claude_config(None, true, false);
    config.default_text_model_id = None;
    store.add_config(config);
    let service = service_with(store);

    let err = service.provider(TaskKind::Text).await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Claude"), "{message}");
    assert!(message.contains("default model"), "{message}");
}

#[tokio::test]
async fn analyze_routes_through_the_active_claude_profile() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(canonical_reply()))
        .mount(&server)
        .await;

    let store = MemoryConfigStore::new();
    store.add_config(claude_config(Some(server.uri()), true, true));
    store.add_model(claude_model());
    let service = service_with(store);

    let result = service
        .analyze_dream(&DreamData::new("I stood before a door."))
        .await
        .unwrap();
    assert_eq!(result.summary, "A dream about thresholds.");
    assert_eq!(result.symbolism[0].name, "door");
    assert_eq!(result.advice, vec!["Decide slowly."]);

    // Image work is routed to the same profile, which cannot draw.
    let err = service.generate_image("the same door").await.unwrap_err();
    match err {
        Error::Unsupported { provider, .. } => assert_eq!(provider, "Claude"),
        other => panic!("expected unsupported error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_connection_reports_instead_of_raising() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let store = MemoryConfigStore::new();
    store.add_config(claude_config(Some(server.uri()), true, false));
    store.add_model(claude_model());
    let service = service_with(store);

    let report = service.test_connection(TaskKind::Text).await;
    assert!(!report.success);
    assert!(report.message.contains("Claude"), "{}", report.message);

    // An unconfigured task also comes back as a report.
    let report = service.test_connection(TaskKind::Image).await;
    assert!(!report.success);
    assert!(report.message.contains("image"), "{}", report.message);
}

#[tokio::test]
async fn active_provider_info_reflects_the_store() {
    let store = MemoryConfigStore::new();
    store.add_config(claude_config(None, true, false));
    store.add_model(claude_model());
    let service = service_with(store);

    let info = service
        .active_provider_info(TaskKind::Text)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(info.provider_type, ProviderType::Claude);
    assert_eq!(info.model_id.as_deref(), Some("claude-x"));
    assert_eq!(info.model_name.as_deref(), Some("Claude X"));

    assert!(
        service
            .active_provider_info(TaskKind::Image)
            .await
            .unwrap()
            .is_none()
    );
}
