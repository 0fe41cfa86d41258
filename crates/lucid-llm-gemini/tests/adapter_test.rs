use lucid_llm::{DreamAnalyzer, DreamData, Error, GenerationOptions};
use lucid_llm_gemini::{GeminiAnalyzer, GeminiConfig};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(base_url: &str) -> GeminiConfig {
    GeminiConfig {
        provider_name: "Gemini".into(),
        api_key: Some("test-key".into()),
        key_env: "GEMINI_API_KEY".into(),
        base_url: base_url.into(),
        model: "gemini-pro".into(),
        options: GenerationOptions::default(),
    }
}

fn text_reply(text: &str) -> serde_json::Value {
    json!({
        "candidates": [
            {"content": {"role": "model", "parts": [{"text": text}]}}
        ]
    })
}

fn stage_one_reply() -> serde_json::Value {
    text_reply(
        &json!({
            "summary": "A dream about thaw.",
            "analysis": "Long-form analysis.",
            "advice": ["Let things melt."],
            "questions": ["What is thawing?"],
            "symbol_names": ["lake", "ice"],
        })
        .to_string(),
    )
}

const GENERATE_PATH: &str = "/models/gemini-pro:generateContent";

#[tokio::test]
async fn missing_key_fails_on_call_not_construction() {
    let mut cfg = config("http://localhost");
    cfg.api_key = None;
    // Deferred validation: construction succeeds.
    let analyzer = GeminiAnalyzer::new(cfg).unwrap();
    let err = analyzer
        .analyze_dream(&DreamData::new("dream"))
        .await
        .unwrap_err();
    match err {
        Error::Authentication { provider, env_var } => {
            assert_eq!(provider, "Gemini");
            assert_eq!(env_var, "GEMINI_API_KEY");
        }
        other => panic!("expected authentication error, got {other:?}"),
    }
}

#[tokio::test]
async fn two_stage_pipeline_collects_symbols_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_string_contains("list only the names"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stage_one_reply()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_string_contains("dream symbol \\\"lake\\\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply(
            &json!({"name": "lake", "meaning": "still depths of feeling"}).to_string(),
        )))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_string_contains("dream symbol \\\"ice\\\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply(
            &json!({"name": "ice", "meaning": "feelings held in place"}).to_string(),
        )))
        .mount(&server)
        .await;

    let analyzer = GeminiAnalyzer::new(config(&server.uri())).unwrap();
    let result = analyzer
        .analyze_dream(&DreamData::new("I walked on a frozen shore."))
        .await
        .unwrap();

    assert_eq!(result.summary, "A dream about thaw.");
    assert_eq!(result.analysis, "Long-form analysis.");
    assert_eq!(result.advice, vec!["Let things melt."]);
    let names: Vec<_> = result.symbolism.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["lake", "ice"]);
    assert_eq!(result.symbolism[0].meaning, "still depths of feeling");
}

#[tokio::test]
async fn failed_symbol_request_degrades_to_placeholder() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_string_contains("list only the names"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stage_one_reply()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_string_contains("dream symbol \\\"lake\\\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply(
            &json!({"name": "lake", "meaning": "still depths of feeling"}).to_string(),
        )))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_string_contains("dream symbol \\\"ice\\\""))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let analyzer = GeminiAnalyzer::new(config(&server.uri())).unwrap();
    let result = analyzer
        .analyze_dream(&DreamData::new("I walked on a frozen shore."))
        .await
        .unwrap();

    // The sibling request is untouched; only the failed symbol degrades.
    assert_eq!(result.symbolism[0].meaning, "still depths of feeling");
    assert_eq!(result.symbolism[1].name, "ice");
    assert!(result.symbolism[1].meaning.contains("could not be loaded"));
}

#[tokio::test]
async fn truncated_stage_one_surfaces_shape_error() {
    let server = MockServer::start().await;
    // Hopeless truncation: repair cannot recover, the adapter substitutes an
    // empty object and normalization reports the missing summary.
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("garbage")))
        .mount(&server)
        .await;

    let analyzer = GeminiAnalyzer::new(config(&server.uri())).unwrap();
    let err = analyzer
        .analyze_dream(&DreamData::new("dream"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidShape(_)), "got {err:?}");
}

#[tokio::test]
async fn image_generation_returns_inline_data_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"text": "Here is your dream image."},
                    {"inlineData": {"mimeType": "image/png", "data": "QUJD"}},
                ]}
            }]
        })))
        .mount(&server)
        .await;

    let analyzer = GeminiAnalyzer::new(config(&server.uri())).unwrap();
    let data_url = analyzer.generate_image("a frozen lake").await.unwrap();
    assert_eq!(data_url, "data:image/png;base64,QUJD");
}

#[tokio::test]
async fn image_generation_without_image_part_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("no image, sorry")))
        .mount(&server)
        .await;

    let analyzer = GeminiAnalyzer::new(config(&server.uri())).unwrap();
    let err = analyzer.generate_image("a frozen lake").await.unwrap_err();
    assert!(matches!(err, Error::Analysis(_)), "got {err:?}");
}
