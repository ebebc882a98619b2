use firm_screener::model::chat_client::{
    build_request_body, extract_completion_text, ChatCompletionClient,
};
use screener_lib::{CompletionRequest, ScreenerConfig, ServiceError};
use serde_json::json;

fn request() -> CompletionRequest {
    CompletionRequest {
        api_key: "sk-test".to_string(),
        model: "gpt-4o-mini".to_string(),
        system_prompt: "You are an analyst".to_string(),
        user_prompt: "Rank these".to_string(),
        max_tokens: 3000,
        temperature: 0.4,
    }
}

#[test]
fn test_request_body_shape() {
    let body = build_request_body(&request());
    assert_eq!(body["model"], "gpt-4o-mini");
    assert_eq!(body["max_tokens"], 3000);
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][0]["content"], "You are an analyst");
    assert_eq!(body["messages"][1]["role"], "user");
    assert_eq!(body["messages"][1]["content"], "Rank these");
    assert!((body["temperature"].as_f64().unwrap() - 0.4).abs() < 1e-6);
    assert!(!body.to_string().contains("sk-test"));
}

#[test]
fn test_extract_completion_text() {
    let body = json!({
        "id": "chatcmpl-1",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": "[{\"name\": \"Acme\", \"score\": 80}]" } }
        ]
    });
    assert_eq!(
        extract_completion_text(&body).unwrap(),
        "[{\"name\": \"Acme\", \"score\": 80}]"
    );
}

#[test]
fn test_missing_or_blank_completion_is_error() {
    let no_choices = json!({ "choices": [] });
    let blank = json!({ "choices": [{ "message": { "content": "  " } }] });
    let null_content = json!({ "choices": [{ "message": { "content": null } }] });

    for body in [no_choices, blank, null_content] {
        assert_eq!(
            extract_completion_text(&body),
            Err(ServiceError::EmptyCompletion)
        );
    }
}

#[test]
fn test_endpoint_from_config() {
    let config = ScreenerConfig {
        api_base_url: "http://localhost:8080/v1/".to_string(),
        ..ScreenerConfig::default()
    };
    let client = ChatCompletionClient::from_config(&config).unwrap();
    assert_eq!(client.endpoint(), "http://localhost:8080/v1/chat/completions");
}
