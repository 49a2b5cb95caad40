use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tenderlens::gateway::{
    Attribution, FailoverState, GatewayConfig, NoopUsageSink, Prompt, ProviderDescriptor,
    ProviderError, ProviderGateway, ProviderKind, ProviderRegistry,
};

fn chat_provider(name: &str, server: &MockServer) -> ProviderDescriptor {
    ProviderDescriptor {
        name: name.to_string(),
        endpoint: format!("{}/v1/chat/completions", server.uri()),
        model: "gpt-4.1-mini".to_string(),
        api_key: "sk-test".to_string(),
        kind: ProviderKind::ChatCompletions,
    }
}

fn generate_provider(name: &str, server: &MockServer) -> ProviderDescriptor {
    ProviderDescriptor {
        name: name.to_string(),
        endpoint: format!("{}/v1/models/gemini-2.5-flash:generateContent", server.uri()),
        model: "gemini-2.5-flash".to_string(),
        api_key: "g-test".to_string(),
        kind: ProviderKind::GenerateContent,
    }
}

fn chat_success(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{ "message": { "content": content } }]
    }))
}

fn generate_success(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{ "content": { "parts": [{ "text": content }] } }]
    }))
}

fn server_error() -> ResponseTemplate {
    ResponseTemplate::new(500).set_body_json(json!({
        "error": { "message": "internal", "code": "server_error" }
    }))
}

fn gateway(registry: ProviderRegistry) -> ProviderGateway<NoopUsageSink> {
    ProviderGateway::with_config(
        registry,
        Arc::new(NoopUsageSink),
        GatewayConfig {
            request_timeout: Duration::from_secs(5),
            ..GatewayConfig::default()
        },
    )
    .unwrap()
}

fn prompt() -> Prompt {
    Prompt {
        system: "You are an analyst.".to_string(),
        user: "Analyze this.".to_string(),
    }
}

#[tokio::test]
async fn chat_adapter_sends_bearer_auth_and_parses_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(chat_success("hello"))
        .mount(&server)
        .await;

    let registry = ProviderRegistry::new(vec![chat_provider("OpenAI", &server)]).unwrap();
    let gateway = gateway(registry);
    let state = FailoverState::new();

    let text = gateway
        .invoke_with_failover(&state, &prompt(), Attribution::new("test"))
        .await
        .unwrap();
    assert_eq!(text, "hello");
    assert_eq!(state.cursor(), 0);
}

#[tokio::test]
async fn generate_adapter_sends_key_query_param_and_parses_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/models/gemini-2.5-flash:generateContent"))
        .and(query_param("key", "g-test"))
        .respond_with(generate_success("bonjour"))
        .mount(&server)
        .await;

    let registry = ProviderRegistry::new(vec![generate_provider("Gemini", &server)]).unwrap();
    let gateway = gateway(registry);
    let state = FailoverState::new();

    let text = gateway
        .invoke_with_failover(&state, &prompt(), Attribution::new("test"))
        .await
        .unwrap();
    assert_eq!(text, "bonjour");
}

#[tokio::test]
async fn failover_walks_registry_in_order_until_one_succeeds() {
    let failing_a = MockServer::start().await;
    let failing_b = MockServer::start().await;
    let healthy = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(server_error())
        .mount(&failing_a)
        .await;
    Mock::given(method("POST"))
        .respond_with(server_error())
        .mount(&failing_b)
        .await;
    Mock::given(method("POST"))
        .respond_with(chat_success("finally"))
        .mount(&healthy)
        .await;

    let registry = ProviderRegistry::new(vec![
        chat_provider("First", &failing_a),
        chat_provider("Second", &failing_b),
        chat_provider("Third", &healthy),
    ])
    .unwrap();
    let gateway = gateway(registry);
    let state = FailoverState::new();

    let text = gateway
        .invoke_with_failover(&state, &prompt(), Attribution::new("test"))
        .await
        .unwrap();
    assert_eq!(text, "finally");
    assert_eq!(state.cursor(), 2);

    assert_eq!(failing_a.received_requests().await.unwrap().len(), 1);
    assert_eq!(failing_b.received_requests().await.unwrap().len(), 1);
    assert_eq!(healthy.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn exhaustion_after_exactly_one_attempt_per_provider() {
    let failing_a = MockServer::start().await;
    let failing_b = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(server_error())
        .mount(&failing_a)
        .await;
    Mock::given(method("POST"))
        .respond_with(server_error())
        .mount(&failing_b)
        .await;

    let registry = ProviderRegistry::new(vec![
        chat_provider("First", &failing_a),
        chat_provider("Second", &failing_b),
    ])
    .unwrap();
    let gateway = gateway(registry);
    let state = FailoverState::new();

    let err = gateway
        .invoke_with_failover(&state, &prompt(), Attribution::new("test"))
        .await
        .unwrap_err();
    assert_eq!(err.attempts, 2);
    assert_eq!(err.last_provider, "Second");
    assert!(matches!(err.source, ProviderError::Status { status: 500, .. }));

    assert_eq!(failing_a.received_requests().await.unwrap().len(), 1);
    assert_eq!(failing_b.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn cursor_is_sticky_across_calls() {
    let failing = MockServer::start().await;
    let healthy = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(server_error())
        .mount(&failing)
        .await;
    Mock::given(method("POST"))
        .respond_with(chat_success("ok"))
        .mount(&healthy)
        .await;

    let registry = ProviderRegistry::new(vec![
        chat_provider("Flaky", &failing),
        chat_provider("Stable", &healthy),
    ])
    .unwrap();
    let gateway = gateway(registry);
    let state = FailoverState::new();

    // First call fails over to the second provider.
    gateway
        .invoke_with_failover(&state, &prompt(), Attribution::new("test"))
        .await
        .unwrap();
    assert_eq!(state.cursor(), 1);

    // Second call starts from the post-failover provider, not provider 0.
    gateway
        .invoke_with_failover(&state, &prompt(), Attribution::new("test"))
        .await
        .unwrap();

    assert_eq!(failing.received_requests().await.unwrap().len(), 1);
    assert_eq!(healthy.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn malformed_envelope_is_a_provider_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "unexpected": true })))
        .mount(&server)
        .await;

    let registry = ProviderRegistry::new(vec![chat_provider("OpenAI", &server)]).unwrap();
    let gateway = gateway(registry);
    let state = FailoverState::new();

    let err = gateway
        .invoke_with_failover(&state, &prompt(), Attribution::new("test"))
        .await
        .unwrap_err();
    assert_eq!(err.attempts, 1);
    assert!(matches!(err.source, ProviderError::Envelope { .. }));
}

#[test]
fn registry_from_env_orders_openai_before_gemini() {
    std::env::set_var("OPENAI_API_KEY", "sk-env");
    std::env::set_var("GEMINI_API_KEY", "g-env");

    let registry = ProviderRegistry::from_env().unwrap();
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.get(0).name, "OpenAI");
    assert_eq!(registry.get(0).kind, ProviderKind::ChatCompletions);
    assert_eq!(registry.get(1).name, "Gemini");
    assert_eq!(registry.get(1).kind, ProviderKind::GenerateContent);

    std::env::remove_var("OPENAI_API_KEY");
    std::env::remove_var("GEMINI_API_KEY");
}

#[tokio::test]
async fn slow_provider_times_out_and_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(chat_success("too late").set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let registry = ProviderRegistry::new(vec![chat_provider("OpenAI", &server)]).unwrap();
    let gateway = ProviderGateway::with_config(
        registry,
        Arc::new(NoopUsageSink),
        GatewayConfig {
            request_timeout: Duration::from_millis(200),
            ..GatewayConfig::default()
        },
    )
    .unwrap();
    let state = FailoverState::new();

    let err = gateway
        .invoke_with_failover(&state, &prompt(), Attribution::new("test"))
        .await
        .unwrap_err();
    assert!(matches!(err.source, ProviderError::Timeout { .. }));
}
