#![cfg(test)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use httpmock::prelude::*;
use mockall::{mock, predicate::eq};
use relay_bot::{
    base::{
        config::{Config, ConfigInner},
        types::{Res, Void},
    },
    interaction::relay::{Relay, WebhookReply},
    service::{
        chat::{ChatClient, GenericChatClient},
        dedup::DuplicateFilter,
        llm::{GenericLlmClient, LlmClient, openai::CompletionError},
    },
    transport::{
        self,
        invoke::{GatewayRequest, GatewayResponse},
    },
};
use serde_json::json;
use tower::ServiceExt;

const BOT: &str = "UBOT";

// Mocks.

mock! {
    pub Chat {}

    #[async_trait]
    impl GenericChatClient for Chat {
        fn bot_user_id(&self) -> &str;
        async fn send_message(&self, channel_id: &str, text: &str) -> Void;
    }
}

mock! {
    pub Llm {}

    #[async_trait]
    impl GenericLlmClient for Llm {
        async fn complete(&self, prompt: &str) -> Res<String>;
    }
}

fn get_mock_chat() -> MockChat {
    let mut mock = MockChat::new();
    mock.expect_bot_user_id().return_const(BOT.to_string());
    mock
}

fn relay(llm: MockLlm, chat: MockChat) -> Relay {
    Relay::new(LlmClient::new(Arc::new(llm)), ChatClient::new(Arc::new(chat)))
}

fn mention(text: &str) -> Vec<u8> {
    json!({
        "type": "event_callback",
        "event": { "type": "app_mention", "user": "U1", "channel": "C1", "text": text, "ts": "1.1" }
    })
    .to_string()
    .into_bytes()
}

fn direct_message(user: &str, text: &str) -> Vec<u8> {
    json!({
        "type": "event_callback",
        "event": { "type": "message", "user": user, "channel": "D1", "text": text, "channel_type": "im" }
    })
    .to_string()
    .into_bytes()
}

// Relay.

#[tokio::test]
async fn test_handshake_echoes_challenge() {
    let mut llm = MockLlm::new();
    llm.expect_complete().never();
    let mut chat = get_mock_chat();
    chat.expect_send_message().never();

    let reply = relay(llm, chat)
        .handle_webhook(br#"{"type":"url_verification","token":"t","challenge":"abc123"}"#)
        .await;

    assert_eq!(reply, WebhookReply::challenge("abc123".to_string()));
    assert_eq!(reply.status, StatusCode::OK);
}

#[tokio::test]
async fn test_malformed_body_is_500() {
    let mut llm = MockLlm::new();
    llm.expect_complete().never();
    let mut chat = get_mock_chat();
    chat.expect_send_message().never();

    let reply = relay(llm, chat).handle_webhook(b"{oops").await;

    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_mention_relays_stripped_prompt_to_channel() {
    let mut llm = MockLlm::new();
    llm.expect_complete().with(eq("hello")).times(1).returning(|_| Ok("Hi!".to_string()));
    let mut chat = get_mock_chat();
    chat.expect_send_message().with(eq("C1"), eq("Hi!")).times(1).returning(|_, _| Ok(()));

    let reply = relay(llm, chat).handle_webhook(&mention("<@UBOT> hello")).await;

    assert_eq!(reply, WebhookReply::ok());
}

#[tokio::test]
async fn test_direct_message_relays_text_unmodified() {
    let mut llm = MockLlm::new();
    llm.expect_complete().with(eq("hello")).times(1).returning(|_| Ok("Hello back.".to_string()));
    let mut chat = get_mock_chat();
    chat.expect_send_message().with(eq("D1"), eq("Hello back.")).times(1).returning(|_, _| Ok(()));

    let reply = relay(llm, chat).handle_webhook(&direct_message("U1", "hello")).await;

    assert_eq!(reply.status, StatusCode::OK);
}

#[tokio::test]
async fn test_bot_authored_message_never_calls_out() {
    let mut llm = MockLlm::new();
    llm.expect_complete().never();
    let mut chat = get_mock_chat();
    chat.expect_send_message().never();

    let reply = relay(llm, chat).handle_webhook(&direct_message(BOT, "I said this myself")).await;

    assert_eq!(reply.status, StatusCode::OK);
}

#[tokio::test]
async fn test_empty_prompt_is_skipped() {
    let mut llm = MockLlm::new();
    llm.expect_complete().never();
    let mut chat = get_mock_chat();
    chat.expect_send_message().never();

    let reply = relay(llm, chat).handle_webhook(&mention("<@UBOT>   ")).await;

    assert_eq!(reply.status, StatusCode::OK);
}

#[tokio::test]
async fn test_empty_reply_is_not_posted() {
    let mut llm = MockLlm::new();
    llm.expect_complete().times(1).returning(|_| Ok(String::new()));
    let mut chat = get_mock_chat();
    chat.expect_send_message().never();

    let reply = relay(llm, chat).handle_webhook(&mention("<@UBOT> again")).await;

    assert_eq!(reply.status, StatusCode::OK);
}

#[tokio::test]
async fn test_completion_failure_is_swallowed() {
    let mut llm = MockLlm::new();
    llm.expect_complete().times(1).returning(|_| {
        Err(CompletionError::Upstream {
            status: 429,
            body: "rate limited".to_string(),
        }
        .into())
    });
    let mut chat = get_mock_chat();
    chat.expect_send_message().never();

    let reply = relay(llm, chat).handle_webhook(&mention("<@UBOT> hello")).await;

    assert_eq!(reply, WebhookReply::ok());
}

#[tokio::test]
async fn test_post_failure_is_swallowed() {
    let mut llm = MockLlm::new();
    llm.expect_complete().times(1).returning(|_| Ok("Hi!".to_string()));
    let mut chat = get_mock_chat();
    chat.expect_send_message().times(1).returning(|_, _| Err(anyhow::anyhow!("channel_not_found")));

    let reply = relay(llm, chat).handle_webhook(&mention("<@UBOT> hello")).await;

    assert_eq!(reply, WebhookReply::ok());
}

// HTTP binding.

async fn call(relay: Relay, request: Request<Body>) -> (StatusCode, String) {
    let response = transport::http::router(relay).oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_http_test_route_answers_both_methods() {
    for method in ["GET", "POST"] {
        let request = Request::builder().method(method).uri("/test").body(Body::empty()).unwrap();
        let (status, body) = call(relay(MockLlm::new(), get_mock_chat()), request).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
    }
}

#[tokio::test]
async fn test_http_events_handshake() {
    let request = Request::builder()
        .method("POST")
        .uri("/events")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"type":"url_verification","challenge":"xyz"}"#))
        .unwrap();

    let (status, body) = call(relay(MockLlm::new(), get_mock_chat()), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "xyz");
}

#[tokio::test]
async fn test_http_events_malformed_is_500() {
    let request = Request::builder().method("POST").uri("/events").body(Body::from("not json")).unwrap();

    let (status, _) = call(relay(MockLlm::new(), get_mock_chat()), request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

// Invoke binding.

#[tokio::test]
async fn test_invoke_handshake_round_trip() {
    let input = json!({ "body": r#"{"type":"url_verification","challenge":"c-1"}"# }).to_string();
    let mut output = Vec::new();

    transport::invoke::run(&relay(MockLlm::new(), get_mock_chat()), input.as_bytes(), &mut output)
        .await
        .unwrap();

    let response: GatewayResponse = serde_json::from_slice(&output).unwrap();
    assert_eq!(
        response,
        GatewayResponse {
            status_code: 200,
            body: "c-1".to_string()
        }
    );
}

#[tokio::test]
async fn test_invoke_bad_envelope_is_500() {
    let request = GatewayRequest { body: "{".to_string() };

    let response = transport::invoke::handle(&relay(MockLlm::new(), get_mock_chat()), request).await;

    assert_eq!(response.status_code, 500);
}

// End to end against a stubbed completion API.

fn openai_relay(api_base: &str, chat: MockChat) -> Relay {
    let config = Config::from(ConfigInner {
        openai_api_key: "test-key".to_string(),
        openai_api_base: api_base.to_string(),
        slack_bot_token: "xoxb-test".to_string(),
        ..Default::default()
    });

    Relay::new(LlmClient::openai(&config, DuplicateFilter::new()), ChatClient::new(Arc::new(chat)))
}

#[tokio::test]
async fn test_repeated_mention_is_answered_once() {
    let server = MockServer::start_async().await;
    let completion = server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200).json_body(json!({ "choices": [{ "message": { "role": "assistant", "content": "Hi!" } }] }));
        })
        .await;

    let mut chat = get_mock_chat();
    chat.expect_send_message().with(eq("C1"), eq("Hi!")).times(1).returning(|_, _| Ok(()));

    let relay = openai_relay(&server.base_url(), chat);

    assert_eq!(relay.handle_webhook(&mention("<@UBOT> hello")).await, WebhookReply::ok());
    assert_eq!(relay.handle_webhook(&mention("<@UBOT> hello")).await, WebhookReply::ok());
    assert_eq!(completion.calls(), 1);
}

#[tokio::test]
async fn test_rate_limited_completion_posts_nothing() {
    let server = MockServer::start_async().await;
    let completion = server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(429).body("{\"error\":{\"message\":\"Rate limit reached\"}}");
        })
        .await;

    let mut chat = get_mock_chat();
    chat.expect_send_message().never();

    let reply = openai_relay(&server.base_url(), chat).handle_webhook(&direct_message("U1", "hello")).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(completion.calls(), 1);
}

#[tokio::test]
async fn test_empty_choices_posts_fallback() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200).json_body(json!({ "choices": [] }));
        })
        .await;

    let mut chat = get_mock_chat();
    chat.expect_send_message()
        .with(eq("C1"), eq(relay_bot::base::prompts::FALLBACK_REPLY))
        .times(1)
        .returning(|_, _| Ok(()));

    let reply = openai_relay(&server.base_url(), chat).handle_webhook(&mention("<@UBOT> help")).await;

    assert_eq!(reply.status, StatusCode::OK);
}
