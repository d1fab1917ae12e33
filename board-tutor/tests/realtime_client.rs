//! Ephemeral session client against a mocked backend.

use board_tutor::{AiError, EphemeralSessionClient, Voice};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn mint_posts_key_and_voice() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/realtime/session"))
        .and(body_json(json!({ "apiKey": "sk-test", "voice": "verse" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "sess_123",
            "object": "realtime.session",
            "model": "gpt-4o-realtime-preview-2025-06-03",
            "voice": "verse",
            "client_secret": { "value": "ek_abc", "expires_at": 1_700_000_060 }
        })))
        .expect(1)
        .mount(&backend)
        .await;

    let client = EphemeralSessionClient::new(&backend.uri()).expect("client");
    let session = client.mint("sk-test", Voice::Verse).await.expect("mint");

    assert_eq!(session.id.as_deref(), Some("sess_123"));
    assert_eq!(session.voice.as_deref(), Some("verse"));
    assert_eq!(session.client_secret.value, "ek_abc");
    assert_eq!(session.client_secret.expires_at, Some(1_700_000_060));
}

#[tokio::test]
async fn backend_failure_keeps_details() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/realtime/session"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": "Failed to generate ephemeral key",
            "details": "upstream said no"
        })))
        .mount(&backend)
        .await;

    let client = EphemeralSessionClient::new(&backend.uri()).expect("client");
    match client.mint("sk-test", Voice::Alloy).await.unwrap_err() {
        AiError::Upstream {
            status,
            message,
            details,
        } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Failed to generate ephemeral key");
            assert_eq!(details.as_deref(), Some("upstream said no"));
        }
        other => panic!("expected Upstream, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_key_is_a_bad_request() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "error": "OpenAI API key is required" })),
        )
        .mount(&backend)
        .await;

    let client = EphemeralSessionClient::new(&backend.uri()).expect("client");
    let err = client.mint("", Voice::Alloy).await.unwrap_err();
    assert!(matches!(
        err,
        AiError::Upstream { status: 400, ref message, .. } if message == "OpenAI API key is required"
    ));
}

#[tokio::test]
async fn rejected_key_maps_to_auth() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
        .mount(&backend)
        .await;

    let client = EphemeralSessionClient::new(&backend.uri()).expect("client");
    assert!(matches!(
        client.mint("sk-bad", Voice::Alloy).await,
        Err(AiError::Auth(m)) if m == "invalid key"
    ));
}

#[tokio::test]
async fn garbage_body_is_invalid_response() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&backend)
        .await;

    let client = EphemeralSessionClient::new(&backend.uri()).expect("client");
    assert!(matches!(
        client.mint("sk-test", Voice::Alloy).await,
        Err(AiError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn unreachable_backend_is_connection_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let client = EphemeralSessionClient::new(&format!("http://127.0.0.1:{port}")).expect("client");

    assert!(matches!(
        client.mint("sk-test", Voice::Alloy).await,
        Err(AiError::Connection(_))
    ));
}
