use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use recallchat::chat::{IgnoreReason, SendOutcome};
use recallchat::config::ApiConfig;
use recallchat::conversation::Sender;
use recallchat::exchange::{ExchangeResult, FailureKind, HttpExchangeClient};
use recallchat::identity::AuthProfile;

use crate::chat_harness::{PanickingClient, ScriptedClient, memory_orchestrator};

fn http_client(server: &MockServer) -> Arc<HttpExchangeClient> {
    Arc::new(HttpExchangeClient::new(&ApiConfig {
        base_url: server.uri(),
        timeout_secs: 2,
        connect_timeout_secs: 1,
    }))
}

async fn wait_until_composing(orchestrator: &recallchat::Orchestrator) {
    for _ in 0..200 {
        if orchestrator.snapshot().composing {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("exchange never started composing");
}

#[tokio::test]
async fn weather_question_round_trips_through_service() {
    let server = MockServer::start().await;
    let orchestrator = memory_orchestrator(http_client(&server));
    let identity = orchestrator.start_anonymous().unwrap();

    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(json!({
            "session_id": identity.id(),
            "message": "What's the weather?"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "reply": "It's sunny",
            "used_memory": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = orchestrator.send_message("What's the weather?").await;
    assert!(matches!(outcome, SendOutcome::Settled(ref result) if result.is_success()));

    let snapshot = orchestrator.snapshot();
    assert!(!snapshot.composing);
    assert_eq!(snapshot.messages.len(), 2);
    assert_eq!(snapshot.messages[0].sender, Sender::User);
    assert_eq!(snapshot.messages[0].text, "What's the weather?");
    assert_eq!(snapshot.messages[1].sender, Sender::Assistant);
    assert_eq!(snapshot.messages[1].text, "It's sunny");
    assert!(!snapshot.messages[1].used_memory);
}

#[tokio::test]
async fn service_error_settles_as_apology() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let orchestrator = memory_orchestrator(http_client(&server));
    orchestrator.start_anonymous().unwrap();

    let outcome = orchestrator.send_message("hello").await;

    assert_eq!(
        outcome,
        SendOutcome::Settled(ExchangeResult::failure(FailureKind::ServerError))
    );
    let snapshot = orchestrator.snapshot();
    assert!(!snapshot.composing);
    let last = snapshot.last().unwrap();
    assert_eq!(last.sender, Sender::Assistant);
    assert_eq!(last.text, FailureKind::ServerError.apology());
    assert!(!last.used_memory);
}

#[tokio::test]
async fn second_send_while_composing_is_rejected() {
    let client = ScriptedClient::gated("first answer");
    let orchestrator = Arc::new(memory_orchestrator(client.clone()));
    orchestrator.start_anonymous().unwrap();

    let first = tokio::spawn({
        let orchestrator = Arc::clone(&orchestrator);
        async move { orchestrator.send_message("first").await }
    });
    wait_until_composing(&orchestrator).await;

    let second = orchestrator.send_message("second").await;
    assert_eq!(second, SendOutcome::Ignored(IgnoreReason::Busy));
    assert_eq!(orchestrator.snapshot().messages.len(), 1);

    client.release();
    let first = first.await.unwrap();
    assert_eq!(
        first,
        SendOutcome::Settled(ExchangeResult::Success {
            reply: "first answer".into(),
            used_memory: false,
        })
    );

    assert_eq!(client.calls(), 1);
    let snapshot = orchestrator.snapshot();
    assert!(!snapshot.composing);
    let texts: Vec<_> = snapshot.messages.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, ["first", "first answer"]);
}

#[tokio::test]
async fn panicking_client_still_lowers_composing() {
    let orchestrator = Arc::new(memory_orchestrator(Arc::new(PanickingClient)));
    orchestrator.start_anonymous().unwrap();

    let task = tokio::spawn({
        let orchestrator = Arc::clone(&orchestrator);
        async move { orchestrator.send_message("hello").await }
    });

    assert!(task.await.unwrap_err().is_panic());
    let snapshot = orchestrator.snapshot();
    assert!(!snapshot.composing);
    assert_eq!(snapshot.messages.len(), 1);
}

#[tokio::test]
async fn cancelled_send_lowers_composing() {
    let client = ScriptedClient::gated("never delivered");
    let orchestrator = memory_orchestrator(client.clone());
    orchestrator.start_anonymous().unwrap();

    let timed_out =
        tokio::time::timeout(Duration::from_millis(50), orchestrator.send_message("hi")).await;

    assert!(timed_out.is_err());
    assert!(!orchestrator.snapshot().composing);
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn exchanges_follow_the_active_identity() {
    let client = ScriptedClient::answering("ok", true);
    let orchestrator = memory_orchestrator(client.clone());

    assert_eq!(
        orchestrator.send_message("before sign-in").await,
        SendOutcome::Ignored(IgnoreReason::NoActiveSession)
    );
    assert_eq!(client.calls(), 0);

    orchestrator
        .login(AuthProfile {
            stable_id: "acct-42".into(),
            display_name: "Ada".into(),
            ..AuthProfile::default()
        })
        .unwrap();
    orchestrator.send_message("remember I like tea").await;

    let anonymous = orchestrator.start_anonymous().unwrap();
    assert!(orchestrator.snapshot().messages.is_empty());
    orchestrator.send_message("do you know me?").await;

    assert_eq!(
        client.sessions(),
        vec!["acct-42".to_string(), anonymous.id().to_string()]
    );
}
