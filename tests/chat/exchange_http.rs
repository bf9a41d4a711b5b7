use recallchat::config::ApiConfig;
use recallchat::error::ServiceError;
use recallchat::exchange::{ExchangeClient, ExchangeResult, FailureKind, HttpExchangeClient};
use serde_json::json;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpExchangeClient {
    client_at(server.uri())
}

fn client_at(base_url: String) -> HttpExchangeClient {
    let api = ApiConfig {
        base_url,
        timeout_secs: 1,
        connect_timeout_secs: 1,
    };
    HttpExchangeClient::new(&api)
}

/// Serves one connection with `head` and a body shorter than its declared
/// `Content-Length`, then closes.
async fn truncating_server(head: &'static str, partial_body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        read_request(&mut socket).await;
        let response = format!("{head}\r\nContent-Length: 100\r\n\r\n{partial_body}");
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
    });

    format!("http://{addr}")
}

/// Consumes the full request so closing the socket does not reset it.
async fn read_request(socket: &mut tokio::net::TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0_u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf);
        let Some(header_end) = text.find("\r\n\r\n") else {
            continue;
        };
        let content_length = text[..header_end]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())?
            })
            .unwrap_or(0);
        if buf.len() >= header_end + 4 + content_length {
            return;
        }
    }
}

#[tokio::test]
async fn chat_posts_session_and_message_and_returns_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(json!({
            "session_id": "anon-1",
            "message": "What's the weather?"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "reply": "It's sunny",
            "used_memory": false,
            "turn": 3
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server)
        .exchange("anon-1", "What's the weather?")
        .await;

    assert_eq!(
        result,
        ExchangeResult::Success {
            reply: "It's sunny".into(),
            used_memory: false,
        }
    );
}

#[tokio::test]
async fn used_memory_list_counts_as_recall() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "reply": "You prefer green tea.",
            "used_memory": [{"id": "m1", "text": "likes green tea"}]
        })))
        .mount(&server)
        .await;

    let result = client_for(&server).exchange("s", "what do I drink?").await;

    assert_eq!(
        result,
        ExchangeResult::Success {
            reply: "You prefer green tea.".into(),
            used_memory: true,
        }
    );
}

#[tokio::test]
async fn missing_used_memory_defaults_to_false() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reply": "hi" })))
        .mount(&server)
        .await;

    let result = client_for(&server).exchange("s", "hello").await;

    assert_eq!(
        result,
        ExchangeResult::Success {
            reply: "hi".into(),
            used_memory: false,
        }
    );
}

#[tokio::test]
async fn error_status_is_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let result = client_for(&server).exchange("s", "hello").await;

    assert_eq!(result, ExchangeResult::failure(FailureKind::ServerError));
}

#[tokio::test]
async fn error_status_with_cut_off_body_is_server_error() {
    let base_url = truncating_server("HTTP/1.1 503 Service Unavailable", "short").await;

    let result = client_at(base_url).exchange("s", "hi").await;

    assert_eq!(result, ExchangeResult::failure(FailureKind::ServerError));
}

#[tokio::test]
async fn success_status_with_cut_off_body_is_invalid_response() {
    let base_url = truncating_server(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json",
        r#"{"reply": "It's su"#,
    )
    .await;

    let result = client_at(base_url).exchange("s", "hi").await;

    assert_eq!(result, ExchangeResult::failure(FailureKind::InvalidResponse));
}

#[tokio::test]
async fn backend_error_field_still_settles_as_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "reply": "Sorry, I couldn't reach my memory just now.",
            "used_memory": [],
            "turn": 7,
            "error": "vector store timeout"
        })))
        .mount(&server)
        .await;

    let result = client_for(&server).exchange("s", "hello").await;

    assert_eq!(
        result,
        ExchangeResult::Success {
            reply: "Sorry, I couldn't reach my memory just now.".into(),
            used_memory: false,
        }
    );
}

#[tokio::test]
async fn reply_field_missing_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "answer": "hi" })))
        .mount(&server)
        .await;

    let result = client_for(&server).exchange("s", "hello").await;

    assert_eq!(result, ExchangeResult::failure(FailureKind::InvalidResponse));
}

#[tokio::test]
async fn non_json_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy page</html>"))
        .mount(&server)
        .await;

    let result = client_for(&server).exchange("s", "hello").await;

    assert_eq!(result, ExchangeResult::failure(FailureKind::InvalidResponse));
}

#[tokio::test]
async fn slow_service_is_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "reply": "too late" }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let result = client_for(&server).exchange("s", "hello").await;

    assert_eq!(result, ExchangeResult::failure(FailureKind::Timeout));
}

#[tokio::test]
async fn health_reads_status_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "healthy",
            "message": "Memory Chat API is running",
            "modules_loaded": true
        })))
        .mount(&server)
        .await;

    let health = client_for(&server).health().await.unwrap();

    assert!(health.is_healthy());
    assert!(health.modules_loaded);
    assert!(health.version.is_none());
}

#[tokio::test]
async fn list_memories_hits_session_path_with_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/session/acct-42/memories"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session_id": "acct-42",
            "count": 1,
            "memories": [{
                "id": "m1",
                "text": "Drinks green tea",
                "meta": {"type": "preference", "key": "drink", "confidence": 0.9}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let listing = client_for(&server)
        .list_memories("acct-42", 5)
        .await
        .unwrap();

    assert_eq!(listing.session_id, "acct-42");
    assert_eq!(listing.memories.len(), 1);
    assert_eq!(
        listing.memories[0].summary(),
        "[preference/drink] Drinks green tea"
    );
}

#[tokio::test]
async fn clear_memories_sends_delete() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/session/acct-42/memories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "cleared",
            "session_id": "acct-42"
        })))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server).clear_memories("acct-42").await.unwrap();
}

#[tokio::test]
async fn memories_error_status_surfaces_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/session/unknown/memories"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such session"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .list_memories("unknown", 10)
        .await
        .unwrap_err();

    match err {
        ServiceError::Status { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "no such session");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}
