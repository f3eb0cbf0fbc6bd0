//! End-to-end tests for the relay: real sockets, real WebSocket clients.

#![allow(clippy::panic, clippy::unwrap_used, clippy::expect_used)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tower::ServiceExt;

use chat_relay::api;
use chat_relay::app_state::AppState;
use chat_relay::config::RelayConfig;
use chat_relay::domain::ConnectionRegistry;
use chat_relay::service::RelayService;
use chat_relay::watcher::spawn_file_watcher;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const TIMEOUT: Duration = Duration::from_secs(5);

fn relay_config(index_path: &Path) -> RelayConfig {
    RelayConfig {
        listen_addr: "127.0.0.1:0".parse().expect("valid addr"),
        index_path: index_path.to_path_buf(),
        watch_path: index_path.to_path_buf(),
        ..RelayConfig::default()
    }
}

fn relay_service() -> RelayService {
    RelayService::new(Arc::new(ConnectionRegistry::new()))
}

async fn spawn_relay(service: RelayService, index_path: &Path) -> SocketAddr {
    let app = api::build_app(AppState::new(service, relay_config(index_path)));
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    addr
}

async fn connect(addr: SocketAddr, path: &str) -> Client {
    let (mut client, _) = connect_async(format!("ws://{addr}{path}"))
        .await
        .expect("ws connect");
    let welcome = next_json(&mut client).await;
    assert_eq!(
        welcome,
        json!({"type": "system", "message": "Welcome to the chat!"})
    );
    client
}

async fn next_json(client: &mut Client) -> Value {
    loop {
        let frame = tokio::time::timeout(TIMEOUT, client.next())
            .await
            .expect("timed out waiting for frame")
            .expect("stream ended")
            .expect("ws error");
        if let Message::Text(text) = frame {
            return serde_json::from_str(text.as_str()).expect("server sent invalid JSON");
        }
    }
}

async fn send_text(client: &mut Client, text: &str) {
    client.send(Message::text(text)).await.expect("ws send");
}

fn missing_page() -> PathBuf {
    PathBuf::from("definitely/not/here/index.html")
}

#[tokio::test]
async fn chat_reaches_every_client_including_sender() {
    let addr = spawn_relay(relay_service(), &missing_page()).await;
    let mut clients = Vec::new();
    for _ in 0..3 {
        clients.push(connect(addr, "/ws").await);
    }

    let Some(sender) = clients.first_mut() else {
        panic!("no clients");
    };
    send_text(sender, r#"{"username":"alice","message":"hi"}"#).await;

    for client in &mut clients {
        assert_eq!(
            next_json(client).await,
            json!({"type": "message", "username": "alice", "message": "hi"})
        );
    }
}

#[tokio::test]
async fn upgrade_is_accepted_on_any_path() {
    let addr = spawn_relay(relay_service(), &missing_page()).await;
    let mut root = connect(addr, "/").await;
    let mut other = connect(addr, "/chat/room").await;

    send_text(&mut other, r#"{"username":"bob","message":"yo"}"#).await;
    assert_eq!(next_json(&mut root).await["username"], "bob");
    assert_eq!(next_json(&mut other).await["message"], "yo");
}

#[tokio::test]
async fn malformed_payload_is_dropped_and_connection_survives() {
    let service = relay_service();
    let addr = spawn_relay(service.clone(), &missing_page()).await;
    let mut alice = connect(addr, "/ws").await;
    let mut bob = connect(addr, "/ws").await;

    send_text(&mut alice, "this is not json").await;
    send_text(&mut alice, "null").await;
    send_text(&mut alice, r#"{"username":"alice","message":"after"}"#).await;

    // The first frame either client sees is the valid one.
    for client in [&mut alice, &mut bob] {
        assert_eq!(next_json(client).await["message"], "after");
    }
    assert_eq!(service.registry().len().await, 2);
}

#[tokio::test]
async fn partial_payload_is_relayed_as_sent() {
    let addr = spawn_relay(relay_service(), &missing_page()).await;
    let mut alice = connect(addr, "/ws").await;

    send_text(&mut alice, r#"{"username":"alice"}"#).await;
    assert_eq!(
        next_json(&mut alice).await,
        json!({"type": "message", "username": "alice"})
    );

    send_text(&mut alice, r#"{"username":7,"message":"x"}"#).await;
    assert_eq!(
        next_json(&mut alice).await,
        json!({"type": "message", "username": 7, "message": "x"})
    );
}

#[tokio::test]
async fn binary_frames_are_decoded_or_dropped() {
    let service = relay_service();
    let addr = spawn_relay(service.clone(), &missing_page()).await;
    let mut alice = connect(addr, "/ws").await;
    let mut bob = connect(addr, "/ws").await;

    alice
        .send(Message::binary(br#"{"username":"a","message":"b"}"#.to_vec()))
        .await
        .expect("ws send");
    for client in [&mut alice, &mut bob] {
        assert_eq!(
            next_json(client).await,
            json!({"type": "message", "username": "a", "message": "b"})
        );
    }

    alice
        .send(Message::binary(vec![0xFF]))
        .await
        .expect("ws send");
    send_text(&mut alice, r#"{"username":"a","message":"after"}"#).await;

    // The undecodable frame produced nothing, so the next frame is "after".
    for client in [&mut alice, &mut bob] {
        assert_eq!(next_json(client).await["message"], "after");
    }
    assert_eq!(service.registry().len().await, 2);
}

#[tokio::test]
async fn client_close_gets_close_reply() {
    let addr = spawn_relay(relay_service(), &missing_page()).await;
    let mut client = connect(addr, "/ws").await;

    client.close(None).await.expect("close");

    loop {
        let frame = tokio::time::timeout(TIMEOUT, client.next())
            .await
            .expect("timed out waiting for close reply");
        match frame {
            Some(Ok(Message::Close(_))) => break,
            Some(Ok(_)) => {}
            other => panic!("expected a close frame, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn disconnect_is_announced_and_client_removed() {
    let service = relay_service();
    let addr = spawn_relay(service.clone(), &missing_page()).await;
    let mut staying = connect(addr, "/ws").await;
    let mut leaving = connect(addr, "/ws").await;
    assert_eq!(service.registry().len().await, 2);

    leaving.close(None).await.expect("close");

    assert_eq!(
        next_json(&mut staying).await,
        json!({"type": "system", "message": "A user has left the chat"})
    );
    assert_eq!(service.registry().len().await, 1);

    send_text(&mut staying, r#"{"username":"carol","message":"still here"}"#).await;
    assert_eq!(next_json(&mut staying).await["message"], "still here");
}

#[tokio::test]
async fn watched_file_change_triggers_reload() {
    let dir = tempfile::tempdir().expect("tempdir");
    let page = dir.path().join("index.html");
    tokio::fs::write(&page, "<h1>v1</h1>").await.expect("write page");

    let service = relay_service();
    let _watcher = spawn_file_watcher(&page, service.clone()).expect("watcher");
    let addr = spawn_relay(service, &page).await;
    let mut client = connect(addr, "/ws").await;

    tokio::fs::write(&page, "<h1>v2</h1>").await.expect("rewrite page");

    assert_eq!(
        next_json(&mut client).await,
        json!({"type": "reload", "message": "Page needs reload"})
    );
}

#[tokio::test]
async fn index_page_is_served_fresh() {
    let dir = tempfile::tempdir().expect("tempdir");
    let page = dir.path().join("index.html");
    tokio::fs::write(&page, "<h1>chat</h1>").await.expect("write page");
    let addr = spawn_relay(relay_service(), &page).await;

    let resp = reqwest::get(format!("http://{addr}/")).await.expect("GET /");
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let content_type = resp
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/html"));
    assert_eq!(resp.text().await.expect("body"), "<h1>chat</h1>");

    tokio::fs::write(&page, "<h1>edited</h1>").await.expect("edit page");
    let body = reqwest::get(format!("http://{addr}/"))
        .await
        .expect("GET /")
        .text()
        .await
        .expect("body");
    assert_eq!(body, "<h1>edited</h1>");
}

#[tokio::test]
async fn missing_index_page_is_500() {
    let addr = spawn_relay(relay_service(), &missing_page()).await;
    let resp = reqwest::get(format!("http://{addr}/")).await.expect("GET /");
    assert_eq!(resp.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = serde_json::from_str(&resp.text().await.expect("body")).expect("json");
    assert_eq!(body["error"]["code"], 3001);
    assert_eq!(body["error"]["message"], "Error loading index.html");
}

#[tokio::test]
async fn other_routes_return_status_text() {
    let app = api::build_app(AppState::new(relay_service(), relay_config(&missing_page())));

    for (method, uri) in [("GET", "/status"), ("POST", "/status"), ("GET", "/ws")] {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("request");
        let resp = app.clone().oneshot(request).await.expect("response");
        assert_eq!(resp.status(), StatusCode::OK, "{method} {uri}");
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("body");
        assert_eq!(&body[..], b"WebSocket server is running");
    }
}
