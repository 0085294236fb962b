//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::Bytes,
    http::{header::CONTENT_TYPE, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Redirect},
    routing::{any, get},
    Json, Router,
};
use cors_gateway::config::ProxyConfig;
use cors_gateway::{HttpServer, Shutdown};
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;

/// Start a mock upstream on an ephemeral port.
///
/// Routes:
/// - `/echo`     any method; echoes method, query, headers and body as JSON
/// - `/json`     `{"a":1}` as application/json
/// - `/missing`  404 with a text body
/// - `/redirect` 307 to `/json`
/// - `/slow`     answers after 3 seconds
pub async fn start_mock_upstream() -> SocketAddr {
    let app = Router::new()
        .route("/echo", any(echo))
        .route(
            "/json",
            get(|| async { ([(CONTENT_TYPE, "application/json")], r#"{"a":1}"#) }),
        )
        .route("/missing", get(|| async { (StatusCode::NOT_FOUND, "no such resource") }))
        .route("/redirect", get(|| async { Redirect::temporary("/json") }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                "late"
            }),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> impl IntoResponse {
    let headers: Map<String, Value> = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                Value::String(value.to_str().unwrap_or_default().to_string()),
            )
        })
        .collect();

    Json(json!({
        "method": method.as_str(),
        "query": uri.query(),
        "headers": headers,
        "body": String::from_utf8_lossy(&body),
    }))
}

/// Gateway config that only admits the loopback mock upstream.
pub fn local_config() -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.forwarder.allowed_hosts = vec!["127.0.0.1".to_string()];
    config
}

/// Start the gateway on an ephemeral port.
pub async fn start_gateway(config: ProxyConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(config).unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// `http://<gateway>/proxy/<percent-encoded target>`
pub fn proxy_url(gateway: SocketAddr, target: &str) -> String {
    format!("http://{}/proxy/{}", gateway, urlencoding::encode(target))
}

/// Client that talks to the gateway directly and never follows redirects itself.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
