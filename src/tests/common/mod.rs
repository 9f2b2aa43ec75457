// src/tests/common/mod.rs
pub use axum::Router;
pub use serde_json::json;
pub use tokio::task::JoinHandle;

use std::net::SocketAddr;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use serde_json::Value;

use crate::config::settings::ClientConfig;
use crate::request::engine::RequestEngine;

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

/// Unsigned token with the given claims; only the payload segment matters.
pub fn make_token(claims: Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(json!({"alg": "HS256", "typ": "JWT"}).to_string());
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.fakesignature")
}

/// Token expiring `secs` seconds from now (negative for already expired).
pub fn token_expiring_in(subject: &str, secs: i64) -> String {
    make_token(json!({"sub": subject, "exp": Utc::now().timestamp() + secs}))
}

/// Client config pointing both services at `addr`, with fast retries.
pub fn test_config(addr: SocketAddr, max_retries: u32) -> ClientConfig {
    let base = format!("http://{}", addr);
    ClientConfig::new(&base, &base)
        .with_api_key("test-key")
        .with_max_retries(max_retries)
        .with_retry_delay(Duration::from_millis(20))
        .with_timeout(Duration::from_secs(5))
        .with_user_agent("catalogue-client-tests/1.0")
}

pub fn build_engine(config: ClientConfig) -> RequestEngine {
    RequestEngine::new(config).expect("request engine")
}
