#![allow(dead_code)]

use rossum_rs::{Client, ClientConfig, RetryConfig};
use serde_json::{json, Value};
use wiremock::MockServer;

pub const TOKEN: &str = "test-token";

/// Fast retries so backoff does not slow the suite down
pub fn retry_config() -> RetryConfig {
    RetryConfig {
        max_retries: 3,
        base_delay_ms: 10,
        backoff_factor: 1.0,
        max_jitter_ms: 0,
        max_total_wait_secs: 5,
    }
}

pub fn config(server: &MockServer) -> ClientConfig {
    ClientConfig::new(format!("{}/api/v1", server.uri())).with_retry(retry_config())
}

pub fn client(server: &MockServer) -> Client {
    Client::with_token(config(server), TOKEN).expect("client")
}

pub fn queue_json(server: &MockServer, id: u64) -> Value {
    json!({
        "id": id,
        "name": format!("Queue {}", id),
        "url": format!("{}/api/v1/queues/{}", server.uri(), id),
        "schema": format!("{}/api/v1/schemas/1", server.uri()),
        "workspace": format!("{}/api/v1/workspaces/1", server.uri())
    })
}
