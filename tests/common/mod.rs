#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use bellbot_api::config::AppConfig;
use bellbot_api::database::MemoryUserStore;
use bellbot_api::server::{self, AppState};
use reqwest::StatusCode;
use tokio::task::JoinHandle;

pub const TEST_SECRET: &str = "integration-secret";

/// API server running inside the test's runtime, backed by the in-memory store.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub state: AppState,
    handle: JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.security.jwt_secret = Some(TEST_SECRET.to_string());
    config.security.password_memory_kib = 4096;
    config.security.password_iterations = 1;
    config.security.password_parallelism = 1;
    config
}

pub async fn spawn_server() -> Result<TestServer> {
    // Pick an unused port for isolation
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);

    let state = AppState::new(test_config(), Arc::new(MemoryUserStore::new()))?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    let app = server::app(state.clone());

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("test server stopped: {e}");
        }
    });

    let server = TestServer {
        port,
        base_url,
        state,
        handle,
    };
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Client that reports redirects instead of following them.
pub fn no_redirect_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()?)
}

/// Register a user and return `(user_id, token)`.
pub async fn register_user(server: &TestServer, name: &str, email: &str, password: &str) -> Result<(String, String)> {
    let res = reqwest::Client::new()
        .post(server.url("/api/auth/register"))
        .json(&serde_json::json!({ "name": name, "email": email, "password": password }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());

    let body: serde_json::Value = res.json().await?;
    let user_id = body["user"]["id"].as_str().context("missing user id")?.to_string();
    let token = body["token"].as_str().context("missing token")?.to_string();
    Ok((user_id, token))
}
