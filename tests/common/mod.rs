//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use realty_auth::accounts::MemoryAccountStore;
use realty_auth::auth::{AuthService, TokenIssuer};
use realty_auth::config::ServiceConfig;
use realty_auth::http::HttpServer;
use realty_auth::lifecycle::Shutdown;

/// A server running on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub store: Arc<MemoryAccountStore>,
    pub shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the full HTTP stack over an in-memory store.
pub async fn start_server() -> TestServer {
    let mut config = ServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();

    let store = Arc::new(MemoryAccountStore::default());
    let auth = AuthService::new(store.clone(), TokenIssuer::from_config(&config.auth));

    let listener = tokio::net::TcpListener::bind(&config.listener.bind_address)
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config, auth);
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;

    TestServer {
        addr,
        store,
        shutdown,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Register an account and return its session token.
#[allow(dead_code)]
pub async fn register(server: &TestServer, email: &str, password: &str) -> String {
    let res = client()
        .post(server.url("/auth/register"))
        .json(&serde_json::json!({ "name": "Test Buyer", "email": email, "password": password }))
        .send()
        .await
        .expect("server unreachable");
    assert_eq!(res.status(), 201);
    let body: serde_json::Value = res.json().await.unwrap();
    body["token"].as_str().unwrap().to_string()
}

/// POST a login and return status plus JSON body.
#[allow(dead_code)]
pub async fn login(server: &TestServer, email: &str, password: &str) -> (u16, serde_json::Value) {
    let res = client()
        .post(server.url("/auth/login"))
        .json(&serde_json::json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("server unreachable");
    let status = res.status().as_u16();
    (status, res.json().await.unwrap())
}
