//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::future::BoxFuture;
use serde_json::{json, Value};
use tempfile::TempDir;

use gateway_conf::apply::{ReloadCommand, ReloadError};
use gateway_conf::store::{codec, ConfigRepository, NamePolicy};
use gateway_conf::{ConfigService, HttpServer, ServiceConfig, Shutdown};

/// Reload command that replays canned results after an optional delay.
/// Once the script runs out every reload succeeds.
pub struct ScriptedReload {
    script: Mutex<VecDeque<Result<(), String>>>,
    delay: Duration,
    pub calls: AtomicUsize,
}

impl ScriptedReload {
    pub fn new(script: Vec<Result<(), &str>>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into_iter().map(|r| r.map_err(str::to_string)).collect()),
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn ok() -> Arc<Self> {
        Self::new(Vec::new(), Duration::ZERO)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ReloadCommand for ScriptedReload {
    fn reload(&self) -> BoxFuture<'_, Result<String, ReloadError>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            let next = self.script.lock().unwrap().pop_front().unwrap_or(Ok(()));
            match next {
                Ok(()) => Ok("gateway".to_string()),
                Err(output) => Err(ReloadError::Exit {
                    status: "exit status: 1".to_string(),
                    output,
                }),
            }
        })
    }
}

/// A running service on an ephemeral port backed by a temp directory.
pub struct TestServer {
    pub addr: SocketAddr,
    pub dir: TempDir,
    pub client: reqwest::Client,
    shutdown: Shutdown,
}

impl TestServer {
    pub async fn start(command: Arc<dyn ReloadCommand>, apply_timeout: Duration) -> Self {
        let dir = TempDir::new().unwrap();
        let mut config = ServiceConfig::default();
        config.store.root = dir.path().to_path_buf();

        let repository = Arc::new(
            ConfigRepository::open(dir.path(), NamePolicy::default())
                .await
                .unwrap(),
        );
        let service = ConfigService::new(repository, command, apply_timeout);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Shutdown::new();
        let server = HttpServer::new(&config, service);
        let server_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            let _ = server.run(listener, server_shutdown).await;
        });

        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        Self {
            addr,
            dir,
            client,
            shutdown,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}/api/gateway{}", self.addr, path)
    }

    pub async fn list(&self) -> (u16, Value) {
        send(self.client.get(self.url("/conf/list"))).await
    }

    pub async fn get(&self, names: &[&str]) -> (u16, Value) {
        let query: Vec<(&str, &str)> = names.iter().map(|n| ("name", *n)).collect();
        send(self.client.get(self.url("/conf")).query(&query)).await
    }

    pub async fn create(&self, name: &str, content: &[u8]) -> (u16, Value) {
        let body = json!({ "name": name, "content": codec::encode(content) });
        send(self.client.post(self.url("/conf")).json(&body)).await
    }

    pub async fn update(&self, name: &str, current: &[u8], expected: &[u8]) -> (u16, Value) {
        let body = json!({
            "name": name,
            "currentContent": codec::encode(current),
            "expectedContent": codec::encode(expected),
        });
        send(self.client.put(self.url("/conf")).json(&body)).await
    }

    pub async fn apply(&self) -> (u16, Value) {
        send(self.client.post(self.url("/apply"))).await
    }

    pub async fn apply_status(&self) -> (u16, Value) {
        send(self.client.get(self.url("/apply/status"))).await
    }

    /// Decoded content of `name`, or `None` if the request failed.
    pub async fn content(&self, name: &str) -> Option<Vec<u8>> {
        let (_, body) = self.get(&[name]).await;
        let encoded = body["data"][name].as_str()?;
        codec::decode(encoded).ok()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn send(request: reqwest::RequestBuilder) -> (u16, Value) {
    let res = request.send().await.expect("service unreachable");
    let status = res.status().as_u16();
    let body = res.json().await.expect("response is not JSON");
    (status, body)
}
