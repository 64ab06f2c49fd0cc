// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mock proxy daemon for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Request, State};
use axum::Router;

/// One request as the daemon saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Clone)]
struct DaemonState {
    reply: Arc<str>,
    delay: Duration,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

/// A running mock daemon that answers every request with a fixed body.
pub struct MockDaemon {
    pub url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockDaemon {
    /// Spawn a daemon replying `reply` to every request.
    pub async fn spawn(reply: &str) -> anyhow::Result<Self> {
        Self::spawn_delayed(reply, Duration::ZERO).await
    }

    /// Spawn a daemon that waits `delay` before replying.
    pub async fn spawn_delayed(reply: &str, delay: Duration) -> anyhow::Result<Self> {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = DaemonState { reply: Arc::from(reply), delay, requests: Arc::clone(&requests) };
        let app = Router::new().fallback(handle).with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });
        Ok(Self { url: format!("http://{addr}"), requests })
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

async fn handle(State(state): State<DaemonState>, req: Request) -> String {
    let (parts, body) = req.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();
    if let Ok(mut requests) = state.requests.lock() {
        requests.push(Recorded {
            method: parts.method.to_string(),
            path: parts.uri.path().to_owned(),
            query: parts.uri.query().map(str::to_owned),
            body: body.to_vec(),
        });
    }
    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }
    state.reply.to_string()
}

/// An address nothing listens on.
pub fn closed_port_url() -> anyhow::Result<String> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}"))
}
