// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scatter-gather dispatcher.
//!
//! [`Dispatcher::dispatch`] spawns one task per registry endpoint. Each task
//! encodes the operation, performs the round trip under its own deadline, and
//! sends exactly one [`Response`] into a shared channel. An orchestrating task
//! joins every unit and only then drops the last sender, which closes the
//! [`ResponseStream`].

use std::pin::Pin;
use std::sync::{Arc, Once};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use bytes::Bytes;
use futures_util::stream::Stream;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::DispatchError;
use crate::operation::{Operation, SuccessRule, DONE_SENTINEL};
use crate::registry::{Endpoint, Registry};

/// Per-call deadline applied to every round trip.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

static CRYPTO_INIT: Once = Once::new();

/// Install the ring crypto provider for reqwest/rustls. Only the first call has effect.
fn ensure_crypto() {
    CRYPTO_INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Outcome of one operation against one endpoint.
#[derive(Debug)]
pub struct Response {
    pub host: Endpoint,
    /// Raw body, only for successful read operations.
    pub data: Option<Bytes>,
    /// `None` iff the call satisfied the operation's success rule.
    pub err: Option<DispatchError>,
}

impl Response {
    fn completed(host: Endpoint, result: Result<Option<Bytes>, DispatchError>) -> Self {
        match result {
            Ok(data) => Self { host, data, err: None },
            Err(err) => Self { host, data: None, err: Some(err) },
        }
    }

    pub fn is_ok(&self) -> bool {
        self.err.is_none()
    }
}

/// Completion-ordered stream of [`Response`]s for one dispatch.
///
/// Yields one item per registry endpoint, then ends. The buffer holds every
/// response of the dispatch, so dropping the stream early never blocks the
/// in-flight units; their responses are discarded.
pub struct ResponseStream {
    rx: mpsc::Receiver<Response>,
}

impl ResponseStream {
    /// Next response in completion order, or `None` once every unit has reported.
    pub async fn recv(&mut self) -> Option<Response> {
        self.rx.recv().await
    }

    /// Drain the stream to completion.
    pub async fn collect_all(mut self) -> Vec<Response> {
        let mut out = Vec::new();
        while let Some(resp) = self.recv().await {
            out.push(resp);
        }
        out
    }
}

impl Stream for ResponseStream {
    type Item = Response;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Response>> {
        self.rx.poll_recv(cx)
    }
}

/// Broadcasts operations to every endpoint of a registry.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Registry,
    client: reqwest::Client,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(registry: Registry) -> Self {
        ensure_crypto();
        // Deadlines are enforced per call in `round_trip`, not on the client.
        let client = reqwest::Client::builder().build().unwrap_or_default();
        Self { registry, client, timeout: DEFAULT_TIMEOUT }
    }

    /// Override the per-call deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Broadcast `op` to every endpoint and return the result stream.
    ///
    /// Must be called from within a Tokio runtime. The dispatch runs to
    /// completion of every unit whether or not the stream is drained.
    pub fn dispatch<S>(&self, op: Operation<S>) -> ResponseStream
    where
        S: Serialize + Send + Sync + 'static,
    {
        let (tx, rx) = mpsc::channel(self.registry.len().max(1));
        let op = Arc::new(op);
        let name = op.name();
        let count = self.registry.len();
        debug!(op = name, endpoints = count, "dispatch started");

        let mut handles = Vec::with_capacity(count);
        for endpoint in &self.registry {
            let unit = Unit {
                client: self.client.clone(),
                endpoint: endpoint.clone(),
                op: Arc::clone(&op),
                deadline: self.timeout,
            };
            let tx = tx.clone();
            let handle = tokio::spawn(async move {
                let resp = unit.run().await;
                if tx.send(resp).await.is_err() {
                    debug!(host = %unit.endpoint, "response stream dropped, discarding response");
                }
            });
            handles.push((endpoint.clone(), handle));
        }

        tokio::spawn(async move {
            for (host, handle) in handles {
                let Err(e) = handle.await else { continue };
                // The unit died before sending; report on its behalf.
                warn!(host = %host, op = name, err = %e, "dispatch unit aborted");
                let resp = Response::completed(host, Err(DispatchError::Aborted(e.to_string())));
                let _ = tx.send(resp).await;
            }
            debug!(op = name, endpoints = count, "dispatch complete");
            // Dropping the last sender closes the stream.
            drop(tx);
        });

        ResponseStream { rx }
    }
}

/// One endpoint's share of a dispatch.
struct Unit<S> {
    client: reqwest::Client,
    endpoint: Endpoint,
    op: Arc<Operation<S>>,
    deadline: Duration,
}

impl<S: Serialize> Unit<S> {
    async fn run(&self) -> Response {
        let started = Instant::now();
        let result = match tokio::time::timeout(self.deadline, self.round_trip()).await {
            Ok(result) => result,
            Err(_) => Err(DispatchError::Timeout { deadline: self.deadline }),
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => debug!(host = %self.endpoint, op = self.op.name(), elapsed_ms, "ok"),
            Err(e) => debug!(
                host = %self.endpoint,
                op = self.op.name(),
                elapsed_ms,
                kind = %e.kind(),
                err = %e,
                "failed"
            ),
        }
        Response::completed(self.endpoint.clone(), result)
    }

    async fn round_trip(&self) -> Result<Option<Bytes>, DispatchError> {
        let req = self.op.encode(&self.endpoint)?;
        let mut builder = self.client.request(req.method, req.url);
        if let Some(body) = req.body {
            builder = builder.header(reqwest::header::CONTENT_TYPE, "application/json").body(body);
        }

        let classify = |e: reqwest::Error| DispatchError::from_reqwest(e, self.deadline);
        let resp = builder.send().await.map_err(classify)?;
        let body = resp.bytes().await.map_err(classify)?;

        match self.op.success_rule() {
            SuccessRule::Body => Ok(Some(body)),
            SuccessRule::Done if body.as_ref() == DONE_SENTINEL.as_bytes() => Ok(None),
            SuccessRule::Done => {
                Err(DispatchError::Server(String::from_utf8_lossy(&body).into_owned()))
            }
        }
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
