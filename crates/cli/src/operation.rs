// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operations broadcast to the daemon fleet and their request encoders.
//!
//! Each operation maps to exactly one HTTP request per endpoint:
//!
//! | Operation     | Request                                                  |
//! |---------------|----------------------------------------------------------|
//! | `Apply`       | `POST /proxy` with the JSON-serialized spec              |
//! | `Cancel`      | `DELETE /proxy/{id}`                                     |
//! | `Configure`   | `PUT /proxy/app-config?key=..&discovery=..&cluster=..`   |
//! | `Info`        | `GET /info`                                              |
//! | `ListProxies` | `GET /proxy/list`                                        |

use reqwest::{Method, Url};
use serde::Serialize;

use crate::error::DispatchError;
use crate::registry::Endpoint;

/// Body the daemon returns when a mutating call succeeded.
pub const DONE_SENTINEL: &str = "done";

/// A command to broadcast to every endpoint.
///
/// `S` is the proxy spec payload for [`Operation::Apply`]; any serializable
/// value works, [`serde_json::Value`] by default.
#[derive(Debug, Clone)]
pub enum Operation<S = serde_json::Value> {
    Apply(S),
    Cancel(String),
    Configure { key: String, discovery: String, cluster: String },
    Info,
    ListProxies,
}

/// How a response body is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessRule {
    /// Body must equal [`DONE_SENTINEL`] exactly; anything else is the error message.
    Done,
    /// Any body is success and is returned verbatim.
    Body,
}

/// One concrete request against one endpoint.
#[derive(Debug, Clone)]
pub struct EncodedRequest {
    pub method: Method,
    pub url: Url,
    pub body: Option<Vec<u8>>,
}

impl<S> Operation<S> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Apply(_) => "apply",
            Self::Cancel(_) => "cancel",
            Self::Configure { .. } => "configure",
            Self::Info => "info",
            Self::ListProxies => "list",
        }
    }

    pub fn success_rule(&self) -> SuccessRule {
        match self {
            Self::Apply(_) | Self::Cancel(_) | Self::Configure { .. } => SuccessRule::Done,
            Self::Info | Self::ListProxies => SuccessRule::Body,
        }
    }

    /// Read operations carry the response body back as data.
    pub fn is_read(&self) -> bool {
        self.success_rule() == SuccessRule::Body
    }
}

impl<S: Serialize> Operation<S> {
    /// Encode this operation into a request against `endpoint`.
    pub fn encode(&self, endpoint: &Endpoint) -> Result<EncodedRequest, DispatchError> {
        let (method, path, body) = match self {
            Self::Apply(spec) => (Method::POST, "/proxy".to_owned(), Some(serde_json::to_vec(spec)?)),
            Self::Cancel(id) => (Method::DELETE, format!("/proxy/{id}"), None),
            // Values are interpolated as given, without percent-encoding, to
            // stay wire-compatible with the daemon's query parsing. `&` and `=`
            // pass through unchanged. `Url::parse` still normalizes what a URL
            // cannot carry: spaces become `%20`, and a `#` starts a fragment
            // that drops every later parameter.
            Self::Configure { key, discovery, cluster } => (
                Method::PUT,
                format!("/proxy/app-config?key={key}&discovery={discovery}&cluster={cluster}"),
                None,
            ),
            Self::Info => (Method::GET, "/info".to_owned(), None),
            Self::ListProxies => (Method::GET, "/proxy/list".to_owned(), None),
        };

        let raw = endpoint.url(&path);
        let url = Url::parse(&raw)
            .map_err(|e| DispatchError::Encoding(format!("invalid url {raw:?}: {e}")))?;
        Ok(EncodedRequest { method, url, body })
    }
}

#[cfg(test)]
#[path = "operation_tests.rs"]
mod tests;
