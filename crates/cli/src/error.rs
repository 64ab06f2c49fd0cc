// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Failure of a single (endpoint, operation) round trip.
///
/// Every variant is scoped to one endpoint. The dispatcher captures it into
/// that endpoint's [`Response`](crate::dispatch::Response) and never raises it
/// past the dispatch boundary.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The operation could not be turned into a request (body or URL).
    #[error("encode request: {0}")]
    Encoding(String),

    /// Connection, DNS, or I/O failure below the HTTP layer.
    #[error("transport: {0}")]
    Transport(#[source] reqwest::Error),

    /// The per-call deadline elapsed before the round trip finished.
    #[error("timed out after {}ms", .deadline.as_millis())]
    Timeout { deadline: Duration },

    /// Well-formed response whose body failed the success rule. Displays the
    /// body text verbatim.
    #[error("{0}")]
    Server(String),

    /// The unit died before reporting (task panic or runtime shutdown).
    #[error("aborted: {0}")]
    Aborted(String),
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Encoding(_) => ErrorKind::Encoding,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Server(_) => ErrorKind::Server,
            Self::Aborted(_) => ErrorKind::Internal,
        }
    }

    /// Classify a reqwest failure, folding its own timeouts into [`Self::Timeout`].
    pub(crate) fn from_reqwest(err: reqwest::Error, deadline: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout { deadline }
        } else if err.is_builder() {
            Self::Encoding(err.to_string())
        } else {
            Self::Transport(err)
        }
    }
}

impl From<serde_json::Error> for DispatchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Encoding(err.to_string())
    }
}

/// Machine-readable error classes, used by renderers and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    Encoding,
    Transport,
    Timeout,
    Server,
    Internal,
}

impl ErrorKind {
    /// Timeouts are a subtype of transport failure.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport | Self::Timeout)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Encoding => "ENCODING",
            Self::Transport => "TRANSPORT",
            Self::Timeout => "TIMEOUT",
            Self::Server => "SERVER",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
