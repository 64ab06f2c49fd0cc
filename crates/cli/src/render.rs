// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal rendering of resolved dispatch results.

use std::io::Write;

use serde::Serialize;

use crate::config::OutputFormat;
use crate::dispatch::Response;

/// One rendered row of JSON output.
#[derive(Debug, Serialize)]
struct Row<'a> {
    host: &'a str,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
}

impl<'a> From<&'a Response> for Row<'a> {
    fn from(resp: &'a Response) -> Self {
        // Embed JSON bodies as structured values, anything else as text.
        let data = resp.data.as_ref().map(|raw| {
            serde_json::from_slice(raw).unwrap_or_else(|_| {
                serde_json::Value::String(String::from_utf8_lossy(raw).into_owned())
            })
        });
        Self {
            host: resp.host.as_str(),
            ok: resp.is_ok(),
            kind: resp.err.as_ref().map(|e| e.kind().as_str()),
            error: resp.err.as_ref().map(ToString::to_string),
            data,
        }
    }
}

/// Write `responses` sorted by host and return the process exit code:
/// `0` if every endpoint succeeded, `1` otherwise.
pub fn render(
    out: &mut impl Write,
    mut responses: Vec<Response>,
    format: OutputFormat,
) -> anyhow::Result<i32> {
    responses.sort_by(|a, b| a.host.cmp(&b.host));

    match format {
        OutputFormat::Json => {
            let rows: Vec<Row<'_>> = responses.iter().map(Row::from).collect();
            serde_json::to_writer_pretty(&mut *out, &rows)?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            for resp in &responses {
                match (&resp.err, &resp.data) {
                    (Some(err), _) => writeln!(out, "{}  error ({}): {err}", resp.host, err.kind())?,
                    (None, Some(data)) => {
                        writeln!(out, "== {}", resp.host)?;
                        out.write_all(data)?;
                        if !data.ends_with(b"\n") {
                            writeln!(out)?;
                        }
                    }
                    (None, None) => writeln!(out, "{}  ok", resp.host)?,
                }
            }
        }
    }

    Ok(if responses.iter().all(Response::is_ok) { 0 } else { 1 })
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod tests;
