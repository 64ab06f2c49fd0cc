// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::operation::Operation;
use crate::registry::Registry;

/// Result rendering format.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Json => f.write_str("json"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => anyhow::bail!("invalid output format: {other}"),
        }
    }
}

/// Control client for a fleet of ambassador proxy daemons.
#[derive(Debug, Parser)]
#[command(name = "ambctl", version, about)]
pub struct Config {
    /// Daemon API endpoint (repeatable or comma-separated).
    #[arg(short, long = "endpoint", env = "AMBCTL_ENDPOINTS", value_delimiter = ',')]
    pub endpoints: Vec<String>,

    /// Per-daemon request deadline in milliseconds.
    #[arg(long, env = "AMBCTL_TIMEOUT_MS", default_value_t = 3000)]
    pub timeout_ms: u64,

    /// Log filter directive (e.g. `debug`, `ambctl=trace`).
    #[arg(long, env = "AMBCTL_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format (text or json).
    #[arg(long, env = "AMBCTL_LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    /// Result format (text or json).
    #[arg(long, env = "AMBCTL_OUTPUT", default_value = "text")]
    pub output: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Apply a proxy specification on every daemon.
    Apply {
        /// Proxy spec as inline JSON, or `@path` to a JSON file.
        spec: String,
    },
    /// Cancel a proxy on every daemon.
    Cancel {
        /// Proxy identifier.
        id: String,
    },
    /// Point every daemon at a proxy configuration key.
    Config(ConfigArgs),
    /// Fetch daemon info.
    Info,
    /// List active proxies.
    List,
}

#[derive(Debug, clap::Args)]
pub struct ConfigArgs {
    /// Configuration key holding the proxy specs.
    #[arg(long)]
    pub key: String,
    /// Discovery backend URI.
    #[arg(long)]
    pub discovery: String,
    /// Cluster to apply for discovery.
    #[arg(long, default_value = "debug")]
    pub cluster: String,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.timeout_ms == 0 {
            anyhow::bail!("--timeout-ms must be greater than zero");
        }
        match self.log_format.as_str() {
            "text" | "json" => {}
            other => anyhow::bail!("invalid log format: {other} (expected text or json)"),
        }
        self.output_format()?;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn output_format(&self) -> anyhow::Result<OutputFormat> {
        self.output.parse()
    }

    pub fn registry(&self) -> Registry {
        Registry::new(&self.endpoints)
    }

    /// Resolve the subcommand into the operation to broadcast.
    pub fn operation(&self) -> anyhow::Result<Operation> {
        Ok(match &self.command {
            Command::Apply { spec } => Operation::Apply(load_spec(spec)?),
            Command::Cancel { id } => Operation::Cancel(id.clone()),
            Command::Config(args) => Operation::Configure {
                key: args.key.clone(),
                discovery: args.discovery.clone(),
                cluster: args.cluster.clone(),
            },
            Command::Info => Operation::Info,
            Command::List => Operation::ListProxies,
        })
    }
}

/// Parse a proxy spec argument: inline JSON, or `@path` to a JSON file.
pub fn load_spec(arg: &str) -> anyhow::Result<serde_json::Value> {
    let (source, text) = match arg.strip_prefix('@') {
        Some(path) => {
            let text = std::fs::read_to_string(Path::new(path))
                .map_err(|e| anyhow::anyhow!("read spec file {path}: {e}"))?;
            (path, text)
        }
        None => ("argument", arg.to_owned()),
    };
    serde_json::from_str(&text).map_err(|e| anyhow::anyhow!("invalid spec JSON in {source}: {e}"))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
