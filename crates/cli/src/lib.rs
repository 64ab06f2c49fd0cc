// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ambctl: broadcast proxy operations to a fleet of ambassador daemons.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod operation;
pub mod registry;
pub mod render;
#[cfg(test)]
pub mod test_support;

use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::registry::Registry;

/// Run one operation against the configured fleet and render the results to
/// stdout. Returns the process exit code.
pub async fn run(config: Config) -> anyhow::Result<i32> {
    let format = config.output_format()?;
    let op = config.operation()?;
    let registry = config.registry().install_global()?;
    if registry.is_empty() {
        tracing::warn!("no endpoints configured");
    }

    let dispatcher = Dispatcher::new(Registry::clone(registry)).with_timeout(config.timeout());
    let responses = dispatcher.dispatch(op).collect_all().await;
    tracing::info!(
        endpoints = registry.len(),
        failed = responses.iter().filter(|r| !r.is_ok()).count(),
        "dispatch finished"
    );

    let mut stdout = std::io::stdout().lock();
    render::render(&mut stdout, responses, format)
}
