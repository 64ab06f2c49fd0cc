// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Smoke tests for the `ambctl` binary against mock daemons.

mod support;

use std::process::Output;

use tokio::process::Command;

use support::{closed_port_url, MockDaemon};

async fn ambctl(args: &[&str]) -> anyhow::Result<Output> {
    let output = Command::new(env!("CARGO_BIN_EXE_ambctl"))
        .args(args)
        .env_remove("AMBCTL_ENDPOINTS")
        .env_remove("AMBCTL_OUTPUT")
        .output()
        .await?;
    Ok(output)
}

#[tokio::test]
async fn cancel_all_ok_exits_zero() -> anyhow::Result<()> {
    let a = MockDaemon::spawn("done").await?;
    let b = MockDaemon::spawn("done").await?;
    let endpoints = format!("{},{}", a.url, b.url);

    let out = ambctl(&["-e", &endpoints, "cancel", "redis"]).await?;
    assert_eq!(out.status.code(), Some(0));

    let stdout = String::from_utf8(out.stdout)?;
    assert!(stdout.contains(&format!("{}  ok", a.url)), "stdout: {stdout}");
    assert!(stdout.contains(&format!("{}  ok", b.url)), "stdout: {stdout}");
    assert_eq!(a.requests()[0].path, "/proxy/redis");
    Ok(())
}

#[tokio::test]
async fn partial_failure_exits_one() -> anyhow::Result<()> {
    let ok = MockDaemon::spawn("done").await?;
    let dead = closed_port_url()?;

    let out = ambctl(&["-e", &ok.url, "-e", &dead, "config", "--key", "k1", "--discovery", "d1"])
        .await?;
    assert_eq!(out.status.code(), Some(1));

    let stdout = String::from_utf8(out.stdout)?;
    assert!(stdout.contains(&format!("{dead}  error (TRANSPORT)")), "stdout: {stdout}");
    assert_eq!(ok.requests()[0].query.as_deref(), Some("key=k1&discovery=d1&cluster=debug"));
    Ok(())
}

#[tokio::test]
async fn list_json_output() -> anyhow::Result<()> {
    let daemon = MockDaemon::spawn(r#"[{"name":"redis"}]"#).await?;

    let out = ambctl(&["--output", "json", "-e", &daemon.url, "list"]).await?;
    assert_eq!(out.status.code(), Some(0));

    let rows: Vec<serde_json::Value> = serde_json::from_slice(&out.stdout)?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["host"], daemon.url.as_str());
    assert_eq!(rows[0]["data"][0]["name"], "redis");
    Ok(())
}

#[tokio::test]
async fn no_endpoints_exits_zero() -> anyhow::Result<()> {
    let out = ambctl(&["info"]).await?;
    assert_eq!(out.status.code(), Some(0));
    assert!(out.stdout.is_empty());
    Ok(())
}

#[tokio::test]
async fn invalid_config_exits_two() -> anyhow::Result<()> {
    let out = ambctl(&["--timeout-ms", "0", "info"]).await?;
    assert_eq!(out.status.code(), Some(2));

    let out = ambctl(&["apply", "{not json"]).await?;
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8(out.stderr)?.contains("invalid spec JSON"));
    Ok(())
}
