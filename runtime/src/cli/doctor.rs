// Copyright 2026 Billcheck Contributors
// SPDX-License-Identifier: MIT

//! Environment readiness check.

use crate::bootstrap::load_catalog;
use crate::cli::output::{self, Styled};
use crate::config::RuntimeConfig;
use crate::renderer::chromium::find_chromium;
use anyhow::{Context, Result};
use serde::Serialize;
use std::time::Duration;

/// Timeout for the upstream reachability probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
struct Report {
    os: &'static str,
    arch: &'static str,
    chromium: Option<String>,
    providers: Option<usize>,
    upstream: String,
    upstream_status: Option<u16>,
    ready: bool,
}

/// Check Chromium availability, catalog validity and upstream reachability.
pub async fn run(config: RuntimeConfig) -> Result<()> {
    let chromium = find_chromium(config.chromium_path.as_deref());
    let catalog = load_catalog(&config);
    let probe = probe_upstream(&config.lesco_url, PROBE_TIMEOUT).await;

    let report = Report {
        os: std::env::consts::OS,
        arch: std::env::consts::ARCH,
        chromium: chromium.as_ref().map(|p| p.display().to_string()),
        providers: catalog.as_ref().ok().map(|c| c.len()),
        upstream: config.lesco_url.clone(),
        upstream_status: probe.as_ref().ok().copied(),
        ready: chromium.is_some() && catalog.is_ok(),
    };

    if output::is_json() {
        output::print_json(&report);
        return Ok(());
    }

    let s = Styled::new();
    println!("Billcheck Doctor");
    println!("================");
    println!();
    println!("OS:   {}", report.os);
    println!("Arch: {}", report.arch);
    println!();

    match &chromium {
        Some(path) => println!("{} Chromium found: {}", s.ok_sym(), path.display()),
        None => println!(
            "{} Chromium NOT found. Install Chrome/Chromium or set BILLCHECK_CHROMIUM_PATH.",
            s.warn_sym()
        ),
    }
    match &catalog {
        Ok(c) => println!("{} Provider catalog: {} providers", s.ok_sym(), c.len()),
        Err(e) => println!("{} Provider catalog invalid: {e:#}", s.warn_sym()),
    }
    match &probe {
        Ok(status) => println!("{} LESCO portal reachable (HTTP {status})", s.ok_sym()),
        Err(e) => println!(
            "{} LESCO portal unreachable: {e:#} (checks will use synthetic bills)",
            s.warn_sym()
        ),
    }

    println!();
    if report.ready {
        println!("Status: READY");
    } else {
        println!("Status: NOT READY");
    }
    Ok(())
}

/// GET `url` and return the HTTP status code.
pub async fn probe_upstream(url: &str, timeout: Duration) -> Result<u16> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("failed to build HTTP client")?;
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("GET {url}"))?;
    Ok(response.status().as_u16())
}
