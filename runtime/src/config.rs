// Copyright 2026 Billcheck Contributors
// SPDX-License-Identifier: MIT

//! Runtime configuration: built-in defaults, overridden by `BILLCHECK_*`
//! environment variables, overridden by command-line flags.

use crate::scrape::profile::LESCO_URL;
use crate::scrape::ScrapeTimings;
use anyhow::{Context, Result};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const ENV_BIND: &str = "BILLCHECK_BIND";
pub const ENV_PORT: &str = "BILLCHECK_PORT";
pub const ENV_CHROMIUM_PATH: &str = "BILLCHECK_CHROMIUM_PATH";
pub const ENV_CATALOG: &str = "BILLCHECK_CATALOG";
pub const ENV_JOURNAL: &str = "BILLCHECK_JOURNAL";
pub const ENV_CHECK_DEADLINE_MS: &str = "BILLCHECK_CHECK_DEADLINE_MS";
pub const ENV_NAV_TIMEOUT_MS: &str = "BILLCHECK_NAV_TIMEOUT_MS";
pub const ENV_SETTLE_MS: &str = "BILLCHECK_SETTLE_MS";
pub const ENV_RESULT_SETTLE_MS: &str = "BILLCHECK_RESULT_SETTLE_MS";
pub const ENV_LESCO_URL: &str = "BILLCHECK_LESCO_URL";

pub const DEFAULT_PORT: u16 = 5000;

/// Everything needed to assemble a running service.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    pub bind: IpAddr,
    pub port: u16,
    /// Explicit browser binary; discovery is used when unset.
    pub chromium_path: Option<PathBuf>,
    /// Provider catalog JSON replacing the embedded seed.
    pub catalog_path: Option<PathBuf>,
    /// JSONL check journal; no journal when unset.
    pub journal_path: Option<PathBuf>,
    /// Overall cap on a single acquisition.
    pub check_deadline: Duration,
    pub scrape: ScrapeTimings,
    pub lesco_url: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            chromium_path: None,
            catalog_path: None,
            journal_path: None,
            check_deadline: billcheck::orchestrator::DEFAULT_ACQUISITION_DEADLINE,
            scrape: ScrapeTimings::default(),
            lesco_url: LESCO_URL.to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_BIND) {
            config.bind = parse_var(ENV_BIND, &v)?;
        }
        if let Some(v) = get(ENV_PORT) {
            config.port = parse_var(ENV_PORT, &v)?;
        }
        config.chromium_path = get(ENV_CHROMIUM_PATH).map(PathBuf::from);
        config.catalog_path = get(ENV_CATALOG).map(PathBuf::from);
        config.journal_path = get(ENV_JOURNAL).map(PathBuf::from);
        if let Some(v) = get(ENV_CHECK_DEADLINE_MS) {
            config.check_deadline = millis(ENV_CHECK_DEADLINE_MS, &v)?;
        }
        if let Some(v) = get(ENV_NAV_TIMEOUT_MS) {
            config.scrape.navigation_timeout = millis(ENV_NAV_TIMEOUT_MS, &v)?;
        }
        if let Some(v) = get(ENV_SETTLE_MS) {
            config.scrape.settle = millis(ENV_SETTLE_MS, &v)?;
        }
        if let Some(v) = get(ENV_RESULT_SETTLE_MS) {
            config.scrape.result_settle = millis(ENV_RESULT_SETTLE_MS, &v)?;
        }
        if let Some(v) = get(ENV_LESCO_URL) {
            url::Url::parse(&v).with_context(|| format!("invalid {ENV_LESCO_URL}: {v}"))?;
            config.lesco_url = v;
        }

        Ok(config)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("invalid {key}: {value}"))
}

fn millis(key: &str, value: &str) -> Result<Duration> {
    parse_var::<u64>(key, value).map(Duration::from_millis)
}
