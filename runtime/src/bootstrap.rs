// Copyright 2026 Billcheck Contributors
// SPDX-License-Identifier: MIT

//! Assemble catalog, store, adapters and orchestrator from configuration.

use crate::audit::{CheckJournal, JournaledStore};
use crate::config::RuntimeConfig;
use crate::renderer::chromium::{find_chromium, ChromiumLauncher};
use crate::renderer::{BrowserLauncher, NoopLauncher};
use crate::scrape::profile;
use crate::scrape::WebScrapeAcquisitionAdapter;
use anyhow::{Context, Result};
use billcheck::{AdapterRegistry, BillCheckOrchestrator, MemoryStore, ProviderCatalog, RecordStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Upper bound on Chromium startup.
const LAUNCH_TIMEOUT: Duration = Duration::from_secs(20);

/// A fully wired service.
pub struct App {
    pub orchestrator: Arc<BillCheckOrchestrator>,
    pub launcher: Arc<dyn BrowserLauncher>,
}

impl App {
    /// Wire everything with browser discovery.
    pub fn build(config: &RuntimeConfig) -> Result<Self> {
        Self::with_launcher(config, discover_launcher(config))
    }

    /// Wire everything around a given browser launcher.
    pub fn with_launcher(config: &RuntimeConfig, launcher: Arc<dyn BrowserLauncher>) -> Result<Self> {
        let catalog = Arc::new(load_catalog(config)?);
        let store = open_store(config)?;
        let adapters = build_adapters(config, Arc::clone(&launcher));

        info!(
            providers = catalog.len(),
            adapters = ?adapters.provider_ids(),
            browser = launcher.available(),
            "billcheck services assembled"
        );

        let orchestrator = BillCheckOrchestrator::new(catalog, adapters, store)
            .with_deadline(config.check_deadline);

        Ok(Self {
            orchestrator: Arc::new(orchestrator),
            launcher,
        })
    }
}

/// Embedded seed, or the configured catalog file.
pub fn load_catalog(config: &RuntimeConfig) -> Result<ProviderCatalog> {
    match &config.catalog_path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read catalog: {}", path.display()))?;
            ProviderCatalog::from_json(&json)
                .with_context(|| format!("invalid catalog: {}", path.display()))
        }
        None => ProviderCatalog::seeded().context("embedded provider catalog is invalid"),
    }
}

/// In-memory store, journaled when a journal path is configured.
pub fn open_store(config: &RuntimeConfig) -> Result<Arc<dyn RecordStore>> {
    match &config.journal_path {
        Some(path) => {
            let journal = CheckJournal::open(path)?;
            info!(path = %path.display(), "check journal enabled");
            Ok(Arc::new(JournaledStore::new(MemoryStore::new(), journal)))
        }
        None => Ok(Arc::new(MemoryStore::new())),
    }
}

/// Chromium when a binary can be found, otherwise a launcher that always fails.
pub fn discover_launcher(config: &RuntimeConfig) -> Arc<dyn BrowserLauncher> {
    match find_chromium(config.chromium_path.as_deref()) {
        Some(path) => {
            info!(chromium = %path.display(), "browser found");
            Arc::new(ChromiumLauncher::new(Some(path), LAUNCH_TIMEOUT))
        }
        None => {
            warn!("Chromium not found; live scrapes will report an error");
            Arc::new(NoopLauncher)
        }
    }
}

/// Live adapters, keyed by provider id.
pub fn build_adapters(config: &RuntimeConfig, launcher: Arc<dyn BrowserLauncher>) -> AdapterRegistry {
    let lesco = WebScrapeAcquisitionAdapter::new(
        profile::lesco().with_url(config.lesco_url.clone()),
        launcher,
    )
    .with_timings(config.scrape);

    AdapterRegistry::new().with("lesco", Arc::new(lesco))
}
