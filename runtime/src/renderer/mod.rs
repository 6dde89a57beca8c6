// Copyright 2026 Billcheck Contributors
// SPDX-License-Identifier: MIT

//! Renderer abstraction for browser-driven bill acquisition.
//!
//! Defines the `BrowserLauncher`, `Renderer` and `RenderContext` traits that
//! abstract over the browser engine (currently Chromium via chromiumoxide).
//! Each acquisition launches its own isolated browser through a launcher and
//! tears it down when done.

pub mod chromium;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result of navigating to a URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationResult {
    /// The final URL after any redirects.
    pub final_url: String,
    /// Time taken to load the page in milliseconds.
    pub load_time_ms: u64,
}

/// Starts browser processes.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// Launch a fresh, isolated browser.
    async fn launch(&self) -> Result<Box<dyn Renderer>>;
    /// Whether a browser binary was discovered at all.
    fn available(&self) -> bool;
}

/// A running browser engine that can create rendering contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Create a new browser context (tab).
    async fn new_context(&self) -> Result<Box<dyn RenderContext>>;
    /// Shut down the browser process.
    async fn shutdown(self: Box<Self>) -> Result<()>;
    /// Number of currently open contexts.
    fn active_contexts(&self) -> usize;
}

/// A single browser context (tab).
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Override the outbound User-Agent header for this context.
    async fn set_user_agent(&self, user_agent: &str) -> Result<()>;
    /// Navigate to a URL with a timeout.
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult>;
    /// Execute JavaScript in the page context and return the result.
    async fn execute_js(&self, script: &str) -> Result<serde_json::Value>;
    /// Get the full page HTML.
    async fn get_html(&self) -> Result<String>;
    /// Get the current URL.
    async fn get_url(&self) -> Result<String>;
    /// Close this context.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Launcher used when no browser binary is available.
///
/// Every launch fails, so live adapters report an error result instead of
/// scraping.
pub struct NoopLauncher;

#[async_trait]
impl BrowserLauncher for NoopLauncher {
    async fn launch(&self) -> Result<Box<dyn Renderer>> {
        Err(anyhow::anyhow!("browser not available"))
    }

    fn available(&self) -> bool {
        false
    }
}
