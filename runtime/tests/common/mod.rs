//! Scriptable fake browser shared by the integration tests.

#![allow(dead_code)]

use anyhow::{bail, Result};
use async_trait::async_trait;
use billcheck_runtime::renderer::{BrowserLauncher, NavigationResult, RenderContext, Renderer};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How the fake upstream portal behaves.
#[derive(Debug, Clone)]
pub enum Portal {
    /// The browser process never starts.
    LaunchFails,
    /// The browser starts but cannot open a page.
    PageFails,
    /// Navigation errors out, as when the portal is unreachable.
    Unreachable,
    /// Navigation never completes.
    Hangs,
    /// The page loads but has no usable form.
    NoForm,
    /// The form works and submitting it shows this markup.
    Serves(String),
    /// Navigation panics.
    Panics,
}

/// Counters and captured inputs, shared between the launcher and its pages.
#[derive(Default)]
pub struct Observed {
    pub launches: AtomicUsize,
    pub shutdowns: AtomicUsize,
    pub pages_opened: AtomicUsize,
    pub pages_closed: AtomicUsize,
    pub url_reads: AtomicUsize,
    pub user_agents: Mutex<Vec<String>>,
    pub urls: Mutex<Vec<String>>,
    pub scripts: Mutex<Vec<String>>,
}

impl Observed {
    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    /// Poll until every opened page and launched browser has been torn down.
    pub async fn wait_torn_down(&self) -> bool {
        for _ in 0..100 {
            let launched = Self::count(&self.launches);
            let shut = Self::count(&self.shutdowns);
            let opened = Self::count(&self.pages_opened);
            let closed = Self::count(&self.pages_closed);
            if shut == launched && closed == opened {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }
}

pub struct FakeLauncher {
    portal: Portal,
    pub observed: Arc<Observed>,
}

impl FakeLauncher {
    pub fn new(portal: Portal) -> Arc<Self> {
        Arc::new(Self {
            portal,
            observed: Arc::new(Observed::default()),
        })
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn launch(&self) -> Result<Box<dyn Renderer>> {
        if matches!(self.portal, Portal::LaunchFails) {
            bail!("no usable sandbox");
        }
        self.observed.launches.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeRenderer {
            portal: self.portal.clone(),
            observed: Arc::clone(&self.observed),
        }))
    }

    fn available(&self) -> bool {
        !matches!(self.portal, Portal::LaunchFails)
    }
}

struct FakeRenderer {
    portal: Portal,
    observed: Arc<Observed>,
}

#[async_trait]
impl Renderer for FakeRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        if matches!(self.portal, Portal::PageFails) {
            bail!("target crashed");
        }
        self.observed.pages_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakePage {
            portal: self.portal.clone(),
            observed: Arc::clone(&self.observed),
            url: "about:blank".into(),
        }))
    }

    async fn shutdown(self: Box<Self>) -> Result<()> {
        self.observed.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn active_contexts(&self) -> usize {
        Observed::count(&self.observed.pages_opened) - Observed::count(&self.observed.pages_closed)
    }
}

struct FakePage {
    portal: Portal,
    observed: Arc<Observed>,
    url: String,
}

#[async_trait]
impl RenderContext for FakePage {
    async fn set_user_agent(&self, user_agent: &str) -> Result<()> {
        self.observed
            .user_agents
            .lock()
            .unwrap()
            .push(user_agent.to_string());
        Ok(())
    }

    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult> {
        self.observed.urls.lock().unwrap().push(url.to_string());
        match &self.portal {
            Portal::Unreachable => bail!("navigation failed: net::ERR_CONNECTION_REFUSED"),
            Portal::Hangs => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                bail!("navigation timed out after {timeout_ms}ms")
            }
            Portal::Panics => panic!("renderer crashed mid-navigation"),
            _ => {
                self.url = url.to_string();
                Ok(NavigationResult {
                    final_url: url.to_string(),
                    load_time_ms: 12,
                })
            }
        }
    }

    async fn execute_js(&self, script: &str) -> Result<serde_json::Value> {
        self.observed.scripts.lock().unwrap().push(script.to_string());
        if script.contains("const submits") {
            return Ok(match self.portal {
                Portal::NoForm => serde_json::json!({ "input": null, "submit": null }),
                _ => serde_json::json!({
                    "input": "input[name*=\"ref\"]",
                    "submit": "input[type=\"submit\"]"
                }),
            });
        }
        if script.contains("submit.click()") {
            return Ok(serde_json::json!({ "success": true }));
        }
        Ok(serde_json::Value::Bool(true))
    }

    async fn get_html(&self) -> Result<String> {
        match &self.portal {
            Portal::Serves(html) => Ok(html.clone()),
            _ => Ok("<html><body><form></form></body></html>".into()),
        }
    }

    async fn get_url(&self) -> Result<String> {
        self.observed.url_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.url.clone())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.observed.pages_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
