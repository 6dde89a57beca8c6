// Copyright 2026 Billcheck Contributors
// SPDX-License-Identifier: MIT

//! Scoped browser session: one browser and one page, torn down on every exit
//! path.
//!
//! Call [`BrowserSession::release`] on the normal path. If the session is
//! dropped instead (deadline cancellation, panic unwinding) the teardown is
//! spawned onto the current Tokio runtime.

use crate::renderer::{BrowserLauncher, RenderContext, Renderer};
use anyhow::{Context, Result};
use tracing::{debug, warn};

pub struct BrowserSession {
    renderer: Option<Box<dyn Renderer>>,
    context: Option<Box<dyn RenderContext>>,
}

impl BrowserSession {
    /// Launch a browser, open a page and present `user_agent`.
    pub async fn open(launcher: &dyn BrowserLauncher, user_agent: &str) -> Result<Self> {
        let renderer = launcher.launch().await.context("failed to launch browser")?;
        let mut session = Self {
            renderer: Some(renderer),
            context: None,
        };
        if let Err(e) = session.prepare(user_agent).await {
            session.release().await;
            return Err(e);
        }
        Ok(session)
    }

    async fn prepare(&mut self, user_agent: &str) -> Result<()> {
        let Some(renderer) = self.renderer.as_ref() else {
            anyhow::bail!("browser session already released");
        };
        let context = renderer.new_context().await.context("failed to open page")?;
        let context = self.context.insert(context);
        context
            .set_user_agent(user_agent)
            .await
            .context("failed to set user agent")
    }

    /// The open page, until the session is released.
    pub fn page(&mut self) -> Option<&mut (dyn RenderContext + 'static)> {
        self.context.as_deref_mut()
    }

    /// Close the page and shut the browser down.
    pub async fn release(mut self) {
        teardown(self.context.take(), self.renderer.take()).await;
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        let context = self.context.take();
        let renderer = self.renderer.take();
        if context.is_none() && renderer.is_none() {
            return;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!("browser session dropped before release; closing in background");
                handle.spawn(teardown(context, renderer));
            }
            Err(_) => warn!("browser session dropped outside a runtime; browser left to exit"),
        }
    }
}

async fn teardown(context: Option<Box<dyn RenderContext>>, renderer: Option<Box<dyn Renderer>>) {
    if let Some(context) = context {
        if let Err(e) = context.close().await {
            debug!(error = %e, "failed to close page");
        }
    }
    if let Some(renderer) = renderer {
        if let Err(e) = renderer.shutdown().await {
            warn!(error = %e, "failed to shut down browser");
        }
    }
}
