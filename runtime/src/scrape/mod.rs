// Copyright 2026 Billcheck Contributors
// SPDX-License-Identifier: MIT

//! Live bill acquisition by driving an upstream lookup form in a headless
//! browser.
//!
//! An attempt runs in three stages:
//!
//! 1. **Session**: launch an isolated browser, open a page, set the user
//!    agent. Failure here ends the attempt with an `error` result.
//! 2. **Live scrape**: navigate, wait for the form, fill and submit it, wait
//!    for the result, capture the markup and parse it.
//! 3. **Synthetic fallback**: any stage-2 failure produces a synthesized bill
//!    (or `notFound` for implausible bill numbers).
//!
//! The browser session is released on every path. A panic inside the
//! pipeline is caught at the adapter boundary and reported as `error`.

pub mod form;
pub mod parse;
pub mod profile;
pub mod readiness;
pub mod session;
pub mod synthetic;

use crate::renderer::BrowserLauncher;
use async_trait::async_trait;
use billcheck::{AcquisitionAdapter, AcquisitionResult, Clock, SystemClock};
use form::{FormControls, SubmitOutcome};
use futures::FutureExt;
use profile::ScrapeProfile;
use readiness::{wait_until, PollPolicy};
use session::BrowserSession;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Stage-2 failures. Each one sends the attempt to the synthetic fallback.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("browser session already released")]
    SessionClosed,
    #[error("navigation failed: {0}")]
    Navigation(String),
    #[error("form elements not found")]
    FormControlsMissing,
    #[error("form interaction failed: {0}")]
    Interaction(String),
    #[error("failed to capture result page: {0}")]
    Capture(String),
}

impl ScrapeError {
    /// Stable identifier used as the `cause` log field.
    pub fn code(&self) -> &'static str {
        match self {
            ScrapeError::SessionClosed => "session_closed",
            ScrapeError::Navigation(msg) if msg.contains("timed out") => "timeout",
            ScrapeError::Navigation(_) => "navigation",
            ScrapeError::FormControlsMissing => "form_controls_missing",
            ScrapeError::Interaction(_) => "interaction",
            ScrapeError::Capture(_) => "capture",
        }
    }
}

/// Time limits for one live scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeTimings {
    /// Cap on the initial page load.
    pub navigation_timeout: Duration,
    /// Ceiling on waiting for the form after navigation.
    pub settle: Duration,
    /// Ceiling on waiting for the result after submit.
    pub result_settle: Duration,
}

impl Default for ScrapeTimings {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_secs(10),
            settle: Duration::from_secs(2),
            result_settle: Duration::from_secs(5),
        }
    }
}

/// Acquisition adapter that scrapes a provider's public lookup form.
pub struct WebScrapeAcquisitionAdapter {
    profile: ScrapeProfile,
    launcher: Arc<dyn BrowserLauncher>,
    timings: ScrapeTimings,
    clock: Arc<dyn Clock>,
}

impl WebScrapeAcquisitionAdapter {
    pub fn new(profile: ScrapeProfile, launcher: Arc<dyn BrowserLauncher>) -> Self {
        Self {
            profile,
            launcher,
            timings: ScrapeTimings::default(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_timings(mut self, timings: ScrapeTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn profile(&self) -> &ScrapeProfile {
        &self.profile
    }

    async fn run(&self, bill_number: &str, customer_reference: Option<&str>) -> AcquisitionResult {
        let mut session =
            match BrowserSession::open(self.launcher.as_ref(), self.profile.user_agent).await {
                Ok(session) => session,
                Err(e) => {
                    warn!(adapter = self.profile.name, cause = "launch", error = %format!("{e:#}"), "browser session unavailable");
                    return self.unavailable(bill_number, customer_reference);
                }
            };

        let captured = self.scrape(&mut session, bill_number).await;
        session.release().await;

        match captured {
            Ok(html) => {
                let result = parse::extract(
                    &html,
                    &self.profile,
                    bill_number,
                    customer_reference,
                    self.clock.now(),
                );
                info!(adapter = self.profile.name, status = result.outcome().as_str(), "live scrape parsed");
                result
            }
            Err(e) => {
                warn!(adapter = self.profile.name, cause = e.code(), error = %e, "live scrape failed; using synthetic bill");
                self.fallback(bill_number, customer_reference)
            }
        }
    }

    /// Stage 2 up to the captured result markup.
    async fn scrape(
        &self,
        session: &mut BrowserSession,
        bill_number: &str,
    ) -> Result<String, ScrapeError> {
        let page = session.page().ok_or(ScrapeError::SessionClosed)?;
        let timeout_ms = self.timings.navigation_timeout.as_millis() as u64;

        let nav = page
            .navigate(&self.profile.url, timeout_ms)
            .await
            .map_err(|e| ScrapeError::Navigation(format!("{e:#}")))?;
        debug!(url = %nav.final_url, load_ms = nav.load_time_ms, "upstream form loaded");

        let form_ready = form::form_ready_script(&self.profile);
        if !wait_until(&*page, &form_ready, PollPolicy::with_ceiling(self.timings.settle)).await {
            debug!("form readiness ceiling reached; probing anyway");
        }

        let controls: FormControls = page
            .execute_js(&form::locate_controls_script(&self.profile))
            .await
            .and_then(|v| Ok(serde_json::from_value(v)?))
            .map_err(|e| ScrapeError::Interaction(format!("{e:#}")))?;
        if !controls.is_complete() {
            debug!(input = ?controls.input, submit = ?controls.submit, "form controls incomplete");
            return Err(ScrapeError::FormControlsMissing);
        }

        let submitted: SubmitOutcome = page
            .execute_js(&form::fill_and_submit_script(bill_number))
            .await
            .and_then(|v| Ok(serde_json::from_value(v)?))
            .map_err(|e| ScrapeError::Interaction(format!("{e:#}")))?;
        if !submitted.success {
            return Err(ScrapeError::FormControlsMissing);
        }

        let settled = form::result_settled_script();
        if !wait_until(&*page, settled, PollPolicy::with_ceiling(self.timings.result_settle)).await {
            debug!("result readiness ceiling reached; capturing current page");
        }

        match page.get_url().await {
            Ok(url) => debug!(url = %url, "capturing result page"),
            Err(e) => debug!(error = %e, "result page URL unavailable"),
        }
        page.get_html()
            .await
            .map_err(|e| ScrapeError::Capture(format!("{e:#}")))
    }

    fn fallback(&self, bill_number: &str, customer_reference: Option<&str>) -> AcquisitionResult {
        synthetic::synthesize(
            &self.profile,
            bill_number,
            customer_reference,
            self.clock.now(),
            &mut rand::thread_rng(),
        )
    }

    fn unavailable(&self, bill_number: &str, customer_reference: Option<&str>) -> AcquisitionResult {
        AcquisitionResult::error(
            bill_number,
            customer_reference.map(str::to_string),
            self.profile.provider_display_name,
            self.profile.unavailable_reason,
        )
    }
}

#[async_trait]
impl AcquisitionAdapter for WebScrapeAcquisitionAdapter {
    fn name(&self) -> &str {
        self.profile.name
    }

    async fn attempt(&self, bill_number: &str, customer_reference: Option<&str>) -> AcquisitionResult {
        match AssertUnwindSafe(self.run(bill_number, customer_reference))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(_) => {
                error!(adapter = self.profile.name, cause = "panic", "acquisition pipeline panicked");
                self.unavailable(bill_number, customer_reference)
            }
        }
    }
}
