// Copyright 2026 Billcheck Contributors
// SPDX-License-Identifier: MIT

//! Run the HTTP service.

use crate::bootstrap::App;
use crate::cli::output::Styled;
use crate::config::RuntimeConfig;
use crate::rest::{self, AppState};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// Start the REST API and block until Ctrl-C.
pub async fn run(config: RuntimeConfig) -> Result<()> {
    let s = Styled::new();
    let app = App::build(&config)?;
    let addr = config.socket_addr();

    info!(version = env!("CARGO_PKG_VERSION"), %addr, "starting billcheck");
    eprintln!(
        "  {} Billcheck v{} listening on http://{addr}",
        s.ok_sym(),
        env!("CARGO_PKG_VERSION")
    );
    if !app.launcher.available() {
        eprintln!(
            "  {} Chromium not found: live LESCO checks will report an error. Run `billcheck doctor`.",
            s.warn_sym()
        );
    }

    let state = Arc::new(AppState {
        browser_available: app.launcher.available(),
        orchestrator: app.orchestrator,
    });
    rest::serve(addr, state).await?;

    eprintln!("  {} Billcheck stopped.", s.ok_sym());
    Ok(())
}
