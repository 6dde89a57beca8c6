// Copyright 2026 Billcheck Contributors
// SPDX-License-Identifier: MIT

//! Bounded readiness polling against an in-page condition.

use crate::renderer::RenderContext;
use std::time::Duration;
use tokio::time::{timeout, Instant};
use tracing::trace;

/// How long and how often to poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Hard ceiling on total wait.
    pub ceiling: Duration,
    /// First back-off interval; doubles up to `max_interval`.
    pub initial_interval: Duration,
    pub max_interval: Duration,
}

impl PollPolicy {
    pub fn with_ceiling(ceiling: Duration) -> Self {
        Self {
            ceiling,
            initial_interval: Duration::from_millis(100),
            max_interval: Duration::from_millis(800),
        }
    }
}

/// Evaluate `condition` until it returns `true` or the ceiling passes.
///
/// Script errors and probes still running at the ceiling count as "not yet".
/// Returns whether the condition held.
pub async fn wait_until(ctx: &dyn RenderContext, condition: &str, policy: PollPolicy) -> bool {
    let started = Instant::now();
    let mut interval = policy.initial_interval;
    let mut polls = 0u32;

    loop {
        polls += 1;
        let remaining = policy.ceiling.saturating_sub(started.elapsed());
        match timeout(remaining, ctx.execute_js(condition)).await {
            Ok(Ok(serde_json::Value::Bool(true))) => {
                trace!(polls, "readiness condition met");
                return true;
            }
            Ok(Ok(_)) => {}
            Ok(Err(e)) => trace!(polls, error = %e, "readiness probe failed"),
            Err(_) => trace!(polls, "readiness probe still running at ceiling"),
        }

        let elapsed = started.elapsed();
        if elapsed >= policy.ceiling {
            trace!(polls, "readiness ceiling reached");
            return false;
        }
        tokio::time::sleep(interval.min(policy.ceiling - elapsed)).await;
        interval = (interval * 2).min(policy.max_interval);
    }
}
