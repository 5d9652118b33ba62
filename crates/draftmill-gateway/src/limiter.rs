// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user fixed-window request limiting.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use draftmill_core::error::DraftmillError;

/// One user's counter for the current window.
#[derive(Debug, Clone, Copy)]
struct WindowSlot {
    started: Instant,
    count: u32,
}

/// Fixed-window request limiter keyed by user id.
///
/// A user's first request opens a window; requests beyond the budget
/// inside that window are rejected; the next request after the window
/// elapses opens a fresh one. Idle counters are dropped by [`sweep`]
/// rather than on the request path.
///
/// [`sweep`]: RateLimiter::sweep
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    counters: DashMap<String, WindowSlot>,
}

impl RateLimiter {
    /// A limiter with the standard one-minute window.
    pub fn new(limit_per_minute: u32) -> Self {
        Self::with_window(limit_per_minute, Duration::from_secs(60))
    }

    /// A limiter with an explicit window length.
    pub fn with_window(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            counters: DashMap::new(),
        }
    }

    /// Counts one request against `user_id`'s window.
    ///
    /// Returns [`DraftmillError::RateLimited`] once the window's budget
    /// is spent; a rejected request does not consume budget.
    pub fn check(&self, user_id: &str) -> Result<(), DraftmillError> {
        let mut slot = self
            .counters
            .entry(user_id.to_string())
            .or_insert_with(|| WindowSlot {
                started: Instant::now(),
                count: 0,
            });

        if slot.started.elapsed() >= self.window {
            slot.started = Instant::now();
            slot.count = 0;
        }

        if slot.count >= self.limit {
            debug!(user_id, limit = self.limit, "request budget exhausted");
            return Err(DraftmillError::RateLimited {
                user_id: user_id.to_string(),
            });
        }

        slot.count += 1;
        Ok(())
    }

    /// Drops counters whose window has fully elapsed. Returns how many
    /// were removed.
    pub fn sweep(&self) -> usize {
        let before = self.counters.len();
        self.counters
            .retain(|_, slot| slot.started.elapsed() < self.window);
        before - self.counters.len()
    }

    /// Number of users with a live counter.
    pub fn tracked_users(&self) -> usize {
        self.counters.len()
    }
}

/// Spawns the periodic sweep over idle rate counters.
///
/// Ticks are non-overlapping; the task exits when `cancel` fires.
pub fn spawn_limiter_sweeper(
    limiter: Arc<RateLimiter>,
    period: Duration,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // Skip the first immediate tick.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let removed = limiter.sweep();
                    if removed > 0 {
                        debug!(removed, "dropped idle rate counters");
                    }
                }
                _ = cancel.cancelled() => {
                    info!("rate limiter sweeper shutting down");
                    break;
                }
            }
        }
    })
}
