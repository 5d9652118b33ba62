// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background task that deletes expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::multi::MultiLayerCache;

/// Spawns the periodic sweep over all cache layers.
///
/// Ticks are non-overlapping: the next sweep waits until the previous
/// one finished. The task exits when `cancel` fires.
pub fn spawn_sweeper(
    cache: Arc<MultiLayerCache>,
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
                    let removed = cache.purge_expired().await;
                    if removed > 0 {
                        debug!(removed, "cache sweep removed expired entries");
                    }
                }
                _ = cancel.cancelled() => {
                    info!("cache sweeper shutting down");
                    break;
                }
            }
        }
    })
}
