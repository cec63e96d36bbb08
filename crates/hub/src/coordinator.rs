// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The refresh/dispatch control loop.
//!
//! Two phases, repeated until shutdown: Refreshing pulls the desired room
//! list from the source; Distributing probes the fleet, allocates the
//! unmonitored rooms, and pushes the signed batches. Everything within one
//! cycle runs strictly sequentially; no two cycles overlap.

use std::sync::Arc;
use std::time::Duration;

use rand::seq::SliceRandom;
use tokio::time::Instant;

use crate::allocator::allocate;
use crate::dispatch::dispatch;
use crate::fleet::Fleet;
use crate::signing::Signer;
use crate::source::RoomSource;
use crate::state::{HubSnapshot, HubState};

/// Spawn the coordinator loop. Runs until the state's shutdown token fires.
pub fn spawn_coordinator<S>(
    state: Arc<HubState>,
    source: S,
    fleet: Fleet,
    signer: Arc<Signer>,
) -> tokio::task::JoinHandle<()>
where
    S: RoomSource + 'static,
{
    tokio::spawn(run_loop(state, source, fleet, signer))
}

async fn run_loop<S: RoomSource>(
    state: Arc<HubState>,
    mut source: S,
    fleet: Fleet,
    signer: Arc<Signer>,
) {
    let floor = state.config.refresh_floor();
    tracing::info!(clients = fleet.endpoints().len(), "coordinator started");

    // The wake time scheduled at the end of the previous cycle. The next
    // refresh never starts earlier than `floor` after it, bounding discovery
    // frequency even when every client reports zero delay.
    let mut wake_at = Instant::now();

    loop {
        // Refreshing: replace the desired set wholesale.
        let refreshed = tokio::select! {
            _ = state.shutdown.cancelled() => break,
            result = source.refresh() => result,
        };
        let rooms = match refreshed {
            Ok(rooms) => rooms,
            Err(e) => {
                // Keep distributing the previous desired set; discovery is
                // retried on the next cycle.
                tracing::warn!(err = %e, "room refresh failed, reusing previous set");
                state.snapshot().await.rooms.clone()
            }
        };

        {
            let prev = state.snapshot().await;
            state
                .publish(HubSnapshot {
                    max_rooms: prev.max_rooms.max(rooms.len() as i64),
                    rooms: rooms.clone(),
                    source_status: source.status(),
                    ..(*prev).clone()
                })
                .await;
        }
        tracing::debug!(rooms = rooms.len(), "desired room set refreshed");

        // Distributing: probe in a freshly shuffled order so no client is
        // systematically favored when capacity is scarce.
        let mut order = fleet.endpoints().to_vec();
        {
            let mut rng = rand::rng();
            order.shuffle(&mut rng);
        }
        let snapshots = fleet.probe(&order).await;
        let plan = allocate(&rooms, &snapshots);
        if plan.unplaced > 0 {
            tracing::warn!(unplaced = plan.unplaced, "insufficient fleet capacity this cycle");
        }

        let pacing = dispatch(&fleet, &plan, &signer).await;

        {
            let prev = state.snapshot().await;
            if plan.unplaced as u64 > prev.max_unplaced {
                state
                    .publish(HubSnapshot {
                        max_unplaced: plan.unplaced as u64,
                        ..(*prev).clone()
                    })
                    .await;
            }
        }

        // Wait for the slowest client, but never refresh more often than the
        // configured floor allows.
        let pacing = Duration::try_from_secs_f64(pacing.max(0.0)).unwrap_or_default();
        let target = (Instant::now() + pacing).max(wake_at + floor);
        tokio::select! {
            _ = state.shutdown.cancelled() => break,
            _ = tokio::time::sleep_until(target) => {}
        }
        wake_at = target;
    }

    tracing::info!("coordinator stopped");
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
