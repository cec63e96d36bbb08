// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for the worker fleet: capacity probing and signed room pushes.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::allocator::{ClientSnapshot, RoomId};
use crate::signing::SignedBatch;

/// Status reported by a worker client: how many more rooms it can accept and
/// which rooms it already monitors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientStatus {
    pub remaining_roomids: u32,
    pub roomids_monitored: Vec<RoomId>,
}

/// Acknowledgement for a pushed batch: how long the client wants the hub to
/// wait before checking in again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushAck {
    pub delay_seconds: f64,
}

/// The configured set of worker clients. Endpoints are fixed for the process
/// lifetime; there is no dynamic registration.
pub struct Fleet {
    endpoints: Vec<String>,
    client: reqwest::Client,
}

impl Fleet {
    pub fn new(endpoints: Vec<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder().timeout(timeout).build().unwrap_or_default();
        Self { endpoints, client }
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// Query one client for its current status.
    pub async fn status(&self, endpoint: &str) -> anyhow::Result<ClientStatus> {
        let resp = self.client.get(format!("{endpoint}/api/v1/status")).send().await?;
        let status = resp.error_for_status()?.json().await?;
        Ok(status)
    }

    /// Probe every endpoint in the given traversal order, sequentially.
    ///
    /// An unreachable client degrades to a zero-capacity snapshot for this
    /// cycle rather than failing the cycle; it is retried on the next one.
    pub async fn probe(&self, order: &[String]) -> Vec<ClientSnapshot> {
        let mut snapshots = Vec::with_capacity(order.len());
        for endpoint in order {
            match self.status(endpoint).await {
                Ok(status) => snapshots.push(ClientSnapshot {
                    endpoint: endpoint.clone(),
                    remaining: status.remaining_roomids as usize,
                    monitored: status.roomids_monitored.into_iter().collect(),
                }),
                Err(e) => {
                    tracing::warn!(client = %endpoint, err = %e, "probe failed, degrading to zero capacity");
                    snapshots.push(ClientSnapshot::degraded(endpoint));
                }
            }
        }
        snapshots
    }

    /// Push a signed room batch to one client, returning its requested delay.
    pub async fn push(&self, endpoint: &str, batch: &SignedBatch) -> anyhow::Result<f64> {
        let resp =
            self.client.post(format!("{endpoint}/api/v1/rooms")).json(batch).send().await?;
        let ack: PushAck = resp.error_for_status()?.json().await?;
        Ok(ack.delay_seconds)
    }
}

/// Total rooms the fleet can hold: free slots plus rooms already monitored.
pub fn aggregate_capacity(snapshots: &[ClientSnapshot]) -> u64 {
    snapshots.iter().map(|s| (s.remaining + s.monitored.len()) as u64).sum()
}

/// Discovery page size for a given aggregate fleet capacity.
///
/// Fixed once at startup: discovery cost scales with page size, and fetching
/// more rooms than the fleet can hold wastes discovery bandwidth.
pub fn page_size_for(total_capacity: u64) -> u32 {
    if total_capacity >= 10_000 {
        200
    } else if total_capacity >= 7_000 {
        160
    } else {
        70
    }
}

#[cfg(test)]
#[path = "fleet_tests.rs"]
mod tests;
