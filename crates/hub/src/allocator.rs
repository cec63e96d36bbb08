// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Capacity-aware room assignment.
//!
//! Pure planning step of the dispatch cycle: given the desired room list and
//! one snapshot per client, decide which newly discovered rooms go to which
//! client and how many rooms the fleet cannot absorb this cycle.

use std::collections::HashSet;

/// A monitorable room, identified by a positive integer.
pub type RoomId = u64;

/// One client's view for a single probe cycle, discarded after allocation.
#[derive(Debug, Clone)]
pub struct ClientSnapshot {
    pub endpoint: String,
    /// Rooms the client can still accept before saturation.
    pub remaining: usize,
    /// Rooms the client already monitors.
    pub monitored: HashSet<RoomId>,
}

impl ClientSnapshot {
    /// Snapshot for a client that could not be probed this cycle.
    pub fn degraded(endpoint: &str) -> Self {
        Self { endpoint: endpoint.to_owned(), remaining: 0, monitored: HashSet::new() }
    }
}

/// Rooms newly assigned to a single client this cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub endpoint: String,
    pub rooms: Vec<RoomId>,
}

/// Output of one allocation pass, consumed immediately by the dispatcher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentPlan {
    /// Per-client batches in snapshot traversal order; empty batches omitted.
    pub batches: Vec<Batch>,
    /// Desired rooms that no client had capacity for this cycle.
    pub unplaced: usize,
}

/// Plan which unmonitored desired rooms each client receives.
///
/// Walks `snapshots` in the given order with a cursor into the unassigned
/// list. The cursor advances by each client's reported capacity even when
/// fewer rooms remained to hand out: those slots are spent either way, which
/// keeps the shortfall count honest when capacity is scarce. Rooms left past
/// the cursor are not retried within the cycle; the next refresh recomputes
/// the unassigned list from scratch.
pub fn allocate(desired: &[RoomId], snapshots: &[ClientSnapshot]) -> AssignmentPlan {
    let monitored: HashSet<RoomId> =
        snapshots.iter().flat_map(|s| s.monitored.iter().copied()).collect();

    let unassigned: Vec<RoomId> =
        desired.iter().copied().filter(|r| !monitored.contains(r)).collect();

    if unassigned.is_empty() {
        return AssignmentPlan::default();
    }

    let mut batches = Vec::new();
    let mut cursor = 0usize;
    for snap in snapshots {
        if cursor >= unassigned.len() {
            break;
        }
        let end = unassigned.len().min(cursor.saturating_add(snap.remaining));
        if end > cursor {
            batches.push(Batch {
                endpoint: snap.endpoint.clone(),
                rooms: unassigned[cursor..end].to_vec(),
            });
        }
        cursor = cursor.saturating_add(snap.remaining);
    }

    AssignmentPlan { batches, unplaced: unassigned.len().saturating_sub(cursor) }
}

#[cfg(test)]
#[path = "allocator_tests.rs"]
mod tests;
