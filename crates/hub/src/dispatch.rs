// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plan execution: sign each batch and push it to its client, collecting the
//! fleet's pacing signal.

use crate::allocator::AssignmentPlan;
use crate::fleet::Fleet;
use crate::signing::Signer;

/// Push every batch in the plan and return the pacing signal in seconds.
///
/// The pacing signal is the maximum of the delays the contacted clients
/// acknowledge with: checking in before the slowest client is ready yields
/// no new information. An empty plan introduces no pacing constraint and
/// contacts no client. A failed push is logged and contributes nothing; its
/// rooms show up as unassigned again on the next cycle.
pub async fn dispatch(fleet: &Fleet, plan: &AssignmentPlan, signer: &Signer) -> f64 {
    let mut pacing = 0.0f64;
    for batch in &plan.batches {
        let signed = match signer.sign_rooms(&batch.rooms) {
            Ok(signed) => signed,
            Err(e) => {
                tracing::warn!(client = %batch.endpoint, err = %e, "failed to sign batch");
                continue;
            }
        };
        match fleet.push(&batch.endpoint, &signed).await {
            Ok(delay) => {
                tracing::debug!(
                    client = %batch.endpoint,
                    rooms = batch.rooms.len(),
                    delay,
                    "batch pushed"
                );
                pacing = pacing.max(delay);
            }
            Err(e) => {
                tracing::warn!(client = %batch.endpoint, err = %e, "push failed");
            }
        }
    }
    pacing
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
