// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared hub state.
//!
//! The coordinator is the single writer; the query surface reads. Updates
//! swap a whole immutable snapshot behind the lock so readers never observe a
//! half-updated room list, and the lock is only held for the pointer
//! exchange.

use std::sync::Arc;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::allocator::RoomId;
use crate::config::HubConfig;

/// Shared hub state.
pub struct HubState {
    pub config: HubConfig,
    pub shutdown: CancellationToken,
    current: RwLock<Arc<HubSnapshot>>,
}

impl HubState {
    pub fn new(config: HubConfig, page_size: u32, shutdown: CancellationToken) -> Self {
        let initial = HubSnapshot {
            rooms: Vec::new(),
            max_rooms: -1,
            max_unplaced: 0,
            page_size,
            source_status: serde_json::Value::Null,
        };
        Self { config, shutdown, current: RwLock::new(Arc::new(initial)) }
    }

    /// The latest published snapshot.
    pub async fn snapshot(&self) -> Arc<HubSnapshot> {
        Arc::clone(&*self.current.read().await)
    }

    /// Publish a new snapshot, replacing the previous one wholesale.
    pub async fn publish(&self, snapshot: HubSnapshot) {
        *self.current.write().await = Arc::new(snapshot);
    }
}

/// Immutable read model published at the end of each coordinator phase.
#[derive(Debug, Clone)]
pub struct HubSnapshot {
    /// The last computed desired room list, in discovery order.
    pub rooms: Vec<RoomId>,
    /// High-water-mark of rooms ever held; -1 until the first refresh.
    pub max_rooms: i64,
    /// High-water-mark of rooms that could not be placed due to insufficient
    /// aggregate fleet capacity. Never resets for the process lifetime.
    pub max_unplaced: u64,
    /// Discovery page size, fixed at startup.
    pub page_size: u32,
    /// Opaque status blob from the room source, passed through on `GET /`.
    pub source_status: serde_json::Value,
}
