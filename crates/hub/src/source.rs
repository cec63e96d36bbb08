// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Room discovery collaborator.
//!
//! The hub does not discover rooms itself; it consumes a discovery service
//! that returns the set of rooms worth monitoring right now. [`RoomSource`]
//! is the seam the coordinator depends on, [`HttpRoomSource`] the production
//! adapter.

use std::collections::HashSet;
use std::future::Future;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;

use crate::allocator::RoomId;

/// Produces the current authoritative room list, replaced wholesale on every
/// refresh, plus an opaque status blob surfaced on the hub's `GET /`.
pub trait RoomSource: Send {
    fn refresh(&mut self) -> impl Future<Output = anyhow::Result<Vec<RoomId>>> + Send;
    fn status(&self) -> serde_json::Value;
}

/// HTTP-backed room source.
///
/// Fetches `GET {discovery_url}?page_size={n}` expecting a JSON object with a
/// `roomids` array; the remaining fields are kept verbatim as the discovery
/// status passthrough. Statically excluded rooms are filtered out and the
/// list is deduplicated preserving discovery order.
pub struct HttpRoomSource {
    client: reqwest::Client,
    discovery_url: String,
    page_size: u32,
    excluded: HashSet<RoomId>,
    last_status: serde_json::Value,
}

impl HttpRoomSource {
    pub fn new(
        discovery_url: String,
        page_size: u32,
        excluded: HashSet<RoomId>,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder().timeout(timeout).build().unwrap_or_default();
        Self { client, discovery_url, page_size, excluded, last_status: serde_json::Value::Null }
    }
}

impl RoomSource for HttpRoomSource {
    async fn refresh(&mut self) -> anyhow::Result<Vec<RoomId>> {
        let url = format!("{}?page_size={}", self.discovery_url, self.page_size);
        let resp = self.client.get(&url).send().await?;
        let mut body: serde_json::Value = resp.error_for_status()?.json().await?;

        let rooms: Vec<RoomId> = match body.get_mut("roomids") {
            Some(value) => serde_json::from_value(value.take())
                .context("discovery response: malformed roomids")?,
            None => anyhow::bail!("discovery response missing roomids"),
        };
        if let Some(obj) = body.as_object_mut() {
            obj.remove("roomids");
        }
        self.last_status = body;

        let mut seen = HashSet::new();
        Ok(rooms
            .into_iter()
            .filter(|room| !self.excluded.contains(room) && seen.insert(*room))
            .collect())
    }

    fn status(&self) -> serde_json::Value {
        self.last_status.clone()
    }
}

/// Load the statically excluded room ids: a JSON array of integers, read once
/// at startup.
pub fn load_static_rooms(path: &Path) -> anyhow::Result<HashSet<RoomId>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading static rooms {}", path.display()))?;
    let rooms: Vec<RoomId> = serde_json::from_str(&contents)
        .with_context(|| format!("parsing static rooms {}", path.display()))?;
    Ok(rooms.into_iter().collect())
}

#[cfg(test)]
#[path = "source_tests.rs"]
mod tests;
