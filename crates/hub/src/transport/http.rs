// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP handlers for the hub status and membership queries.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::allocator::RoomId;
use crate::state::HubState;

/// `GET /is_in/{roomid}` response. A malformed room id is reported in-band
/// via `code = -1`, not as a transport-level failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct IsInResponse {
    pub code: i32,
    pub is_in: bool,
    pub index: i64,
}

/// `GET /` — hub status snapshot.
///
/// Discovery-layer status fields are passed through verbatim; the hub's own
/// fields are written last and win any name collision.
pub async fn intro(State(s): State<Arc<HubState>>) -> impl IntoResponse {
    let snapshot = s.snapshot().await;

    let mut body = serde_json::Map::new();
    if let serde_json::Value::Object(fields) = snapshot.source_status.clone() {
        body.extend(fields);
    }
    body.insert("code".to_owned(), 0.into());
    body.insert("version".to_owned(), env!("CARGO_PKG_VERSION").into());
    body.insert("rooms".to_owned(), (snapshot.rooms.len() as u64).into());
    body.insert("max_rooms_seen".to_owned(), snapshot.max_rooms.into());
    body.insert("max_unplaced_rooms".to_owned(), snapshot.max_unplaced.into());
    body.insert("page_size".to_owned(), snapshot.page_size.into());

    Json(serde_json::Value::Object(body))
}

/// `GET /is_in/{roomid}` — membership and position in the last computed room
/// list.
pub async fn is_in(
    State(s): State<Arc<HubState>>,
    Path(roomid): Path<String>,
) -> impl IntoResponse {
    let data = match roomid.parse::<RoomId>() {
        Ok(id) => {
            let snapshot = s.snapshot().await;
            match snapshot.rooms.iter().position(|r| *r == id) {
                Some(index) => IsInResponse { code: 0, is_in: true, index: index as i64 },
                None => IsInResponse { code: 0, is_in: false, index: -1 },
            }
        }
        Err(_) => IsInResponse { code: -1, is_in: false, index: -1 },
    };
    Json(data)
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
