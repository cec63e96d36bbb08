// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only HTTP query surface for the hub.

pub mod http;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::state::HubState;

/// Build the axum `Router` with the hub's query routes.
pub fn build_router(state: Arc<HubState>) -> Router {
    Router::new()
        .route("/", get(http::intro))
        .route("/is_in/{roomid}", get(http::is_in))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
