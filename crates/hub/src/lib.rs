// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Roomhub: coordination hub that distributes discovered rooms across a
//! fleet of monitoring clients with bounded capacity.

pub mod allocator;
pub mod config;
pub mod coordinator;
pub mod dispatch;
pub mod fleet;
pub mod signing;
pub mod source;
pub mod state;
pub mod transport;


use std::collections::HashSet;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::config::HubConfig;
use crate::coordinator::spawn_coordinator;
use crate::fleet::{aggregate_capacity, page_size_for, Fleet};
use crate::signing::Signer;
use crate::source::{load_static_rooms, HttpRoomSource};
use crate::state::HubState;
use crate::transport::build_router;

/// Run the hub until shutdown.
pub async fn run(config: HubConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let shutdown = CancellationToken::new();

    // Without the key, push authenticity cannot be guaranteed: do not start.
    let signer = Arc::new(Signer::load(&config.signing_key)?);

    let fleet = Fleet::new(config.clients.clone(), config.client_timeout());

    // The discovery page size is sized to the fleet once at startup.
    let initial_order = fleet.endpoints().to_vec();
    let snapshots = fleet.probe(&initial_order).await;
    let total_capacity = aggregate_capacity(&snapshots);
    let page_size = page_size_for(total_capacity);
    tracing::info!(total_capacity, page_size, "fleet capacity probed");

    let excluded = match config.static_rooms {
        Some(ref path) => load_static_rooms(path)?,
        None => HashSet::new(),
    };
    let source = HttpRoomSource::new(
        config.discovery_url.clone(),
        page_size,
        excluded,
        config.client_timeout(),
    );

    let state = Arc::new(HubState::new(config, page_size, shutdown.clone()));
    let _coordinator = spawn_coordinator(Arc::clone(&state), source, fleet, signer);

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            shutdown.cancel();
        });
    }

    let router = build_router(Arc::clone(&state));
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("roomhub listening on {addr}");
    axum::serve(listener, router).with_graceful_shutdown(shutdown.cancelled_owned()).await?;

    Ok(())
}
