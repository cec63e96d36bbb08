// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

/// Configuration for the roomhub coordinator.
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "roomhub", about = "Capacity-aware room distribution hub")]
pub struct HubConfig {
    /// Host to bind the query surface on.
    #[arg(long, default_value = "0.0.0.0", env = "ROOMHUB_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 9000, env = "ROOMHUB_PORT")]
    pub port: u16,

    /// Worker client base URL. Repeatable, or comma-delimited via env.
    #[arg(long = "client", required = true, value_delimiter = ',', env = "ROOMHUB_CLIENTS")]
    pub clients: Vec<String>,

    /// Base URL of the room discovery service.
    #[arg(long, env = "ROOMHUB_DISCOVERY_URL")]
    pub discovery_url: String,

    /// Path to the hub's PKCS#8 Ed25519 private key.
    #[arg(long, env = "ROOMHUB_SIGNING_KEY")]
    pub signing_key: std::path::PathBuf,

    /// Path to a JSON array of statically excluded room ids.
    #[arg(long, env = "ROOMHUB_STATIC_ROOMS")]
    pub static_rooms: Option<std::path::PathBuf>,

    /// Minimum seconds between discovery refreshes, regardless of pacing.
    #[arg(long, default_value_t = 3, env = "ROOMHUB_REFRESH_FLOOR_SECS")]
    pub refresh_floor_secs: u64,

    /// Per-request timeout for client probes and pushes, in milliseconds.
    /// A client that times out degrades to zero capacity for the cycle.
    #[arg(long, default_value_t = 10_000, env = "ROOMHUB_CLIENT_TIMEOUT_MS")]
    pub client_timeout_ms: u64,
}

impl HubConfig {
    pub fn refresh_floor(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.refresh_floor_secs)
    }

    pub fn client_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.client_timeout_ms)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
