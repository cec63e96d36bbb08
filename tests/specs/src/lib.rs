// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test harness for end-to-end hub smoke tests.
//!
//! Spawns the real `roomhub` binary as a subprocess against in-process fake
//! worker clients and a fake discovery service, and exercises it over HTTP.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use ring::signature::{Ed25519KeyPair, KeyPair as _};

use roomhub::fleet::{ClientStatus, PushAck};
use roomhub::signing::{verify_batch, SignedBatch};

static CRYPTO_INIT: Once = Once::new();

/// Install the ring crypto provider for reqwest/rustls.
/// Safe to call multiple times — only the first call has effect.
pub fn ensure_crypto() {
    CRYPTO_INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Resolve the path to the compiled `roomhub` binary.
pub fn hub_binary() -> PathBuf {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    // tests/specs → tests → workspace root
    let workspace = manifest.parent().and_then(|p| p.parent()).unwrap_or(manifest);
    workspace.join("target").join("debug").join("roomhub")
}

/// Find a free TCP port by binding to :0 then releasing.
pub fn free_port() -> anyhow::Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

/// An endpoint nothing listens on.
pub fn dead_endpoint() -> anyhow::Result<String> {
    Ok(format!("http://127.0.0.1:{}", free_port()?))
}

/// Write a fresh PKCS#8 Ed25519 signing key into `dir`, returning its path
/// and the corresponding public key.
pub fn generate_key(dir: &Path) -> anyhow::Result<(PathBuf, Vec<u8>)> {
    let pkcs8 = Ed25519KeyPair::generate_pkcs8(&ring::rand::SystemRandom::new())
        .map_err(|_| anyhow::anyhow!("keygen failed"))?;
    let keypair = Ed25519KeyPair::from_pkcs8(pkcs8.as_ref())
        .map_err(|_| anyhow::anyhow!("generated key did not parse"))?;
    let path = dir.join("hub_privkey.p8");
    std::fs::write(&path, pkcs8.as_ref())?;
    Ok((path, keypair.public_key().as_ref().to_vec()))
}

/// Mutable state of a fake worker client.
#[derive(Debug, Default)]
pub struct FakeClientState {
    pub remaining: u32,
    pub monitored: Vec<u64>,
    /// Every accepted batch, in arrival order.
    pub pushes: Vec<Vec<u64>>,
    /// Pushes rejected for a bad signature.
    pub rejected: usize,
}

struct FakeClientCtx {
    state: Mutex<FakeClientState>,
    public_key: Vec<u8>,
    delay_seconds: f64,
}

/// An in-process worker client: reports its capacity, verifies pushed
/// batches against the hub's public key, and absorbs accepted rooms into its
/// monitored set.
pub struct FakeClient {
    pub url: String,
    ctx: Arc<FakeClientCtx>,
}

impl FakeClient {
    pub async fn start(
        remaining: u32,
        monitored: Vec<u64>,
        delay_seconds: f64,
        public_key: Vec<u8>,
    ) -> anyhow::Result<Self> {
        let ctx = Arc::new(FakeClientCtx {
            state: Mutex::new(FakeClientState {
                remaining,
                monitored,
                ..FakeClientState::default()
            }),
            public_key,
            delay_seconds,
        });

        async fn status(State(ctx): State<Arc<FakeClientCtx>>) -> Json<ClientStatus> {
            let state = lock(&ctx.state);
            Json(ClientStatus {
                remaining_roomids: state.remaining,
                roomids_monitored: state.monitored.clone(),
            })
        }

        async fn rooms(
            State(ctx): State<Arc<FakeClientCtx>>,
            Json(batch): Json<SignedBatch>,
        ) -> Result<Json<PushAck>, axum::http::StatusCode> {
            let mut state = lock(&ctx.state);
            if verify_batch(&ctx.public_key, &batch).is_err() {
                state.rejected += 1;
                return Err(axum::http::StatusCode::UNAUTHORIZED);
            }
            state.pushes.push(batch.room_ids.clone());
            state.remaining = state.remaining.saturating_sub(batch.room_ids.len() as u32);
            state.monitored.extend(batch.room_ids);
            Ok(Json(PushAck { delay_seconds: ctx.delay_seconds }))
        }

        let router = Router::new()
            .route("/api/v1/status", get(status))
            .route("/api/v1/rooms", post(rooms))
            .with_state(Arc::clone(&ctx));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self { url: format!("http://{addr}"), ctx })
    }

    /// Snapshot of the client's current state.
    pub fn state(&self) -> FakeClientState {
        let state = lock(&self.ctx.state);
        FakeClientState {
            remaining: state.remaining,
            monitored: state.monitored.clone(),
            pushes: state.pushes.clone(),
            rejected: state.rejected,
        }
    }

    /// All rooms this client has accepted so far.
    pub fn accepted_rooms(&self) -> Vec<u64> {
        lock(&self.ctx.state).pushes.iter().flatten().copied().collect()
    }
}

struct FakeDiscoveryCtx {
    rooms: Mutex<Vec<u64>>,
    page_sizes: Mutex<Vec<String>>,
}

/// An in-process discovery service serving a settable room list.
pub struct FakeDiscovery {
    pub url: String,
    ctx: Arc<FakeDiscoveryCtx>,
}

impl FakeDiscovery {
    pub async fn start(rooms: Vec<u64>) -> anyhow::Result<Self> {
        let ctx = Arc::new(FakeDiscoveryCtx {
            rooms: Mutex::new(rooms),
            page_sizes: Mutex::new(Vec::new()),
        });

        async fn list(
            State(ctx): State<Arc<FakeDiscoveryCtx>>,
            Query(params): Query<std::collections::HashMap<String, String>>,
        ) -> Json<serde_json::Value> {
            if let Some(size) = params.get("page_size") {
                lock(&ctx.page_sizes).push(size.clone());
            }
            let rooms = lock(&ctx.rooms).clone();
            Json(serde_json::json!({"code": 0, "checker": "fake", "roomids": rooms}))
        }

        let router = Router::new().route("/rooms", get(list)).with_state(Arc::clone(&ctx));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self { url: format!("http://{addr}/rooms"), ctx })
    }

    pub fn set_rooms(&self, rooms: Vec<u64>) {
        *lock(&self.ctx.rooms) = rooms;
    }

    /// Page sizes the hub has requested so far.
    pub fn requested_page_sizes(&self) -> Vec<String> {
        lock(&self.ctx.page_sizes).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// A running `roomhub` process that is killed on drop.
pub struct HubProcess {
    child: Child,
    port: u16,
}

impl HubProcess {
    /// Spawn the hub binary against the given clients and discovery service.
    pub fn start(
        clients: &[&str],
        discovery_url: &str,
        signing_key: &Path,
        static_rooms: Option<&Path>,
    ) -> anyhow::Result<Self> {
        ensure_crypto();
        let binary = hub_binary();
        anyhow::ensure!(binary.exists(), "roomhub binary not found at {}", binary.display());

        let port = free_port()?;
        let mut args: Vec<String> = vec![
            "--host".into(),
            "127.0.0.1".into(),
            "--port".into(),
            port.to_string(),
            "--discovery-url".into(),
            discovery_url.into(),
            "--signing-key".into(),
            signing_key.to_string_lossy().into_owned(),
            "--refresh-floor-secs".into(),
            "1".into(),
            "--client-timeout-ms".into(),
            "2000".into(),
        ];
        for client in clients {
            args.extend(["--client".into(), (*client).into()]);
        }
        if let Some(path) = static_rooms {
            args.extend(["--static-rooms".into(), path.to_string_lossy().into_owned()]);
        }

        let child = Command::new(&binary)
            .args(&args)
            .env("RUST_LOG", "warn")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        Ok(Self { child, port })
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Poll `GET /` until the hub responds.
    pub async fn wait_healthy(&self, timeout: Duration) -> anyhow::Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        let client = reqwest::Client::new();
        let url = self.base_url();
        loop {
            if tokio::time::Instant::now() > deadline {
                anyhow::bail!("roomhub did not become healthy within {timeout:?}");
            }
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status().is_success() {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }

    /// Wait for the process to exit within `timeout`.
    pub async fn wait_exit(
        &mut self,
        timeout: Duration,
    ) -> anyhow::Result<std::process::ExitStatus> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if tokio::time::Instant::now() > deadline {
                anyhow::bail!("roomhub did not exit within {timeout:?}");
            }
            if let Some(status) = self.child.try_wait()? {
                return Ok(status);
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }
}

impl Drop for HubProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
