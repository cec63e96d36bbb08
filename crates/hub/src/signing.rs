// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Batch authentication.
//!
//! Pushes are signed with the hub's Ed25519 private key; clients verify with
//! the hub's public key before accepting, so a compromised client cannot
//! forge hub authority. The signed payload is the canonical JSON array of
//! room ids.

use std::path::Path;

use anyhow::Context;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use ring::signature::{Ed25519KeyPair, KeyPair as _, UnparsedPublicKey, ED25519};
use serde::{Deserialize, Serialize};

use crate::allocator::RoomId;

/// A room batch plus the hub's signature over it, as sent to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedBatch {
    pub room_ids: Vec<RoomId>,
    /// Base64 Ed25519 signature over the JSON-encoded `room_ids` array.
    pub signature: String,
}

/// Holds the hub's private key for the process lifetime.
pub struct Signer {
    keypair: Ed25519KeyPair,
}

impl Signer {
    /// Load a PKCS#8 Ed25519 private key from disk.
    ///
    /// Failure here is fatal: without the key, push authenticity cannot be
    /// guaranteed and the hub must not start.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("reading signing key {}", path.display()))?;
        let keypair = Ed25519KeyPair::from_pkcs8(&bytes)
            .map_err(|e| anyhow::anyhow!("invalid signing key {}: {e}", path.display()))?;
        Ok(Self { keypair })
    }

    /// The corresponding public key, as distributed to clients.
    pub fn public_key(&self) -> Vec<u8> {
        self.keypair.public_key().as_ref().to_vec()
    }

    /// Sign a room batch for pushing.
    pub fn sign_rooms(&self, rooms: &[RoomId]) -> anyhow::Result<SignedBatch> {
        let payload = serde_json::to_vec(rooms)?;
        let signature = self.keypair.sign(&payload);
        Ok(SignedBatch {
            room_ids: rooms.to_vec(),
            signature: BASE64.encode(signature.as_ref()),
        })
    }
}

/// Verify a batch against the hub's public key. This is the check a client
/// performs before accepting a push.
pub fn verify_batch(public_key: &[u8], batch: &SignedBatch) -> anyhow::Result<()> {
    let payload = serde_json::to_vec(&batch.room_ids)?;
    let signature = BASE64.decode(&batch.signature).context("decoding batch signature")?;
    UnparsedPublicKey::new(&ED25519, public_key)
        .verify(&payload, &signature)
        .map_err(|_| anyhow::anyhow!("batch signature verification failed"))
}

#[cfg(test)]
#[path = "signing_tests.rs"]
mod tests;
