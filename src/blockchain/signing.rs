// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Broker key handling.
//!
//! The broker key signs withdrawal authorizations that the custody contract
//! accepts for on-chain redemption. It is supplied through the environment and
//! never leaves this process.

use alloy::{
    primitives::{Signature, B256},
    signers::{local::PrivateKeySigner, SignerSync},
};

/// Errors raised while loading or using the broker key.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),
}

/// Create a signer from a hex-encoded private key (with or without `0x`).
pub fn signer_from_hex(private_key_hex: &str) -> Result<PrivateKeySigner, SigningError> {
    let key_bytes = alloy::hex::decode(private_key_hex.trim())
        .map_err(|e| SigningError::InvalidPrivateKey(e.to_string()))?;

    PrivateKeySigner::from_slice(&key_bytes)
        .map_err(|e| SigningError::InvalidPrivateKey(e.to_string()))
}

/// Sign an EIP-712 signing hash, returning the 65-byte signature as `0x` hex.
pub fn sign_prehash(signer: &PrivateKeySigner, hash: &B256) -> Result<String, SigningError> {
    let signature: Signature = signer
        .sign_hash_sync(hash)
        .map_err(|e| SigningError::SigningFailed(e.to_string()))?;
    Ok(alloy::hex::encode_prefixed(signature.as_bytes()))
}
