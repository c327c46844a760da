// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain types and constants.

use alloy::primitives::{Address, B256, U256};

use crate::ledger::Asset;

/// Custody network configuration.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Chain ID (also part of the typed-data domain)
    pub chain_id: u64,
    /// RPC endpoint URL
    pub rpc_url: String,
    /// Custody contract emitting `Deposited` / `Withdrawn`
    pub custody_contract: Address,
    /// First block scanned for custody events
    pub from_block: u64,
}

/// Block the custody contract was deployed at on the platform chain.
pub const DEFAULT_FROM_BLOCK: u64 = 9_441_794;

/// Kind of custody transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Deposited,
    Withdrawn,
}

/// A custody transfer observed on chain. Never mutated once read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub event: EventKind,
    pub id: U256,
    pub asset: Asset,
    pub amount: U256,
    /// Correlation id set by the withdrawal flow.
    pub rid: Option<B256>,
}

/// Errors that can occur while reading chain state.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Failed to decode {kind:?} log: {reason}")]
    DecodeError { kind: EventKind, reason: String },

    #[error("Chain query timed out after {0} ms")]
    Timeout(u128),
}
