// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain integration for the custody contract.
//!
//! This module provides functionality for:
//! - Reading `Deposited` / `Withdrawn` history of an account
//! - EIP-712 bindings shared with the custody contract
//! - Broker key loading and signing

pub mod client;
pub mod custody;
pub mod reader;
pub mod signing;
pub mod types;

#[cfg(test)]
pub mod memory;

pub use client::CustodyClient;
pub use reader::{ChainEventReader, EventSource};
pub use signing::{sign_prehash, signer_from_hex, SigningError};
pub use types::*;
