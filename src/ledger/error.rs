// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger errors.

use crate::blockchain::ChainError;

use super::{Asset, Side};

/// Errors raised by account, order and settlement operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("CreateOrder: Insufficient {currency} currency ({asset}): required {required}, available {available}")]
    InsufficientFunds {
        side: Side,
        currency: &'static str,
        asset: Asset,
        required: String,
        available: String,
    },

    #[error("Order not found")]
    OrderNotFound(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid price: {0}")]
    InvalidPrice(String),

    #[error("invalid side: {0} (expected buy or sell)")]
    InvalidSide(String),

    #[error("notional of {amount} at price {price} is not a whole number of quote units")]
    FractionalNotional { amount: String, price: String },

    #[error("arithmetic overflow in ledger")]
    Overflow,

    #[error(transparent)]
    Chain(#[from] ChainError),
}

impl LedgerError {
    /// Whether the caller can fix the request and retry.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, LedgerError::Chain(_) | LedgerError::Overflow)
    }
}
