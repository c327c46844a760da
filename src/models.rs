// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the request and response data structures used by
//! the custody API. All types derive `ToSchema` for OpenAPI documentation.
//!
//! ## Amounts
//!
//! Amounts and prices leave the service as decimal strings so values beyond
//! 2^53 survive JavaScript clients. On input they are accepted either as
//! strings or as JSON numbers ([`DecimalString`]).
//!
//! ## Missing fields
//!
//! Request fields are `Option`s so the handlers can answer with
//! `"<field> is missing"` instead of a generic deserialization error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::ledger::{BalanceReport, Order, Side};

// =============================================================================
// Decimal input
// =============================================================================

/// Decimal value received as a JSON string or number, kept as its text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawDecimal")]
pub struct DecimalString(pub String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDecimal {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawDecimal> for DecimalString {
    fn from(raw: RawDecimal) -> Self {
        match raw {
            RawDecimal::Text(s) => DecimalString(s),
            RawDecimal::Number(n) => DecimalString(n.to_string()),
        }
    }
}

impl DecimalString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Trimmed text, `None` when blank.
    pub fn non_empty(&self) -> Option<&str> {
        Some(self.0.trim()).filter(|s| !s.is_empty())
    }
}

impl From<&str> for DecimalString {
    fn from(value: &str) -> Self {
        DecimalString(value.to_string())
    }
}

// =============================================================================
// Withdrawals
// =============================================================================

/// One asset line of a withdrawal request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct WithdrawAsset {
    /// Token contract address.
    pub asset: Option<String>,
    /// Amount in the token's base units.
    #[schema(value_type = Option<String>)]
    pub amount: Option<DecimalString>,
}

/// Request body for `POST /api/custody/withdraw`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct WithdrawRequest {
    /// Must equal the authenticated address (case-insensitive).
    pub destination: Option<String>,
    pub assets: Option<Vec<WithdrawAsset>>,
}

/// Broker-signed withdrawal the caller redeems on the custody contract.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WithdrawalAuthorization {
    /// `keccak256` of the request correlation counter, `0x` hex.
    pub rid: String,
    /// Expiry, Unix milliseconds.
    pub expire: u64,
    /// Broker's 65-byte signature, `0x` hex.
    pub signature: String,
}

// =============================================================================
// Orders
// =============================================================================

/// Request body for `POST /api/custody/create_order`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub base: Option<String>,
    pub quote: Option<String>,
    /// `buy` or `sell`.
    pub side: Option<String>,
    /// Base-asset units.
    #[schema(value_type = Option<String>)]
    pub amount: Option<DecimalString>,
    /// Quote per base, exact decimal.
    #[schema(value_type = Option<String>)]
    pub price: Option<DecimalString>,
}

/// Request body for `cancel_order` and `execute_order`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct OrderIdRequest {
    pub id: Option<String>,
}

/// An order as returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: String,
    pub base: String,
    pub quote: String,
    pub side: Side,
    pub amount: String,
    pub price: String,
    /// Creation time, Unix milliseconds.
    pub ts: i64,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.clone(),
            base: order.base.to_string(),
            quote: order.quote.to_string(),
            side: order.side,
            amount: order.amount.to_string(),
            price: order.price.to_string(),
            ts: order.ts,
        }
    }
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self::from(&order)
    }
}

/// Response of `GET /api/custody/balances`: asset -> figures.
pub type BalancesResponse = BTreeMap<String, BalanceReport>;
