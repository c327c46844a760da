// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Custody Ledger - Broker Account & Order Service
//!
//! This crate reconciles custody contract `Deposited` / `Withdrawn` events
//! into per-address balances, keeps each account's open orders and realized
//! PnL in memory, and signs withdrawal authorizations with the broker key.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - API-key recovery and withdrawal authorization (EIP-712)
//! - `blockchain` - Custody contract events and broker signing (alloy)
//! - `ledger` - Balances, orders, settlement and the account directory

pub mod api;
pub mod auth;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod ledger;
pub mod models;
pub mod state;
