// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Callers authenticate with an EIP-712 signed API key instead of a session.
//!
//! ## Auth Flow
//!
//! 1. The user signs `ApiKey { url }` once, where `url` is the broker's
//!    public URL, under the domain `(APP_NAME, APP_VERSION, CHAIN_ID, custody)`
//! 2. Every request carries that signature in `x-custody-api-key`
//! 3. The server rebuilds `url` from the `Host` header and recovers the
//!    signer's address
//!
//! The recovered address selects the ledger account. There are no roles:
//! whoever can sign for an address controls exactly that account.
//!
//! ## Withdrawals
//!
//! Withdrawals are not executed here. The broker key signs a `Withdrawal`
//! payload the caller later redeems on the custody contract before `expire`.

pub mod error;
pub mod headers;
pub mod rid;
pub mod service;

pub use error::AuthError;
pub use headers::{api_key, host_url, API_KEY_HEADER};
pub use rid::{rid_hash, RidCounter};
pub use service::{typed_data_domain, AuthorizationService};
