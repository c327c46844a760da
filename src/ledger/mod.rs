// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Custody Ledger
//!
//! In-process accounting for custody accounts.
//!
//! - Settled balances are a pure fold of the account's on-chain
//!   `Deposited` / `Withdrawn` history ([`Balances::from_events`]).
//! - Open orders encumber collateral; new orders must fit in
//!   `balance - locked + pnl`.
//! - Executed orders move their notional effect into realized PnL.
//!
//! Nothing here is persisted. Balances are re-derivable from chain, open
//! orders and PnL are lost on restart.

pub mod account;
pub mod asset;
pub mod balances;
pub mod directory;
pub mod error;
pub mod order;
pub mod settlement;

pub use account::{Account, BalanceReport};
pub use asset::Asset;
pub use balances::Balances;
pub use directory::{AccountDirectory, AccountHandle};
pub use error::LedgerError;
pub use order::{generate_order_id, NewOrder, Order, Price, Side};
pub use settlement::Settlement;
