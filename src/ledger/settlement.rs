// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Realized PnL accounting for executed orders.
//!
//! Execution is recorded as a notional transfer: a buy gains `amount` base and
//! pays `amount * price` quote, a sell does the opposite. Matching against a
//! counterparty happens elsewhere; only the economic effect lands here.

use alloy::primitives::I256;

use super::{balances::to_signed, Balances, LedgerError, Order};

/// Signed PnL deltas produced by executing one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub base_delta: I256,
    pub quote_delta: I256,
}

impl Settlement {
    pub fn for_order(order: &Order) -> Result<Self, LedgerError> {
        let amount = to_signed(order.amount)?;
        let notional = to_signed(order.notional()?)?;
        let factor = I256::try_from(order.side.factor()).map_err(|_| LedgerError::Overflow)?;

        let base_delta = amount.checked_mul(factor).ok_or(LedgerError::Overflow)?;
        let quote_delta = notional
            .checked_mul(factor.checked_neg().ok_or(LedgerError::Overflow)?)
            .ok_or(LedgerError::Overflow)?;

        Ok(Self {
            base_delta,
            quote_delta,
        })
    }

    /// Apply both legs to `pnl`, or neither if either would overflow.
    pub fn apply(&self, order: &Order, pnl: &mut Balances) -> Result<(), LedgerError> {
        let mut next = pnl.clone();
        next.apply(&order.base, self.base_delta)?;
        next.apply(&order.quote, self.quote_delta)?;
        *pnl = next;
        Ok(())
    }
}
