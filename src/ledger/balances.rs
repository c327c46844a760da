// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signed per-asset balances with default-zero reads, and the fold that
//! derives settled balances from custody event history.

use std::collections::BTreeMap;

use alloy::primitives::{I256, U256};

use super::{Asset, LedgerError};
use crate::blockchain::{Event, EventKind};

/// Mapping asset → signed amount. Assets never written read as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Balances(BTreeMap<Asset, I256>);

impl Balances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Amount held for `asset`, zero when absent.
    pub fn balance_of(&self, asset: &Asset) -> I256 {
        self.0.get(asset).copied().unwrap_or(I256::ZERO)
    }

    /// Add a signed delta to `asset`.
    pub fn apply(&mut self, asset: &Asset, delta: I256) -> Result<(), LedgerError> {
        let next = self
            .balance_of(asset)
            .checked_add(delta)
            .ok_or(LedgerError::Overflow)?;
        self.0.insert(asset.clone(), next);
        Ok(())
    }

    pub fn credit(&mut self, asset: &Asset, amount: U256) -> Result<(), LedgerError> {
        self.apply(asset, to_signed(amount)?)
    }

    pub fn debit(&mut self, asset: &Asset, amount: U256) -> Result<(), LedgerError> {
        let amount = to_signed(amount)?;
        self.apply(asset, amount.checked_neg().ok_or(LedgerError::Overflow)?)
    }

    pub fn assets(&self) -> impl Iterator<Item = &Asset> {
        self.0.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fold a full event history into settled balances.
    ///
    /// Deposits add, withdrawals subtract. The fold is a plain per-asset sum,
    /// so the result does not depend on the order of `events`.
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a Event>) -> Result<Self, LedgerError> {
        let mut balances = Self::new();
        for event in events {
            match event.event {
                EventKind::Deposited => balances.credit(&event.asset, event.amount)?,
                EventKind::Withdrawn => balances.debit(&event.asset, event.amount)?,
            }
        }
        Ok(balances)
    }
}

/// Convert an unsigned chain amount into the signed ledger domain.
pub(crate) fn to_signed(amount: U256) -> Result<I256, LedgerError> {
    I256::try_from(amount).map_err(|_| LedgerError::Overflow)
}
