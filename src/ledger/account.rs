// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-address account: settled balances, open orders and realized PnL.
//!
//! An `Account` is not synchronised on its own. Callers reach it through
//! [`AccountDirectory`](super::AccountDirectory), which hands out one mutex per
//! address so refresh and order mutations never interleave.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use alloy::primitives::{Address, I256};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use super::{
    balances::to_signed, generate_order_id, Asset, Balances, LedgerError, NewOrder, Order,
    Settlement, Side,
};
use crate::blockchain::{ChainEventReader, Event};

/// Per-asset figures reported to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BalanceReport {
    /// Settled on-chain balance
    #[schema(value_type = String)]
    #[serde(serialize_with = "decimal")]
    pub balances: I256,
    /// Collateral encumbered by open orders
    #[schema(value_type = String)]
    #[serde(serialize_with = "decimal")]
    pub locked: I256,
    /// Realized PnL
    #[schema(value_type = String)]
    #[serde(serialize_with = "decimal")]
    pub pnl: I256,
    /// `balances - locked + pnl`
    #[schema(value_type = String)]
    #[serde(serialize_with = "decimal")]
    pub available: I256,
}

fn decimal<S: serde::Serializer>(value: &I256, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

#[derive(Debug)]
pub struct Account {
    address: Address,
    history: Vec<Event>,
    balances: Balances,
    open_orders: Vec<Order>,
    pnl: Balances,
    refreshed_at: Option<Instant>,
}

impl Account {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            history: Vec::new(),
            balances: Balances::new(),
            open_orders: Vec::new(),
            pnl: Balances::new(),
            refreshed_at: None,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn history(&self) -> &[Event] {
        &self.history
    }

    pub fn balances(&self) -> &Balances {
        &self.balances
    }

    pub fn open_orders(&self) -> &[Order] {
        &self.open_orders
    }

    pub fn pnl(&self) -> &Balances {
        &self.pnl
    }

    /// Whether balances have been derived from chain at least once.
    pub fn is_warm(&self) -> bool {
        self.refreshed_at.is_some()
    }

    /// Rescan history and recompute settled balances from scratch.
    ///
    /// Open orders are not reconciled here; balances only reflect chain state.
    /// The history is replaced wholesale, never merged, and only together with
    /// the balances folded from it.
    pub async fn refresh_balances(&mut self, reader: &ChainEventReader) -> Result<(), LedgerError> {
        let history = self.fetch_history(reader).await?;
        let balances = Balances::from_events(&history)?;
        self.history = history;
        self.balances = balances;
        self.refreshed_at = Some(Instant::now());
        Ok(())
    }

    /// Full chain scan for this account's deposits and withdrawals.
    async fn fetch_history(&self, reader: &ChainEventReader) -> Result<Vec<Event>, LedgerError> {
        Ok(reader.history(self.address).await?)
    }

    /// Refresh unless the last refresh is younger than `max_age`.
    ///
    /// A zero `max_age` always rescans.
    pub async fn ensure_fresh(
        &mut self,
        reader: &ChainEventReader,
        max_age: Duration,
    ) -> Result<(), LedgerError> {
        let fresh = match self.refreshed_at {
            Some(at) => !max_age.is_zero() && at.elapsed() < max_age,
            None => false,
        };
        if fresh {
            return Ok(());
        }
        self.refresh_balances(reader).await
    }

    /// Per asset, collateral encumbered by open orders.
    pub fn lock_balances(&self) -> Result<Balances, LedgerError> {
        let mut locked = Balances::new();
        for order in &self.open_orders {
            let (asset, amount) = order.collateral()?;
            locked.credit(asset, amount)?;
        }
        Ok(locked)
    }

    fn available_of(&self, asset: &Asset, locked: &Balances) -> Result<I256, LedgerError> {
        self.balances
            .balance_of(asset)
            .checked_sub(locked.balance_of(asset))
            .and_then(|v| v.checked_add(self.pnl.balance_of(asset)))
            .ok_or(LedgerError::Overflow)
    }

    /// Open a new order if the account can cover its collateral.
    ///
    /// Coverage is checked against `balance - locked + pnl`, so orders that
    /// are already open reduce what a new order may use.
    pub fn create_order(&mut self, order: NewOrder) -> Result<Order, LedgerError> {
        let (asset, required, currency) = match order.side {
            Side::Buy => (&order.quote, order.price.notional(order.amount)?, "quote"),
            Side::Sell => (&order.base, order.amount, "base"),
        };

        let locked = self.lock_balances()?;
        let available = self.available_of(asset, &locked)?;
        if available < to_signed(required)? {
            return Err(LedgerError::InsufficientFunds {
                side: order.side,
                currency,
                asset: asset.clone(),
                required: required.to_string(),
                available: available.to_string(),
            });
        }

        let created = Order {
            id: generate_order_id(),
            base: order.base,
            quote: order.quote,
            side: order.side,
            amount: order.amount,
            price: order.price,
            ts: Utc::now().timestamp_millis(),
        };
        self.open_orders.push(created.clone());

        tracing::info!(
            address = %self.address,
            order_id = %created.id,
            side = %created.side,
            base = %created.base,
            quote = %created.quote,
            amount = %created.amount,
            price = %created.price,
            "Order created"
        );

        Ok(created)
    }

    /// Remove and return the first open order with `id`.
    pub fn cancel_order(&mut self, id: &str) -> Result<Order, LedgerError> {
        let index = self
            .open_orders
            .iter()
            .position(|o| o.id == id)
            .ok_or_else(|| LedgerError::OrderNotFound(id.to_string()))?;
        let order = self.open_orders.remove(index);

        tracing::info!(address = %self.address, order_id = %order.id, "Order cancelled");
        Ok(order)
    }

    /// Remove the order and book its notional effect into PnL.
    pub fn execute_order(&mut self, id: &str) -> Result<Order, LedgerError> {
        let index = self
            .open_orders
            .iter()
            .position(|o| o.id == id)
            .ok_or_else(|| LedgerError::OrderNotFound(id.to_string()))?;

        let settlement = Settlement::for_order(&self.open_orders[index])?;
        settlement.apply(&self.open_orders[index], &mut self.pnl)?;
        let order = self.open_orders.remove(index);

        tracing::info!(
            address = %self.address,
            order_id = %order.id,
            base_pnl = %settlement.base_delta,
            quote_pnl = %settlement.quote_delta,
            "Order executed"
        );
        Ok(order)
    }

    /// `{balances, locked, pnl, available}` for every asset seen in any of
    /// balances, locked collateral or PnL.
    pub fn report_balances(&self) -> Result<Vec<(Asset, BalanceReport)>, LedgerError> {
        let locked = self.lock_balances()?;
        let assets: BTreeSet<&Asset> = self
            .balances
            .assets()
            .chain(locked.assets())
            .chain(self.pnl.assets())
            .collect();

        assets
            .into_iter()
            .map(|asset| {
                let report = BalanceReport {
                    balances: self.balances.balance_of(asset),
                    locked: locked.balance_of(asset),
                    pnl: self.pnl.balance_of(asset),
                    available: self.available_of(asset, &locked)?,
                };
                Ok((asset.clone(), report))
            })
            .collect()
    }
}
