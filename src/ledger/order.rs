// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Orders, sides and fixed-point prices.

use std::{fmt, str::FromStr};

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{balances::to_signed, Asset, LedgerError};

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Sign applied to the base asset on settlement.
    pub fn factor(self) -> i8 {
        match self {
            Side::Buy => 1,
            Side::Sell => -1,
        }
    }
}

impl FromStr for Side {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            other => Err(LedgerError::InvalidSide(other.to_string())),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => f.write_str("buy"),
            Side::Sell => f.write_str("sell"),
        }
    }
}

/// Largest number of fractional digits accepted in a price.
const MAX_PRICE_SCALE: usize = 36;

/// Quote-per-base price as an exact decimal: `mantissa / 10^scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Price {
    mantissa: U256,
    scale: u8,
}

impl Price {
    /// Quote units owed for `amount` base units.
    ///
    /// Fails when the product is not a whole number of quote units.
    pub fn notional(&self, amount: U256) -> Result<U256, LedgerError> {
        let product = amount
            .checked_mul(self.mantissa)
            .ok_or(LedgerError::Overflow)?;
        let divisor = U256::from(10u64).pow(U256::from(self.scale));
        let (quotient, remainder) = product.div_rem(divisor);
        if !remainder.is_zero() {
            return Err(LedgerError::FractionalNotional {
                amount: amount.to_string(),
                price: self.to_string(),
            });
        }
        Ok(quotient)
    }
}

impl FromStr for Price {
    type Err = LedgerError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || LedgerError::InvalidPrice(raw.to_string());
        let s = raw.trim();
        let (whole, fraction) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if fraction.len() > MAX_PRICE_SCALE {
            return Err(invalid());
        }

        let digits = format!("{whole}{fraction}");
        let mantissa = U256::from_str_radix(&digits, 10).map_err(|_| invalid())?;
        Ok(Self {
            mantissa,
            scale: fraction.len() as u8,
        })
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.mantissa.to_string();
        let scale = self.scale as usize;
        if scale == 0 {
            return f.write_str(&digits);
        }
        let padded = format!("{digits:0>width$}", width = scale + 1);
        let (whole, fraction) = padded.split_at(padded.len() - scale);
        write!(f, "{whole}.{fraction}")
    }
}

/// Validated order intent, before an id and timestamp are assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub base: Asset,
    pub quote: Asset,
    pub side: Side,
    /// Base-asset units, strictly positive.
    pub amount: U256,
    pub price: Price,
}

impl NewOrder {
    pub fn new(base: Asset, quote: Asset, side: Side, amount: U256, price: Price) -> Result<Self, LedgerError> {
        if amount.is_zero() {
            return Err(LedgerError::InvalidAmount("amount must be positive".to_string()));
        }
        // Both legs must fit a signed balance delta; reject fractional notionals
        // up front so every later computation is exact.
        to_signed(amount).map_err(|_| {
            LedgerError::InvalidAmount(format!("amount {amount} is too large"))
        })?;
        let notional = price.notional(amount).map_err(|e| match e {
            LedgerError::Overflow => LedgerError::InvalidAmount(format!(
                "notional of {amount} at price {price} is too large"
            )),
            other => other,
        })?;
        to_signed(notional).map_err(|_| {
            LedgerError::InvalidAmount(format!(
                "notional of {amount} at price {price} is too large"
            ))
        })?;
        Ok(Self {
            base,
            quote,
            side,
            amount,
            price,
        })
    }
}

/// A pending order owned by one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: String,
    pub base: Asset,
    pub quote: Asset,
    pub side: Side,
    pub amount: U256,
    pub price: Price,
    /// Creation time, Unix milliseconds.
    pub ts: i64,
}

impl Order {
    /// Quote units implied by this order.
    pub fn notional(&self) -> Result<U256, LedgerError> {
        self.price.notional(self.amount)
    }

    /// Asset and amount this order encumbers while open.
    pub fn collateral(&self) -> Result<(&Asset, U256), LedgerError> {
        match self.side {
            Side::Buy => Ok((&self.quote, self.notional()?)),
            Side::Sell => Ok((&self.base, self.amount)),
        }
    }
}

/// Fresh order id: 12 random bytes, hex-encoded.
pub fn generate_order_id() -> String {
    alloy::hex::encode(rand::random::<[u8; 12]>())
}
