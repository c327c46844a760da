// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Asset identifier used as the key of every ledger map.

use std::{fmt, str::FromStr};

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Asset identifier: a token contract address or a plain symbol.
///
/// Addresses are stored in EIP-55 checksum form so that an order placed with
/// `0xabc...` and a custody event reporting `0xAbC...` land on the same key.
/// Anything that does not parse as an address (e.g. `"BTC"`) is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct Asset(String);

impl Asset {
    pub fn new(raw: &str) -> Self {
        let raw = raw.trim();
        match Address::from_str(raw) {
            Ok(address) if raw.starts_with("0x") || raw.starts_with("0X") => {
                Self(address.to_checksum(None))
            }
            _ => Self(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Address> for Asset {
    fn from(address: Address) -> Self {
        Self(address.to_checksum(None))
    }
}

impl From<&str> for Asset {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
