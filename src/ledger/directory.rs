// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Process-wide registry of accounts keyed by authenticated address.
//!
//! Entries are created on first authentication and live until the process
//! exits. There is no eviction, so memory grows with the number of distinct
//! addresses that ever authenticated.

use std::{collections::HashMap, sync::Arc};

use alloy::primitives::Address;
use tokio::sync::{Mutex, RwLock};

use super::Account;

/// Handle to one account. Holding the lock serialises every mutation.
pub type AccountHandle = Arc<Mutex<Account>>;

#[derive(Default)]
pub struct AccountDirectory {
    accounts: RwLock<HashMap<Address, AccountHandle>>,
}

impl AccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing account for `address`, or a new cold one.
    pub async fn get_or_create(&self, address: Address) -> AccountHandle {
        if let Some(handle) = self.accounts.read().await.get(&address) {
            return handle.clone();
        }

        let mut accounts = self.accounts.write().await;
        accounts
            .entry(address)
            .or_insert_with(|| {
                tracing::info!(address = %address, "Account registered");
                Arc::new(Mutex::new(Account::new(address)))
            })
            .clone()
    }

    pub async fn get(&self, address: &Address) -> Option<AccountHandle> {
        self.accounts.read().await.get(address).cloned()
    }

    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}
