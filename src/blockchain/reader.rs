// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Reads the full custody event history of one account.

use std::{sync::Arc, time::Duration};

use alloy::primitives::Address;
use async_trait::async_trait;

use super::types::{ChainError, Event, EventKind};

/// Source of custody events scoped to one account.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// All events of `kind` emitted for `account` since the configured start block.
    async fn events(&self, account: Address, kind: EventKind) -> Result<Vec<Event>, ChainError>;

    /// Latest block number, used by readiness probes.
    async fn head_block(&self) -> Result<u64, ChainError>;
}

/// Fetches both event kinds for an account under a single deadline.
#[derive(Clone)]
pub struct ChainEventReader {
    source: Arc<dyn EventSource>,
    timeout: Duration,
}

impl ChainEventReader {
    pub fn new(source: Arc<dyn EventSource>, timeout: Duration) -> Self {
        Self { source, timeout }
    }

    /// Deposits followed by withdrawals.
    ///
    /// Ordering across the two kinds is not chain order. Both queries run
    /// concurrently and either failing fails the whole read.
    pub async fn history(&self, account: Address) -> Result<Vec<Event>, ChainError> {
        let fetch = async {
            tokio::try_join!(
                self.source.events(account, EventKind::Deposited),
                self.source.events(account, EventKind::Withdrawn),
            )
        };

        let (mut deposits, withdrawals) = tokio::time::timeout(self.timeout, fetch)
            .await
            .map_err(|_| ChainError::Timeout(self.timeout.as_millis()))??;

        tracing::debug!(
            account = %account,
            deposits = deposits.len(),
            withdrawals = withdrawals.len(),
            "Fetched custody history"
        );

        deposits.extend(withdrawals);
        Ok(deposits)
    }

    pub async fn head_block(&self) -> Result<u64, ChainError> {
        tokio::time::timeout(self.timeout, self.source.head_block())
            .await
            .map_err(|_| ChainError::Timeout(self.timeout.as_millis()))?
    }
}
