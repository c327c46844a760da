// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory event source for tests.

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
    time::Duration,
};

use alloy::primitives::Address;
use async_trait::async_trait;

use super::{ChainError, Event, EventKind, EventSource};

#[derive(Default)]
pub struct MemoryEventSource {
    events: Mutex<HashMap<Address, Vec<Event>>>,
    failing: Mutex<HashSet<EventKind>>,
    delay: Mutex<Option<Duration>>,
}

impl MemoryEventSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, account: Address, event: Event) {
        self.events
            .lock()
            .unwrap()
            .entry(account)
            .or_default()
            .push(event);
    }

    pub fn fail_kind(&self, kind: EventKind) {
        self.failing.lock().unwrap().insert(kind);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }
}

#[async_trait]
impl EventSource for MemoryEventSource {
    async fn events(&self, account: Address, kind: EventKind) -> Result<Vec<Event>, ChainError> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.lock().unwrap().contains(&kind) {
            return Err(ChainError::RpcError(format!("{kind:?} query failed")));
        }
        Ok(self
            .events
            .lock()
            .unwrap()
            .get(&account)
            .map(|events| events.iter().filter(|e| e.event == kind).cloned().collect())
            .unwrap_or_default())
    }

    async fn head_block(&self) -> Result<u64, ChainError> {
        if !self.failing.lock().unwrap().is_empty() {
            return Err(ChainError::RpcError("head query failed".to_string()));
        }
        Ok(self.events.lock().unwrap().values().map(Vec::len).sum::<usize>() as u64)
    }
}
