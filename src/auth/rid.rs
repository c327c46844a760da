// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-request correlation counter.

use std::sync::atomic::{AtomicU64, Ordering};

use alloy::primitives::{keccak256, B256};
use chrono::Utc;

/// Millisecond-based counter, advanced once per custody request.
///
/// Each value is `max(now_ms, previous + 1)`, so concurrent requests never
/// share a correlation id even within the same millisecond.
#[derive(Debug)]
pub struct RidCounter {
    last: AtomicU64,
}

impl RidCounter {
    pub fn new() -> Self {
        Self {
            last: AtomicU64::new(now_ms()),
        }
    }

    /// Advance and return the new value.
    pub fn next(&self) -> u64 {
        let now = now_ms();
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(current + 1);
            match self.last.compare_exchange_weak(
                current,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(observed) => current = observed,
            }
        }
    }

    /// Most recently issued value.
    pub fn current(&self) -> u64 {
        self.last.load(Ordering::Acquire)
    }
}

impl Default for RidCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Withdrawal `rid`: keccak256 of the counter's decimal string.
pub fn rid_hash(rid: u64) -> B256 {
    keccak256(rid.to_string().as_bytes())
}

fn now_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}
