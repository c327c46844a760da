// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{sync::Arc, time::Duration};

use crate::{
    auth::{AuthorizationService, RidCounter},
    blockchain::ChainEventReader,
    ledger::AccountDirectory,
};

#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<AccountDirectory>,
    pub reader: ChainEventReader,
    pub auth: Arc<AuthorizationService>,
    pub rid: Arc<RidCounter>,
    /// How long a refreshed history is reused; zero rescans on every request.
    pub history_max_age: Duration,
}

impl AppState {
    pub fn new(reader: ChainEventReader, auth: AuthorizationService, history_max_age: Duration) -> Self {
        Self {
            directory: Arc::new(AccountDirectory::new()),
            reader,
            auth: Arc::new(auth),
            rid: Arc::new(RidCounter::new()),
            history_max_age,
        }
    }
}
