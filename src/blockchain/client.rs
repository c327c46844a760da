// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Custody contract client reading transfer events over JSON-RPC.

use alloy::{
    eips::BlockNumberOrTag,
    primitives::{Address, B256},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::{Filter, Log},
    sol_types::SolEvent,
};
use async_trait::async_trait;

use super::custody::ICustody;
use super::reader::EventSource;
use super::types::*;
use crate::ledger::Asset;

/// Custody contract client.
pub struct CustodyClient {
    /// Network configuration
    network: NetworkConfig,
    /// Alloy HTTP provider
    provider: DynProvider,
}

impl CustodyClient {
    /// Create a new client for the specified network.
    pub fn new(network: NetworkConfig) -> Result<Self, ChainError> {
        let url: url::Url = network
            .rpc_url
            .parse()
            .map_err(|e: url::ParseError| ChainError::InvalidRpcUrl(e.to_string()))?;

        let provider = ProviderBuilder::new().connect_http(url).erased();

        Ok(Self { network, provider })
    }

    /// Log filter for one event kind where `account` is the second indexed topic.
    fn filter(&self, account: Address, kind: EventKind) -> Filter {
        Filter::new()
            .address(self.network.custody_contract)
            .event_signature(signature_hash(kind))
            .topic2(account.into_word())
            .from_block(self.network.from_block)
            .to_block(BlockNumberOrTag::Latest)
    }
}

#[async_trait]
impl EventSource for CustodyClient {
    async fn events(&self, account: Address, kind: EventKind) -> Result<Vec<Event>, ChainError> {
        let logs = self
            .provider
            .get_logs(&self.filter(account, kind))
            .await
            .map_err(|e| ChainError::RpcError(e.to_string()))?;

        logs.iter().map(|log| decode_log(kind, log)).collect()
    }

    async fn head_block(&self) -> Result<u64, ChainError> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| ChainError::RpcError(e.to_string()))
    }
}

fn signature_hash(kind: EventKind) -> B256 {
    match kind {
        EventKind::Deposited => ICustody::Deposited::SIGNATURE_HASH,
        EventKind::Withdrawn => ICustody::Withdrawn::SIGNATURE_HASH,
    }
}

fn decode_log(kind: EventKind, log: &Log) -> Result<Event, ChainError> {
    let decode_err = |e: alloy::sol_types::Error| ChainError::DecodeError {
        kind,
        reason: e.to_string(),
    };

    match kind {
        EventKind::Deposited => {
            let data = log
                .log_decode::<ICustody::Deposited>()
                .map_err(decode_err)?
                .inner
                .data;
            Ok(Event {
                event: kind,
                id: data.id,
                asset: Asset::from(data.asset),
                amount: data.amount,
                rid: None,
            })
        }
        EventKind::Withdrawn => {
            let data = log
                .log_decode::<ICustody::Withdrawn>()
                .map_err(decode_err)?
                .inner
                .data;
            Ok(Event {
                event: kind,
                id: data.id,
                asset: Asset::from(data.asset),
                amount: data.amount,
                rid: Some(data.rid),
            })
        }
    }
}
