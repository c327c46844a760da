// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `RPC_URL` | EVM JSON-RPC endpoint | Required |
//! | `CHAIN_ID` | Platform chain id (typed-data domain) | Required |
//! | `CUSTODY_CONTRACT_ADDRESS` | Custody contract address | Required |
//! | `FROM_BLOCK` | First block scanned for custody events | `9441794` |
//! | `BROKER_PRIVATE_KEY` | Hex key signing withdrawal authorizations | Required |
//! | `APP_NAME` | Typed-data domain name | `opendax` |
//! | `APP_VERSION` | Typed-data domain version | `1` |
//! | `WITHDRAWAL_TIMEOUT_MS` | Validity of a withdrawal authorization | `3600000` |
//! | `CHAIN_QUERY_TIMEOUT_MS` | Timeout for one history refresh | `30000` |
//! | `HISTORY_MAX_AGE_MS` | Reuse a refreshed history this long (`0` = always rescan) | `0` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{fmt, str::FromStr, time::Duration};

use alloy::primitives::Address;

use crate::blockchain::{NetworkConfig, DEFAULT_FROM_BLOCK};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const RPC_URL_ENV: &str = "RPC_URL";
pub const CHAIN_ID_ENV: &str = "CHAIN_ID";
pub const CUSTODY_CONTRACT_ENV: &str = "CUSTODY_CONTRACT_ADDRESS";
pub const FROM_BLOCK_ENV: &str = "FROM_BLOCK";

/// Environment variable name for the broker signing key.
///
/// The key is only ever used to sign withdrawal authorizations and is never
/// logged or returned.
pub const BROKER_PRIVATE_KEY_ENV: &str = "BROKER_PRIVATE_KEY";

pub const APP_NAME_ENV: &str = "APP_NAME";
pub const APP_VERSION_ENV: &str = "APP_VERSION";
pub const WITHDRAWAL_TIMEOUT_ENV: &str = "WITHDRAWAL_TIMEOUT_MS";
pub const CHAIN_QUERY_TIMEOUT_ENV: &str = "CHAIN_QUERY_TIMEOUT_MS";
pub const HISTORY_MAX_AGE_ENV: &str = "HISTORY_MAX_AGE_MS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_APP_NAME: &str = "opendax";
pub const DEFAULT_APP_VERSION: &str = "1";
pub const DEFAULT_WITHDRAWAL_TIMEOUT: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_CHAIN_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Default tracing filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{name} is invalid ({value}): {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Service configuration.
#[derive(Clone)]
pub struct CustodyConfig {
    pub host: String,
    pub port: u16,
    pub network: NetworkConfig,
    pub broker_private_key: String,
    pub app_name: String,
    pub app_version: String,
    pub withdrawal_timeout: Duration,
    pub chain_query_timeout: Duration,
    pub history_max_age: Duration,
}

impl fmt::Debug for CustodyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustodyConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("network", &self.network)
            .field("broker_private_key", &"<redacted>")
            .field("app_name", &self.app_name)
            .field("app_version", &self.app_version)
            .field("withdrawal_timeout", &self.withdrawal_timeout)
            .field("chain_query_timeout", &self.chain_query_timeout)
            .field("history_max_age", &self.history_max_age)
            .finish()
    }
}

impl CustodyConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from any name -> value lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let custody_contract: Address = parse(CUSTODY_CONTRACT_ENV, &require(CUSTODY_CONTRACT_ENV)?)?;
        let network = NetworkConfig {
            chain_id: parse(CHAIN_ID_ENV, &require(CHAIN_ID_ENV)?)?,
            rpc_url: require(RPC_URL_ENV)?,
            custody_contract,
            from_block: optional(FROM_BLOCK_ENV, get(FROM_BLOCK_ENV))?.unwrap_or(DEFAULT_FROM_BLOCK),
        };

        Ok(Self {
            host: get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: optional(PORT_ENV, get(PORT_ENV))?.unwrap_or(DEFAULT_PORT),
            network,
            broker_private_key: require(BROKER_PRIVATE_KEY_ENV)?,
            app_name: get(APP_NAME_ENV).unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
            app_version: get(APP_VERSION_ENV).unwrap_or_else(|| DEFAULT_APP_VERSION.to_string()),
            withdrawal_timeout: optional(WITHDRAWAL_TIMEOUT_ENV, get(WITHDRAWAL_TIMEOUT_ENV))?
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_WITHDRAWAL_TIMEOUT),
            chain_query_timeout: optional(CHAIN_QUERY_TIMEOUT_ENV, get(CHAIN_QUERY_TIMEOUT_ENV))?
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_CHAIN_QUERY_TIMEOUT),
            history_max_age: optional(HISTORY_MAX_AGE_ENV, get(HISTORY_MAX_AGE_ENV))?
                .map(Duration::from_millis)
                .unwrap_or(Duration::ZERO),
        })
    }

    /// `host:port` to bind the HTTP listener on.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn optional<T>(name: &'static str, value: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value.map(|v| parse(name, &v)).transpose()
}
