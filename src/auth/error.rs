// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and withdrawal authorization errors.

use axum::http::StatusCode;

/// Authentication error type.
#[derive(Debug)]
pub enum AuthError {
    /// No `Host` header present
    MissingHost,
    /// No `x-custody-api-key` header present
    MissingApiKey,
    /// API key is not a 65-byte hex signature
    MalformedApiKey,
    /// Signature recovery failed
    RecoveryFailed(String),
    /// Withdrawal request has no destination
    MissingDestination,
    /// Withdrawal request has no assets
    MissingAssets,
    /// Destination differs from the authenticated address
    DestinationMismatch,
    /// Withdrawal field could not be parsed
    InvalidWithdrawal(String),
    /// Broker signing failed
    SigningFailed(String),
}

impl AuthError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::SigningFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingHost => write!(f, "host is missing"),
            AuthError::MissingApiKey => write!(f, "x-custody-api-key is missing"),
            AuthError::MalformedApiKey => write!(f, "x-custody-api-key is malformed"),
            AuthError::RecoveryFailed(msg) => write!(f, "invalid api-key: {msg}"),
            AuthError::MissingDestination => write!(f, "destination is missing"),
            AuthError::MissingAssets => write!(f, "assets is missing"),
            AuthError::DestinationMismatch => write!(f, "invalid api-key"),
            AuthError::InvalidWithdrawal(msg) => write!(f, "{msg}"),
            AuthError::SigningFailed(msg) => write!(f, "Broker signing failed: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}
