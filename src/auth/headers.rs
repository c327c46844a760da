// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request header helpers for API-key authentication.

use axum::http::{header::HOST, HeaderMap};

use super::AuthError;

/// Header carrying the caller's signed API key.
pub const API_KEY_HEADER: &str = "x-custody-api-key";

/// The API key signature from the request headers.
pub fn api_key(headers: &HeaderMap) -> Result<&str, AuthError> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(AuthError::MissingApiKey)
}

/// URL the API key was issued for, rebuilt from the `Host` header.
///
/// `localhost` is served over plain HTTP, every other host over HTTPS.
pub fn host_url(headers: &HeaderMap) -> Result<String, AuthError> {
    let host = headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(AuthError::MissingHost)?;

    let (hostname, port) = match host.split_once(':') {
        Some((name, port)) => (name, Some(port).filter(|p| !p.is_empty())),
        None => (host, None),
    };
    if hostname.is_empty() {
        return Err(AuthError::MissingHost);
    }

    let protocol = if hostname == "localhost" { "http" } else { "https" };
    Ok(match port {
        Some(port) => format!("{protocol}://{hostname}:{port}"),
        None => format!("{protocol}://{hostname}"),
    })
}
