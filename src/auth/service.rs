// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! API-key verification and broker-signed withdrawal authorizations.

use std::{str::FromStr, time::Duration};

use alloy::{
    primitives::{Address, Signature, B256, U256},
    signers::local::PrivateKeySigner,
    sol_types::{Eip712Domain, SolStruct},
};
use axum::http::HeaderMap;
use chrono::Utc;

use super::{headers, rid::rid_hash, AuthError};
use crate::{
    blockchain::{custody, sign_prehash},
    models::{WithdrawRequest, WithdrawalAuthorization},
};

/// Build the typed-data domain shared by API keys and withdrawals.
pub fn typed_data_domain(
    name: impl Into<String>,
    version: impl Into<String>,
    chain_id: u64,
    verifying_contract: Address,
) -> Eip712Domain {
    let (name, version): (String, String) = (name.into(), version.into());
    Eip712Domain::new(
        Some(name.into()),
        Some(version.into()),
        Some(U256::from(chain_id)),
        Some(verifying_contract),
        None,
    )
}

/// Verifies caller API keys and signs withdrawal authorizations.
///
/// The address recovered from an API key is the only identity check: a caller
/// controls exactly the account of the key it can sign with.
pub struct AuthorizationService {
    domain: Eip712Domain,
    broker: PrivateKeySigner,
    withdrawal_timeout: Duration,
}

impl AuthorizationService {
    pub fn new(domain: Eip712Domain, broker: PrivateKeySigner, withdrawal_timeout: Duration) -> Self {
        tracing::info!(broker = %broker.address(), "Broker signer loaded");
        Self {
            domain,
            broker,
            withdrawal_timeout,
        }
    }

    pub fn broker_address(&self) -> Address {
        self.broker.address()
    }

    /// EIP-712 hash a user signs to issue an API key for `url`.
    pub fn api_key_signing_hash(&self, url: &str) -> B256 {
        custody::ApiKey {
            url: url.to_string(),
        }
        .eip712_signing_hash(&self.domain)
    }

    /// Recover the address that signed `api_key` for `url`.
    pub fn recover_address(&self, api_key: &str, url: &str) -> Result<Address, AuthError> {
        let bytes = alloy::hex::decode(api_key).map_err(|_| AuthError::MalformedApiKey)?;
        let signature =
            Signature::try_from(bytes.as_slice()).map_err(|_| AuthError::MalformedApiKey)?;

        signature
            .recover_address_from_prehash(&self.api_key_signing_hash(url))
            .map_err(|e| AuthError::RecoveryFailed(e.to_string()))
    }

    /// Authenticate a request from its `Host` and API-key headers.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Address, AuthError> {
        let url = headers::host_url(headers)?;
        let api_key = headers::api_key(headers)?;
        let address = self.recover_address(api_key, &url)?;
        tracing::debug!(address = %address, url = %url, "API key verified");
        Ok(address)
    }

    /// Sign a withdrawal the caller can redeem on the custody contract.
    ///
    /// Balances are not debited here; redemption and debiting happen on chain.
    pub fn authorize_withdrawal(
        &self,
        caller: Address,
        request: &WithdrawRequest,
        rid: u64,
    ) -> Result<WithdrawalAuthorization, AuthError> {
        let destination = request
            .destination
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .ok_or(AuthError::MissingDestination)?;
        let assets = request
            .assets
            .as_deref()
            .filter(|a| !a.is_empty())
            .ok_or(AuthError::MissingAssets)?;
        if !destination.eq_ignore_ascii_case(&caller.to_checksum(None)) {
            return Err(AuthError::DestinationMismatch);
        }

        let assets = assets
            .iter()
            .map(|entry| {
                let asset = entry
                    .asset
                    .as_deref()
                    .ok_or_else(|| AuthError::InvalidWithdrawal("asset is missing".into()))?;
                let amount = entry
                    .amount
                    .as_ref()
                    .map(|a| a.as_str())
                    .ok_or_else(|| AuthError::InvalidWithdrawal("amount is missing".into()))?;
                Ok(custody::Asset {
                    asset: Address::from_str(asset.trim()).map_err(|_| {
                        AuthError::InvalidWithdrawal(format!("invalid asset address: {asset}"))
                    })?,
                    amount: U256::from_str(amount.trim()).map_err(|_| {
                        AuthError::InvalidWithdrawal(format!("invalid amount: {amount}"))
                    })?,
                })
            })
            .collect::<Result<Vec<_>, AuthError>>()?;

        let rid = rid_hash(rid);
        let timeout = u64::try_from(self.withdrawal_timeout.as_millis()).unwrap_or(u64::MAX);
        let expire = (Utc::now().timestamp_millis().max(0) as u64).saturating_add(timeout);

        let payload = custody::Withdrawal {
            rid,
            expire: U256::from(expire),
            destination: caller,
            assets,
        };
        let signature = sign_prehash(&self.broker, &payload.eip712_signing_hash(&self.domain))
            .map_err(|e| AuthError::SigningFailed(e.to_string()))?;

        tracing::info!(
            destination = %caller,
            rid = %rid,
            expire,
            assets = payload.assets.len(),
            "Withdrawal authorized"
        );

        Ok(WithdrawalAuthorization {
            rid: rid.to_string(),
            expire,
            signature,
        })
    }

    /// Hash of the withdrawal payload the broker signs, for verifying an
    /// authorization against its inputs.
    pub fn withdrawal_signing_hash(&self, payload: &custody::Withdrawal) -> B256 {
        payload.eip712_signing_hash(&self.domain)
    }
}

#[cfg(test)]
mod tests {
    use alloy::signers::SignerSync;
    use axum::http::{header::HOST, HeaderValue};

    use super::*;
    use crate::models::WithdrawAsset;

    fn service() -> AuthorizationService {
        let domain = typed_data_domain("opendax", "1", 31337, Address::repeat_byte(0xcc));
        let broker = PrivateKeySigner::from_bytes(&B256::repeat_byte(0x11)).unwrap();
        AuthorizationService::new(domain, broker, Duration::from_secs(600))
    }

    fn user() -> PrivateKeySigner {
        PrivateKeySigner::from_bytes(&B256::repeat_byte(0x22)).unwrap()
    }

    fn api_key(service: &AuthorizationService, signer: &PrivateKeySigner, url: &str) -> String {
        sign_prehash(signer, &service.api_key_signing_hash(url)).unwrap()
    }

    fn withdraw_request(destination: &str) -> WithdrawRequest {
        WithdrawRequest {
            destination: Some(destination.to_string()),
            assets: Some(vec![WithdrawAsset {
                asset: Some(format!("{:#x}", Address::repeat_byte(0xaa))),
                amount: Some("1000000".into()),
            }]),
        }
    }

    #[test]
    fn recovers_signer_of_api_key() {
        let service = service();
        let user = user();
        let key = api_key(&service, &user, "https://broker.example.com");

        let recovered = service
            .recover_address(&key, "https://broker.example.com")
            .unwrap();
        assert_eq!(recovered, user.address());
    }

    #[test]
    fn key_for_other_url_recovers_other_address() {
        let service = service();
        let user = user();
        let key = api_key(&service, &user, "https://broker.example.com");

        let recovered = service
            .recover_address(&key, "https://evil.example.com")
            .unwrap_or_default();
        assert_ne!(recovered, user.address());
    }

    #[test]
    fn malformed_key_is_rejected() {
        let service = service();
        assert!(matches!(
            service.recover_address("not-hex", "https://x"),
            Err(AuthError::MalformedApiKey)
        ));
        assert!(matches!(
            service.recover_address("0x1234", "https://x"),
            Err(AuthError::MalformedApiKey)
        ));
    }

    #[test]
    fn authenticate_uses_host_header() {
        let service = service();
        let user = user();
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("localhost:3000"));
        headers.insert(
            headers::API_KEY_HEADER,
            HeaderValue::from_str(&api_key(&service, &user, "http://localhost:3000")).unwrap(),
        );

        assert_eq!(service.authenticate(&headers).unwrap(), user.address());
    }

    #[test]
    fn withdrawal_destination_is_case_insensitive() {
        let service = service();
        let caller = user().address();
        let upper = format!("0x{}", alloy::hex::encode(caller).to_uppercase());
        let lower = format!("{caller:#x}");

        assert!(service.authorize_withdrawal(caller, &withdraw_request(&upper), 1).is_ok());
        assert!(service.authorize_withdrawal(caller, &withdraw_request(&lower), 2).is_ok());
    }

    #[test]
    fn withdrawal_to_other_address_is_rejected() {
        let service = service();
        let caller = user().address();
        let other = format!("{:#x}", Address::repeat_byte(0x33));

        assert!(matches!(
            service.authorize_withdrawal(caller, &withdraw_request(&other), 1),
            Err(AuthError::DestinationMismatch)
        ));
    }

    #[test]
    fn withdrawal_requires_destination_and_assets() {
        let service = service();
        let caller = user().address();

        let mut request = withdraw_request(&format!("{caller:#x}"));
        request.assets = Some(vec![]);
        assert!(matches!(
            service.authorize_withdrawal(caller, &request, 1),
            Err(AuthError::MissingAssets)
        ));

        request.destination = None;
        assert!(matches!(
            service.authorize_withdrawal(caller, &request, 1),
            Err(AuthError::MissingDestination)
        ));
    }

    #[test]
    fn withdrawal_rejects_symbol_assets() {
        let service = service();
        let caller = user().address();
        let mut request = withdraw_request(&format!("{caller:#x}"));
        request.assets = Some(vec![WithdrawAsset {
            asset: Some("USDT".to_string()),
            amount: Some("1".into()),
        }]);

        assert!(matches!(
            service.authorize_withdrawal(caller, &request, 1),
            Err(AuthError::InvalidWithdrawal(_))
        ));
    }

    #[test]
    fn withdrawal_signature_is_from_broker() {
        let service = service();
        let caller = user().address();
        let auth = service
            .authorize_withdrawal(caller, &withdraw_request(&format!("{caller:#x}")), 77)
            .unwrap();

        assert_eq!(auth.rid, rid_hash(77).to_string());
        assert!(auth.expire > Utc::now().timestamp_millis() as u64);

        let payload = custody::Withdrawal {
            rid: rid_hash(77),
            expire: U256::from(auth.expire),
            destination: caller,
            assets: vec![custody::Asset {
                asset: Address::repeat_byte(0xaa),
                amount: U256::from(1_000_000u64),
            }],
        };
        let bytes = alloy::hex::decode(&auth.signature).unwrap();
        let signature = Signature::try_from(bytes.as_slice()).unwrap();
        let signer = signature
            .recover_address_from_prehash(&service.withdrawal_signing_hash(&payload))
            .unwrap();
        assert_eq!(signer, service.broker_address());
    }

    #[test]
    fn huge_timeout_saturates_expiry() {
        let domain = typed_data_domain("opendax", "1", 31337, Address::repeat_byte(0xcc));
        let broker = PrivateKeySigner::from_bytes(&B256::repeat_byte(0x11)).unwrap();
        let service = AuthorizationService::new(domain, broker, Duration::from_millis(u64::MAX));
        let caller = user().address();

        let auth = service
            .authorize_withdrawal(caller, &withdraw_request(&format!("{caller:#x}")), 1)
            .unwrap();
        assert_eq!(auth.expire, u64::MAX);

        let service = AuthorizationService::new(
            typed_data_domain("opendax", "1", 31337, Address::repeat_byte(0xcc)),
            PrivateKeySigner::from_bytes(&B256::repeat_byte(0x11)).unwrap(),
            Duration::MAX,
        );
        let auth = service
            .authorize_withdrawal(caller, &withdraw_request(&format!("{caller:#x}")), 2)
            .unwrap();
        assert_eq!(auth.expire, u64::MAX);
    }

    #[test]
    fn broker_signs_like_any_local_signer() {
        let service = service();
        let hash = service.api_key_signing_hash("https://x");
        let direct = service.broker.sign_hash_sync(&hash).unwrap();
        assert_eq!(
            alloy::hex::encode_prefixed(direct.as_bytes()),
            sign_prehash(&service.broker, &hash).unwrap()
        );
    }
}
