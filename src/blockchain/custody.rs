// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Custody contract bindings: transfer events and the EIP-712 structs the
//! contract and the front-end SDK sign over.

use alloy::sol;

sol! {
    interface ICustody {
        event Deposited(uint256 indexed id, address indexed account, address asset, uint256 amount);
        event Withdrawn(uint256 indexed id, address indexed account, address asset, uint256 amount, bytes32 rid);
    }
}

sol! {
    /// API key: the user signs the host URL the key is issued for.
    #[derive(Debug)]
    struct ApiKey {
        string url;
    }

    #[derive(Debug)]
    struct Asset {
        address asset;
        uint256 amount;
    }

    /// Broker-signed withdrawal redeemable on the custody contract.
    #[derive(Debug)]
    struct Withdrawal {
        bytes32 rid;
        uint256 expire;
        address destination;
        Asset[] assets;
    }
}
