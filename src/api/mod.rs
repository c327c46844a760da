// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{any, get},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    ledger::{BalanceReport, Side},
    models::{
        CreateOrderRequest, OrderIdRequest, OrderResponse, WithdrawAsset, WithdrawRequest,
        WithdrawalAuthorization,
    },
    state::AppState,
};

pub mod custody;
pub mod health;

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/api/custody/{route}", any(custody::dispatch))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        custody::dispatch,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            WithdrawRequest,
            WithdrawAsset,
            WithdrawalAuthorization,
            CreateOrderRequest,
            OrderIdRequest,
            OrderResponse,
            BalanceReport,
            Side,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Custody", description = "Balances, orders and withdrawal authorizations"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
