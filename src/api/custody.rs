// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `/api/custody/{route}`: one endpoint multiplexing every custody operation.
//!
//! | Route | Method | Auth | Effect |
//! |-------|--------|------|--------|
//! | `withdraw` | POST | yes | broker-signed withdrawal authorization |
//! | `balances` | GET | yes | refresh from chain, per-asset report |
//! | `create_order` | POST | yes | refresh from chain, open an order |
//! | `cancel_order` | POST | yes | drop an open order |
//! | `execute_order` | POST | yes | drop an open order, book PnL |
//! | `open_orders` | GET | yes | list open orders |
//! | `rid` | GET | no | current correlation counter |

use std::{fmt, str::FromStr};

use alloy::primitives::{Address, U256};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, Method},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

use crate::{
    error::ApiError,
    ledger::{AccountHandle, Asset, LedgerError, NewOrder, Price, Side},
    models::{
        BalancesResponse, CreateOrderRequest, OrderIdRequest, OrderResponse, WithdrawRequest,
    },
    state::AppState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Withdraw,
    Balances,
    CreateOrder,
    CancelOrder,
    ExecuteOrder,
    OpenOrders,
    Rid,
}

impl Route {
    pub fn method(self) -> Method {
        match self {
            Route::Balances | Route::OpenOrders | Route::Rid => Method::GET,
            Route::Withdraw | Route::CreateOrder | Route::CancelOrder | Route::ExecuteOrder => {
                Method::POST
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Route::Withdraw => "withdraw",
            Route::Balances => "balances",
            Route::CreateOrder => "create_order",
            Route::CancelOrder => "cancel_order",
            Route::ExecuteOrder => "execute_order",
            Route::OpenOrders => "open_orders",
            Route::Rid => "rid",
        }
    }
}

impl FromStr for Route {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "withdraw" => Ok(Route::Withdraw),
            "balances" => Ok(Route::Balances),
            "create_order" => Ok(Route::CreateOrder),
            "cancel_order" => Ok(Route::CancelOrder),
            "execute_order" => Ok(Route::ExecuteOrder),
            "open_orders" => Ok(Route::OpenOrders),
            "rid" => Ok(Route::Rid),
            other => Err(ApiError::not_found(format!("unknown route: {other}"))),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[utoipa::path(
    method(get, post),
    path = "/api/custody/{route}",
    params(
        ("route" = String, Path, description = "withdraw | balances | create_order | cancel_order | execute_order | open_orders | rid"),
        ("x-custody-api-key" = Option<String>, Header, description = "EIP-712 signature of the broker URL; required for every route except rid")
    ),
    request_body(
        content = String,
        description = "JSON body: WithdrawRequest, CreateOrderRequest or OrderIdRequest; empty for GET routes",
        content_type = "application/json"
    ),
    tag = "Custody",
    responses(
        (status = 200, description = "Route result: WithdrawalAuthorization, BalancesResponse, OrderResponse, [OrderResponse] or the rid counter"),
        (status = 400, description = "Validation, authentication or business-rule failure"),
        (status = 404, description = "Unknown route"),
        (status = 405, description = "Wrong method for the route"),
        (status = 500, description = "Chain or internal failure")
    )
)]
pub async fn dispatch(
    State(state): State<AppState>,
    Path(route): Path<String>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let route: Route = route.parse()?;
    if method != route.method() {
        return Err(ApiError::method_not_allowed(
            route.method(),
            format!("{route} expects {}", route.method()),
        ));
    }
    let rid = state.rid.next();

    match route {
        Route::Rid => Ok(Json(rid).into_response()),
        Route::Withdraw => {
            let (address, _) = authenticate(&state, &headers, route, rid).await?;
            let request: WithdrawRequest = parse_body(&body)?;
            let authorization = state.auth.authorize_withdrawal(address, &request, rid)?;
            Ok(Json(authorization).into_response())
        }
        Route::Balances => {
            let (_, account) = authenticate(&state, &headers, route, rid).await?;
            let mut account = account.lock().await;
            account
                .ensure_fresh(&state.reader, state.history_max_age)
                .await?;
            let report: BalancesResponse = account
                .report_balances()?
                .into_iter()
                .map(|(asset, figures)| (asset.to_string(), figures))
                .collect();
            Ok(Json(report).into_response())
        }
        Route::CreateOrder => {
            let (_, account) = authenticate(&state, &headers, route, rid).await?;
            let order = new_order(parse_body(&body)?)?;
            let mut account = account.lock().await;
            account
                .ensure_fresh(&state.reader, state.history_max_age)
                .await?;
            let created = account.create_order(order)?;
            Ok(Json(OrderResponse::from(created)).into_response())
        }
        Route::CancelOrder => {
            let (_, account) = authenticate(&state, &headers, route, rid).await?;
            let id = order_id(parse_body(&body)?)?;
            let cancelled = account.lock().await.cancel_order(&id)?;
            Ok(Json(OrderResponse::from(cancelled)).into_response())
        }
        Route::ExecuteOrder => {
            let (_, account) = authenticate(&state, &headers, route, rid).await?;
            let id = order_id(parse_body(&body)?)?;
            let executed = account.lock().await.execute_order(&id)?;
            Ok(Json(OrderResponse::from(executed)).into_response())
        }
        Route::OpenOrders => {
            let (_, account) = authenticate(&state, &headers, route, rid).await?;
            let orders: Vec<OrderResponse> = account
                .lock()
                .await
                .open_orders()
                .iter()
                .map(OrderResponse::from)
                .collect();
            Ok(Json(orders).into_response())
        }
    }
}

/// Recover the caller and make sure it has an account.
async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
    route: Route,
    rid: u64,
) -> Result<(Address, AccountHandle), ApiError> {
    let address = state.auth.authenticate(headers)?;
    tracing::debug!(route = %route, address = %address, rid, "Custody request");
    let account = state.directory.get_or_create(address).await;
    Ok((address, account))
}

/// JSON body, with an empty body read as `{}`.
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::bad_request(format!("invalid JSON body: {e}")))
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, ApiError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::bad_request(format!("{field} is missing")))
}

fn new_order(request: CreateOrderRequest) -> Result<NewOrder, ApiError> {
    let base = required(request.base.as_deref(), "base")?;
    let quote = required(request.quote.as_deref(), "quote")?;
    let side = required(request.side.as_deref(), "side")?;
    let amount = required(request.amount.as_ref().and_then(|a| a.non_empty()), "amount")?;
    let price = required(request.price.as_ref().and_then(|p| p.non_empty()), "price")?;

    let side: Side = side.parse()?;
    let amount =
        U256::from_str(amount).map_err(|_| LedgerError::InvalidAmount(amount.to_string()))?;
    let price: Price = price.parse()?;

    Ok(NewOrder::new(
        Asset::new(base),
        Asset::new(quote),
        side,
        amount,
        price,
    )?)
}

fn order_id(request: OrderIdRequest) -> Result<String, ApiError> {
    required(request.id.as_deref(), "id").map(str::to_string)
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use alloy::{primitives::B256, signers::local::PrivateKeySigner};
    use axum::{
        body::{to_bytes, Body},
        http::{
            header::{CONTENT_TYPE, HOST},
            Request, StatusCode,
        },
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::{
        auth::{typed_data_domain, AuthorizationService, API_KEY_HEADER},
        blockchain::{
            memory::MemoryEventSource, sign_prehash, ChainEventReader, Event, EventKind,
        },
    };

    const HOST_NAME: &str = "localhost:3000";
    const BROKER_URL: &str = "http://localhost:3000";

    struct TestApp {
        router: Router,
        state: AppState,
        source: Arc<MemoryEventSource>,
        user: PrivateKeySigner,
        api_key: String,
    }

    fn test_app() -> TestApp {
        let source = Arc::new(MemoryEventSource::new());
        let reader = ChainEventReader::new(source.clone(), Duration::from_secs(1));
        let domain = typed_data_domain("opendax", "1", 31337, Address::repeat_byte(0xcc));
        let broker = PrivateKeySigner::from_bytes(&B256::repeat_byte(0x11)).unwrap();
        let auth = AuthorizationService::new(domain, broker, Duration::from_secs(3600));
        let state = AppState::new(reader, auth, Duration::ZERO);

        let user = PrivateKeySigner::from_bytes(&B256::repeat_byte(0x22)).unwrap();
        let api_key = sign_prehash(&user, &state.auth.api_key_signing_hash(BROKER_URL)).unwrap();

        TestApp {
            router: crate::api::router(state.clone()),
            state,
            source,
            user,
            api_key,
        }
    }

    impl TestApp {
        fn deposit(&self, id: u64, asset: &str, amount: u64) {
            self.source.push(
                self.user.address(),
                Event {
                    event: EventKind::Deposited,
                    id: U256::from(id),
                    asset: Asset::new(asset),
                    amount: U256::from(amount),
                    rid: None,
                },
            );
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, body)
        }

        async fn call(&self, method: Method, route: &str, body: Option<Value>) -> (StatusCode, Value) {
            let builder = Request::builder()
                .method(method)
                .uri(format!("/api/custody/{route}"))
                .header(HOST, HOST_NAME)
                .header(API_KEY_HEADER, &self.api_key);
            let request = match body {
                Some(body) => builder
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string())),
                None => builder.body(Body::empty()),
            };
            self.send(request.unwrap()).await
        }

        async fn open_orders(&self) -> Vec<Value> {
            let (status, body) = self.call(Method::GET, "open_orders", None).await;
            assert_eq!(status, StatusCode::OK);
            body.as_array().unwrap().clone()
        }
    }

    #[tokio::test]
    async fn sell_then_execute_books_pnl() {
        let app = test_app();
        app.deposit(1, "BTC", 2);

        let (status, order) = app
            .call(
                Method::POST,
                "create_order",
                Some(json!({"base": "BTC", "quote": "USDT", "side": "sell", "amount": "1", "price": "20000"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let id = order["id"].as_str().unwrap().to_string();
        assert_eq!(id.len(), 24);
        assert_eq!(order["amount"], "1");
        assert_eq!(order["price"], "20000");

        let open = app.open_orders().await;
        assert_eq!(open.len(), 1);
        assert_eq!(open[0]["id"], id.as_str());

        let (_, balances) = app.call(Method::GET, "balances", None).await;
        assert_eq!(balances["BTC"]["locked"], "1");
        assert_eq!(balances["BTC"]["available"], "1");

        let (status, executed) = app
            .call(Method::POST, "execute_order", Some(json!({ "id": id })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(executed["id"], id.as_str());
        assert!(app.open_orders().await.is_empty());

        let (status, balances) = app.call(Method::GET, "balances", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            balances["BTC"],
            json!({"balances": "2", "locked": "0", "pnl": "-1", "available": "1"})
        );
        assert_eq!(
            balances["USDT"],
            json!({"balances": "0", "locked": "0", "pnl": "20000", "available": "20000"})
        );
    }

    #[tokio::test]
    async fn insufficient_funds_leaves_book_unchanged() {
        let app = test_app();
        app.deposit(1, "USDT", 100);

        let (status, body) = app
            .call(
                Method::POST,
                "create_order",
                Some(json!({"base": "BTC", "quote": "USDT", "side": "buy", "amount": 1, "price": "150"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("CreateOrder: Insufficient quote currency"));
        assert!(app.open_orders().await.is_empty());
    }

    #[tokio::test]
    async fn open_orders_reduce_what_new_orders_may_use() {
        let app = test_app();
        app.deposit(1, "USDT", 100);
        let buy = json!({"base": "BTC", "quote": "USDT", "side": "buy", "amount": "1", "price": "60"});

        let (status, _) = app.call(Method::POST, "create_order", Some(buy.clone())).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = app.call(Method::POST, "create_order", Some(buy)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, balances) = app.call(Method::GET, "balances", None).await;
        assert_eq!(balances["USDT"]["locked"], "60");
        assert_eq!(balances["USDT"]["available"], "40");
    }

    #[tokio::test]
    async fn cancel_unknown_order_keeps_book() {
        let app = test_app();
        app.deposit(1, "BTC", 5);
        let (_, order) = app
            .call(
                Method::POST,
                "create_order",
                Some(json!({"base": "BTC", "quote": "USDT", "side": "sell", "amount": "2", "price": "1.5"})),
            )
            .await;

        let (status, body) = app
            .call(Method::POST, "cancel_order", Some(json!({"id": "nope"})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Order not found");
        assert_eq!(app.open_orders().await.len(), 1);

        let (status, cancelled) = app
            .call(Method::POST, "cancel_order", Some(json!({"id": order["id"]})))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cancelled["id"], order["id"]);
        assert!(app.open_orders().await.is_empty());

        let (_, balances) = app.call(Method::GET, "balances", None).await;
        assert_eq!(balances["BTC"]["pnl"], "0");
        assert_eq!(balances["BTC"]["available"], "5");
    }

    #[tokio::test]
    async fn execute_unknown_order_is_rejected() {
        let app = test_app();
        let (status, body) = app
            .call(Method::POST, "execute_order", Some(json!({"id": "nope"})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Order not found");

        let (status, body) = app.call(Method::POST, "execute_order", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "id is missing");
    }

    #[tokio::test]
    async fn create_order_names_missing_field() {
        let app = test_app();
        app.deposit(1, "BTC", 5);

        let cases = [
            (json!({}), "base is missing"),
            (json!({"base": "BTC"}), "quote is missing"),
            (json!({"base": "BTC", "quote": "USDT"}), "side is missing"),
            (json!({"base": "BTC", "quote": "USDT", "side": "sell"}), "amount is missing"),
            (
                json!({"base": "BTC", "quote": "USDT", "side": "sell", "amount": "1"}),
                "price is missing",
            ),
        ];
        for (body, message) in cases {
            let (status, response) = app.call(Method::POST, "create_order", Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(response["error"], message);
        }

        let (status, _) = app
            .call(
                Method::POST,
                "create_order",
                Some(json!({"base": "BTC", "quote": "USDT", "side": "hold", "amount": "1", "price": "1"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_body_is_rejected() {
        let app = test_app();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/custody/cancel_order")
            .header(HOST, HOST_NAME)
            .header(API_KEY_HEADER, &app.api_key)
            .body(Body::from("{not json"))
            .unwrap();

        let (status, body) = app.send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("invalid JSON body"));
    }

    #[tokio::test]
    async fn withdraw_accepts_destination_in_any_case() {
        let app = test_app();
        let upper = format!("0x{}", alloy::hex::encode(app.user.address()).to_uppercase());
        let asset = format!("{:#x}", Address::repeat_byte(0xaa));

        let (status, body) = app
            .call(
                Method::POST,
                "withdraw",
                Some(json!({"destination": upper, "assets": [{"asset": asset, "amount": "10"}]})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["rid"].as_str().unwrap().starts_with("0x"));
        assert!(body["expire"].as_u64().unwrap() > 0);
        assert_eq!(body["signature"].as_str().unwrap().len(), 132);
    }

    #[tokio::test]
    async fn withdraw_to_another_address_is_rejected() {
        let app = test_app();
        let asset = format!("{:#x}", Address::repeat_byte(0xaa));
        let other = format!("{:#x}", Address::repeat_byte(0x33));

        let (status, body) = app
            .call(
                Method::POST,
                "withdraw",
                Some(json!({"destination": other, "assets": [{"asset": asset, "amount": "10"}]})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid api-key");

        let (status, body) = app
            .call(Method::POST, "withdraw", Some(json!({"destination": other})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "assets is missing");
    }

    #[tokio::test]
    async fn missing_api_key_is_rejected() {
        let app = test_app();
        let request = Request::builder()
            .method(Method::GET)
            .uri("/api/custody/balances")
            .header(HOST, HOST_NAME)
            .body(Body::empty())
            .unwrap();

        let (status, body) = app.send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "x-custody-api-key is missing");
        assert!(app.state.directory.is_empty().await);
    }

    #[tokio::test]
    async fn authenticated_call_registers_account() {
        let app = test_app();
        app.call(Method::GET, "open_orders", None).await;

        assert_eq!(app.state.directory.len().await, 1);
        assert!(app.state.directory.get(&app.user.address()).await.is_some());
    }

    #[tokio::test]
    async fn rid_is_public_and_advances() {
        let app = test_app();
        let rid_request = || {
            Request::builder()
                .method(Method::GET)
                .uri("/api/custody/rid")
                .body(Body::empty())
                .unwrap()
        };

        let (status, first) = app.send(rid_request()).await;
        assert_eq!(status, StatusCode::OK);
        let (_, second) = app.send(rid_request()).await;
        assert!(second.as_u64().unwrap() > first.as_u64().unwrap());
    }

    #[tokio::test]
    async fn unknown_route_and_wrong_method() {
        let app = test_app();

        let (status, body) = app.call(Method::GET, "deposit", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "unknown route: deposit");

        let (status, _) = app.call(Method::GET, "create_order", None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn wrong_method_names_allowed_method() {
        let app = test_app();

        let response = app
            .router
            .clone()
            .oneshot(
                Request::get("/api/custody/create_order")
                    .header(HOST, HOST_NAME)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[axum::http::header::ALLOW], "POST");

        let response = app
            .router
            .clone()
            .oneshot(Request::post("/api/custody/balances").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[axum::http::header::ALLOW], "GET");
    }

    #[tokio::test]
    async fn oversized_order_amounts_are_validation_errors() {
        let app = test_app();
        app.deposit(1, "USDT", 100);
        app.deposit(2, "BTC", 2);
        let max = U256::MAX.to_string();

        let (status, body) = app
            .call(
                Method::POST,
                "create_order",
                Some(json!({"base": "BTC", "quote": "USDT", "side": "buy", "amount": max, "price": "2"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("invalid amount"));

        let (status, body) = app
            .call(
                Method::POST,
                "create_order",
                Some(json!({"base": "BTC", "quote": "USDT", "side": "sell", "amount": max, "price": "1"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("invalid amount"));

        assert!(app.open_orders().await.is_empty());
    }

    #[tokio::test]
    async fn chain_failure_is_internal_error() {
        let app = test_app();
        app.source.fail_kind(EventKind::Withdrawn);

        let (status, body) = app.call(Method::GET, "balances", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "internal error");
    }
}
