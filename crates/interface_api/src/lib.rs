//! HTTP API Layer
//!
//! REST surface of the ledger service, built on Axum.
//!
//! # Routes
//!
//! - `GET  /health`, `GET /health/ready`
//! - `GET  /bankService/allAccounts`
//! - `POST /bankService/transferMoney` (form: `fromAccount`, `toAccount`, `amount`)
//! - `GET  /bankService/accounts/:id`
//! - `GET  /bankService/journal`
//!
//! Every request gets an `x-request-id` (generated unless the client sent
//! one), is traced by `TraceLayer` and logged by the audit middleware.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(service);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use domain_ledger::LedgerService;

use crate::handlers::{accounts, health};
use crate::middleware::audit_middleware;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<LedgerService>,
}

/// Creates the main API router
pub fn create_router(service: LedgerService) -> Router {
    let state = AppState {
        service: Arc::new(service),
    };

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let bank_routes = Router::new()
        .route("/allAccounts", get(accounts::all_accounts))
        .route("/transferMoney", post(accounts::transfer_money))
        .route("/accounts/:id", get(accounts::get_account))
        .route("/journal", get(accounts::journal))
        .layer(axum_middleware::from_fn(audit_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/bankService", bank_routes)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
