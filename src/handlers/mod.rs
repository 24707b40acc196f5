//! HTTP request handlers and routing.
//!
//! Handlers decode the request, call the wallet service and encode the
//! result. Errors become JSON responses through `AppError`'s `IntoResponse`.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::services::wallet_service::WalletService;

/// Health check endpoint
pub mod health;
/// Wallet operation and balance endpoints
pub mod wallets;

/// Build the application router.
pub fn router(service: WalletService) -> Router {
    Router::new()
        // Public routes
        .route("/health", get(health::health_check))
        // Wallet routes
        .route("/api/v1/wallet", post(wallets::post_operation))
        .route("/api/v1/wallets/{id}", get(wallets::get_balance))
        .route("/api/v1/wallets/{id}/", get(wallets::get_balance))
        .route("/api/v1/wallets/", get(wallets::missing_wallet_id))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}
