//! HTTP route handlers

pub mod booking;
pub mod catalog;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

/// Assemble the API router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/quote", post(booking::quote))
        .route("/api/quote/split", post(booking::split))
        .route("/api/steps/check", post(booking::check_steps))
        .route("/api/bookings", post(booking::submit))
        .route("/api/bookings/:reference", get(booking::lookup))
        .route("/api/catalog/:flow", get(catalog::show))
        .route("/api/health", get(catalog::health))
}
