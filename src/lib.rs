//! Recharge Travels booking service.
//!
//! Axum web service behind the tour and vehicle-rental booking flows:
//! serves catalog data, prices drafts, checks step gates, and records
//! confirmed bookings in Postgres. Catalog snapshots and booking lookups
//! are cached in memory with moka.

pub mod booking;
pub mod cache;
pub mod catalog;
pub mod error;
pub mod routes;

use cache::AppCache;
use sqlx::PgPool;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache: AppCache,
}
