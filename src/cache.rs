//! In-memory caching using moka
//!
//! Caches catalog snapshots and booking lookups. Catalog rows change rarely
//! and only through the admin tooling, so moderate TTLs are safe; booking
//! records are immutable once written apart from status changes, so lookups
//! get a short TTL.

use moka::future::Cache;
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn};

use crate::booking::models::BookingRecord;
use crate::catalog::models::{CatalogSnapshot, FlowKind};
use crate::catalog::queries;

/// Application cache holding catalog snapshots and recent booking lookups
#[derive(Clone)]
pub struct AppCache {
    /// Catalog snapshots (flow -> CatalogSnapshot)
    pub catalogs: Cache<String, Arc<CatalogSnapshot>>,
    /// Booking records by reference
    pub bookings: Cache<String, Arc<BookingRecord>>,
}

impl AppCache {
    /// Create a new cache instance with configured TTLs
    pub fn new() -> Self {
        Self {
            // One snapshot per flow, 10 min TTL
            catalogs: Cache::builder()
                .max_capacity(4)
                .time_to_live(Duration::from_secs(10 * 60))
                .build(),

            // Booking lookups: 500 entries, 5 min TTL, 2 min idle
            bookings: Cache::builder()
                .max_capacity(500)
                .time_to_live(Duration::from_secs(5 * 60))
                .time_to_idle(Duration::from_secs(2 * 60))
                .build(),
        }
    }

    /// Get cache statistics for the health endpoint
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            catalogs_size: self.catalogs.entry_count(),
            bookings_size: self.bookings.entry_count(),
        }
    }

    /// Invalidate all caches
    pub fn invalidate_all(&self) {
        self.catalogs.invalidate_all();
        self.bookings.invalidate_all();
        info!("All caches invalidated");
    }

    /// Generate cache key for a flow's catalog snapshot
    pub fn catalog_key(flow: FlowKind) -> String {
        format!("catalog:{}", flow.as_str())
    }

    /// Generate cache key for a booking lookup
    pub fn booking_key(reference: &str) -> String {
        format!("booking:{}", reference)
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics for the health endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub catalogs_size: u64,
    pub bookings_size: u64,
}

/// Start background cache warmer
///
/// Warms both flows' catalog snapshots on startup and refreshes every
/// 10 minutes.
pub async fn start_cache_warmer(cache: AppCache, db: PgPool) {
    // Initial warm-up
    warm_cache(&cache, &db).await;

    // Periodic refresh every 10 minutes
    let mut interval = interval(Duration::from_secs(10 * 60));
    loop {
        interval.tick().await;
        warm_cache(&cache, &db).await;
    }
}

/// Warm the cache with both catalog snapshots
async fn warm_cache(cache: &AppCache, db: &PgPool) {
    info!("Starting cache warm-up...");

    for flow in [FlowKind::Tour, FlowKind::Rental] {
        match queries::load_catalog(db, flow).await {
            Ok(snapshot) => {
                cache
                    .catalogs
                    .insert(AppCache::catalog_key(flow), Arc::new(snapshot))
                    .await;
            }
            Err(e) => warn!("Failed to warm {} catalog cache: {}", flow, e),
        }
    }

    info!("Cache warm-up complete. Stats: {:?}", cache.stats());
}
