//! Cached catalog access.
//!
//! The calculators and step gates consume a `CatalogSnapshot` value; this
//! module is the only place that decides where snapshots come from
//! (cache first, then database).

use sqlx::PgPool;
use std::sync::Arc;
use tracing::debug;

use crate::cache::AppCache;
use crate::error::AppError;

use super::models::{CatalogSnapshot, FlowKind};
use super::queries;

/// Get the catalog snapshot for a flow, cache-through.
pub async fn get_catalog(
    pool: &PgPool,
    cache: &AppCache,
    flow: FlowKind,
) -> Result<Arc<CatalogSnapshot>, AppError> {
    let key = AppCache::catalog_key(flow);

    if let Some(snapshot) = cache.catalogs.get(&key).await {
        debug!("catalog cache hit: {}", key);
        return Ok(snapshot);
    }

    debug!("catalog cache miss: {}", key);
    let snapshot = Arc::new(queries::load_catalog(pool, flow).await?);
    cache.catalogs.insert(key, snapshot.clone()).await;

    Ok(snapshot)
}
