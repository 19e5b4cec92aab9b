//! Catalog and service status handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};

use crate::booking::requests::CatalogFilter;
use crate::booking::responses::CatalogResponse;
use crate::catalog::models::FlowKind;
use crate::catalog::provider::get_catalog;
use crate::error::Result;
use crate::AppState;

/// Serve the catalog for one flow, optionally filtered by seat count
/// and destination category
pub async fn show(
    State(state): State<AppState>,
    Path(flow): Path<FlowKind>,
    Query(filter): Query<CatalogFilter>,
) -> Result<Json<CatalogResponse>> {
    let snapshot = get_catalog(&state.db, &state.cache, flow).await?;
    Ok(Json(CatalogResponse::from_snapshot(
        &snapshot,
        filter.seats,
        filter.category.as_deref(),
    )))
}

/// Liveness probe with cache statistics
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "cache": state.cache.stats(),
    }))
}
