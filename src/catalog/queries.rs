//! Database queries for catalog data.
//!
//! Reads the catalog_* tables (destinations, vehicles, driver tiers, extras,
//! insurance plans, delivery options, packages) plus the single-row
//! commission_settings table. All rows are admin-managed; this service never
//! writes them.

use sqlx::PgPool;

use crate::error::AppError;

use super::models::{
    CatalogSnapshot, CommissionTable, DeliveryOption, Destination, DriverTier, Extra, FlowKind,
    InsurancePlan, TourPackage, Vehicle,
};

/// Get all active destinations in display order
pub async fn get_destinations(pool: &PgPool) -> Result<Vec<Destination>, AppError> {
    let destinations = sqlx::query_as::<_, Destination>(
        r#"
        SELECT id, name, region, category, duration_hours, entrance_fee, is_popular
        FROM catalog_destinations
        WHERE active = true
        ORDER BY sort_order, name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(destinations)
}

/// Get active vehicles for one flow
pub async fn get_vehicles(pool: &PgPool, flow: FlowKind) -> Result<Vec<Vehicle>, AppError> {
    let vehicles = sqlx::query_as::<_, Vehicle>(
        r#"
        SELECT
            id, name, category, max_passengers,
            price_per_day, price_per_half_day,
            with_driver_price_per_day, security_deposit
        FROM catalog_vehicles
        WHERE flow = $1
          AND active = true
        ORDER BY price_per_day, name
        "#,
    )
    .bind(flow)
    .fetch_all(pool)
    .await?;

    Ok(vehicles)
}

/// Get all driver tiers, cheapest first
pub async fn get_driver_tiers(pool: &PgPool) -> Result<Vec<DriverTier>, AppError> {
    let tiers = sqlx::query_as::<_, DriverTier>(
        r#"
        SELECT id, name, price_per_day, recommended
        FROM catalog_driver_tiers
        WHERE active = true
        ORDER BY price_per_day
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(tiers)
}

/// Get active extras / add-on services for one flow
pub async fn get_extras(pool: &PgPool, flow: FlowKind) -> Result<Vec<Extra>, AppError> {
    let extras = sqlx::query_as::<_, Extra>(
        r#"
        SELECT id, name, price, price_type
        FROM catalog_extras
        WHERE flow = $1
          AND active = true
        ORDER BY sort_order, name
        "#,
    )
    .bind(flow)
    .fetch_all(pool)
    .await?;

    Ok(extras)
}

/// Get insurance plans, cheapest first
pub async fn get_insurance_plans(pool: &PgPool) -> Result<Vec<InsurancePlan>, AppError> {
    let plans = sqlx::query_as::<_, InsurancePlan>(
        r#"
        SELECT id, name, price_per_day, deductible, coverage, recommended
        FROM catalog_insurance_plans
        WHERE active = true
        ORDER BY price_per_day
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(plans)
}

/// Get delivery options, self-pickup (free) first
pub async fn get_delivery_options(pool: &PgPool) -> Result<Vec<DeliveryOption>, AppError> {
    let options = sqlx::query_as::<_, DeliveryOption>(
        r#"
        SELECT id, name, price, estimated_time, requires_address
        FROM catalog_delivery_options
        WHERE active = true
        ORDER BY price, name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(options)
}

/// Get curated tour packages
pub async fn get_packages(pool: &PgPool) -> Result<Vec<TourPackage>, AppError> {
    let packages = sqlx::query_as::<_, TourPackage>(
        r#"
        SELECT id, name, duration_days, destinations, starting_price, is_featured
        FROM catalog_packages
        WHERE active = true
        ORDER BY sort_order, name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(packages)
}

/// Get the commission table. The table holds a single row; a missing row
/// falls back to the built-in defaults.
pub async fn get_commission_table(pool: &PgPool) -> Result<CommissionTable, AppError> {
    let table = sqlx::query_as::<_, CommissionTable>(
        r#"
        SELECT rental_pct, insurance_pct, addon_pct
        FROM commission_settings
        ORDER BY updated_at DESC
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?;

    Ok(table.unwrap_or_default())
}

/// Load the full catalog snapshot for one flow.
///
/// Tour snapshots carry destinations, driver tiers and packages; rental
/// snapshots carry insurance plans and delivery options. Both carry vehicles,
/// extras and the commission table.
pub async fn load_catalog(pool: &PgPool, flow: FlowKind) -> Result<CatalogSnapshot, AppError> {
    let vehicles = get_vehicles(pool, flow).await?;
    let extras = get_extras(pool, flow).await?;
    let commissions = get_commission_table(pool).await?;

    let snapshot = match flow {
        FlowKind::Tour => CatalogSnapshot {
            flow,
            destinations: get_destinations(pool).await?,
            vehicles,
            drivers: get_driver_tiers(pool).await?,
            extras,
            insurance_plans: Vec::new(),
            delivery_options: Vec::new(),
            packages: get_packages(pool).await?,
            commissions,
        },
        FlowKind::Rental => CatalogSnapshot {
            flow,
            destinations: Vec::new(),
            vehicles,
            drivers: Vec::new(),
            extras,
            insurance_plans: get_insurance_plans(pool).await?,
            delivery_options: get_delivery_options(pool).await?,
            packages: Vec::new(),
            commissions,
        },
    };

    Ok(snapshot)
}
