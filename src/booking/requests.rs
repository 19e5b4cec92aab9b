//! Request DTOs for booking API endpoints.

use serde::Deserialize;

use crate::booking::calculators::PricingSnapshot;
use crate::booking::draft::Draft;
use crate::catalog::models::CommissionTable;

/// Request to price a draft
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub draft: Draft,
}

/// Request to split an already-priced snapshot between platform and supplier
#[derive(Debug, Deserialize)]
pub struct SplitRequest {
    pub snapshot: PricingSnapshot,
    /// Explicit percentages; defaults to the published commission settings.
    #[serde(default)]
    pub commissions: Option<CommissionTable>,
}

/// Request to run every step gate of the draft's flow
#[derive(Debug, Deserialize)]
pub struct StepCheckRequest {
    pub draft: Draft,
}

/// Request to submit a draft as a booking
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub draft: Draft,
}

/// Query filters for the catalog listing
#[derive(Debug, Default, Deserialize)]
pub struct CatalogFilter {
    /// Keep only vehicles with at least this many seats.
    #[serde(default)]
    pub seats: Option<u32>,
    /// Keep only destinations in this category.
    #[serde(default)]
    pub category: Option<String>,
}
