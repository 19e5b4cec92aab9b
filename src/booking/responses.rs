//! Response DTOs for booking API endpoints.
//!
//! Monetary values are serialized as strings, matching the stored payload.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::booking::calculators::{CommissionBreakdown, PricingSnapshot};
use crate::booking::models::BookingRecord;
use crate::booking::services::QuoteOutcome;
use crate::booking::steps::{Requirement, StepId};
use crate::catalog::models::{
    CatalogSnapshot, CommissionTable, DeliveryOption, Destination, DriverTier, Extra,
    ExtraPriceType, FlowKind, InsurancePlan, TourPackage, Vehicle,
};

/// Priced draft, with the platform/supplier split for rental flows
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub snapshot: PricingSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<CommissionBreakdown>,
}

impl From<QuoteOutcome> for QuoteResponse {
    fn from(outcome: QuoteOutcome) -> Self {
        Self {
            snapshot: outcome.snapshot,
            breakdown: outcome.breakdown,
        }
    }
}

/// One step's gate verdict
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepReportResponse {
    pub id: StepId,
    pub title: &'static str,
    pub ok: bool,
    pub missing: Vec<Requirement>,
}

/// Gate verdicts for every step of the draft's flow
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepCheckResponse {
    pub flow: FlowKind,
    pub steps: Vec<StepReportResponse>,
    /// True when every gate passes and the draft could be submitted.
    pub ready: bool,
}

/// Confirmation returned by a successful submission
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub reference: String,
    pub status: String,
    pub payment_status: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub voucher_qr: String,
}

impl SubmissionResponse {
    pub fn from_record(record: &BookingRecord, voucher_qr: String) -> Self {
        Self {
            reference: record.reference.clone(),
            status: record.status.clone(),
            payment_status: record.payment_status.clone(),
            total: record.total,
            currency: record.currency.clone(),
            created_at: record.created_at,
            voucher_qr,
        }
    }
}

/// A stored booking, as returned by the lookup endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub reference: String,
    pub flow: FlowKind,
    pub status: String,
    pub payment_status: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub voucher_qr: String,
    /// The frozen submission document, exactly as stored.
    pub payload: serde_json::Value,
}

impl BookingResponse {
    pub fn from_record(record: &BookingRecord, voucher_qr: String) -> Self {
        Self {
            reference: record.reference.clone(),
            flow: record.flow,
            status: record.status.clone(),
            payment_status: record.payment_status.clone(),
            total: record.total,
            currency: record.currency.clone(),
            created_at: record.created_at,
            voucher_qr,
            payload: record.payload.clone(),
        }
    }
}

// ==================== catalog DTOs ====================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationResponse {
    pub id: String,
    pub name: String,
    pub region: String,
    pub category: String,
    pub duration_hours: i32,
    #[serde(with = "rust_decimal::serde::str")]
    pub entrance_fee: Decimal,
    pub is_popular: bool,
}

impl From<&Destination> for DestinationResponse {
    fn from(d: &Destination) -> Self {
        Self {
            id: d.id.clone(),
            name: d.name.clone(),
            region: d.region.clone(),
            category: d.category.clone(),
            duration_hours: d.duration_hours,
            entrance_fee: d.entrance_fee,
            is_popular: d.is_popular,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleResponse {
    pub id: String,
    pub name: String,
    pub category: String,
    pub max_passengers: i32,
    #[serde(with = "rust_decimal::serde::str")]
    pub price_per_day: Decimal,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub price_per_half_day: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub with_driver_price_per_day: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub security_deposit: Option<Decimal>,
}

impl From<&Vehicle> for VehicleResponse {
    fn from(v: &Vehicle) -> Self {
        Self {
            id: v.id.clone(),
            name: v.name.clone(),
            category: v.category.clone(),
            max_passengers: v.max_passengers,
            price_per_day: v.price_per_day,
            price_per_half_day: v.price_per_half_day,
            with_driver_price_per_day: v.with_driver_price_per_day,
            security_deposit: v.security_deposit,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverTierResponse {
    pub id: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price_per_day: Decimal,
    pub recommended: bool,
}

impl From<&DriverTier> for DriverTierResponse {
    fn from(d: &DriverTier) -> Self {
        Self {
            id: d.id.clone(),
            name: d.name.clone(),
            price_per_day: d.price_per_day,
            recommended: d.recommended,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraResponse {
    pub id: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    pub price_type: ExtraPriceType,
}

impl From<&Extra> for ExtraResponse {
    fn from(e: &Extra) -> Self {
        Self {
            id: e.id.clone(),
            name: e.name.clone(),
            price: e.price,
            price_type: e.price_type,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsurancePlanResponse {
    pub id: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price_per_day: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub deductible: Decimal,
    pub coverage: Vec<String>,
    pub recommended: bool,
}

impl From<&InsurancePlan> for InsurancePlanResponse {
    fn from(p: &InsurancePlan) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            price_per_day: p.price_per_day,
            deductible: p.deductible,
            coverage: p.coverage.clone(),
            recommended: p.recommended,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryOptionResponse {
    pub id: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    pub estimated_time: Option<String>,
    pub requires_address: bool,
}

impl From<&DeliveryOption> for DeliveryOptionResponse {
    fn from(o: &DeliveryOption) -> Self {
        Self {
            id: o.id.clone(),
            name: o.name.clone(),
            price: o.price,
            estimated_time: o.estimated_time.clone(),
            requires_address: o.requires_address,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TourPackageResponse {
    pub id: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub duration_days: Decimal,
    pub destinations: Vec<String>,
    #[serde(with = "rust_decimal::serde::str")]
    pub starting_price: Decimal,
    pub is_featured: bool,
}

impl From<&TourPackage> for TourPackageResponse {
    fn from(p: &TourPackage) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            duration_days: p.duration_days,
            destinations: p.destinations.clone(),
            starting_price: p.starting_price,
            is_featured: p.is_featured,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionTableResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub rental_pct: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub insurance_pct: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub addon_pct: Decimal,
}

impl From<&CommissionTable> for CommissionTableResponse {
    fn from(t: &CommissionTable) -> Self {
        Self {
            rental_pct: t.rental_pct,
            insurance_pct: t.insurance_pct,
            addon_pct: t.addon_pct,
        }
    }
}

/// The flow's catalog, optionally narrowed by seats and category
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogResponse {
    pub flow: FlowKind,
    pub destinations: Vec<DestinationResponse>,
    pub vehicles: Vec<VehicleResponse>,
    pub drivers: Vec<DriverTierResponse>,
    pub extras: Vec<ExtraResponse>,
    pub insurance_plans: Vec<InsurancePlanResponse>,
    pub delivery_options: Vec<DeliveryOptionResponse>,
    pub packages: Vec<TourPackageResponse>,
    pub commissions: CommissionTableResponse,
}

impl CatalogResponse {
    pub fn from_snapshot(
        snapshot: &CatalogSnapshot,
        seats: Option<u32>,
        category: Option<&str>,
    ) -> Self {
        let vehicles = match seats {
            Some(seats) => snapshot.vehicles_with_capacity(seats),
            None => snapshot.vehicles.iter().collect(),
        };

        Self {
            flow: snapshot.flow,
            destinations: snapshot
                .destinations_in(category)
                .into_iter()
                .map(Into::into)
                .collect(),
            vehicles: vehicles.into_iter().map(Into::into).collect(),
            drivers: snapshot.drivers.iter().map(Into::into).collect(),
            extras: snapshot.extras.iter().map(Into::into).collect(),
            insurance_plans: snapshot.insurance_plans.iter().map(Into::into).collect(),
            delivery_options: snapshot.delivery_options.iter().map(Into::into).collect(),
            packages: snapshot.packages.iter().map(Into::into).collect(),
            commissions: (&snapshot.commissions).into(),
        }
    }
}
