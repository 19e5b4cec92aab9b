//! Stored booking shapes.
//!
//! A booking is persisted as a narrow row (reference, flow, status, totals)
//! plus a JSONB payload holding the full submission document. The payload is
//! written once at submission time and never edited afterwards, so the quoted
//! price survives later catalog changes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::booking::calculators::PricingSnapshot;
use crate::booking::draft::{
    BookingMode, Contact, Draft, ExtraSelection, Passengers, PaymentMethod, Schedule,
};
use crate::catalog::models::FlowKind;

/// New bookings start out awaiting operator review.
pub const STATUS_PENDING: &str = "pending";
/// Payment is collected out of band, so it starts unpaid too.
pub const PAYMENT_STATUS_PENDING: &str = "pending";

/// A persisted booking row.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    pub id: Uuid,
    pub reference: String,
    pub flow: FlowKind,
    pub status: String,
    pub payment_status: String,
    pub payload: serde_json::Value,
    pub total: Decimal,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

/// Everything the customer chose, flattened out of the draft for storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selections {
    pub mode: BookingMode,
    pub package_id: Option<String>,
    pub destinations: Vec<String>,
    pub vehicle_id: Option<String>,
    pub driver_id: Option<String>,
    pub extras: Vec<ExtraSelection>,
    pub insurance_id: Option<String>,
    pub delivery_id: Option<String>,
    pub delivery_address: String,
    pub special_requests: String,
    pub dietary_requirements: String,
}

/// The document handed to the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub selections: Selections,
    pub schedule: Schedule,
    pub passengers: Passengers,
    pub contact: Contact,
    pub pricing_snapshot: PricingSnapshot,
    pub payment_method: PaymentMethod,
    pub status: String,
    pub payment_status: String,
    pub created_at: DateTime<Utc>,
}

impl SubmissionPayload {
    /// Freeze a draft and its priced snapshot into the stored document.
    pub fn assemble(draft: &Draft, snapshot: PricingSnapshot, created_at: DateTime<Utc>) -> Self {
        Self {
            selections: Selections {
                mode: draft.mode,
                package_id: draft.package_id.clone(),
                destinations: draft.destinations.clone(),
                vehicle_id: draft.vehicle_id.clone(),
                driver_id: draft.driver_id.clone(),
                extras: draft.extras.clone(),
                insurance_id: draft.insurance_id.clone(),
                delivery_id: draft.delivery_id.clone(),
                delivery_address: draft.delivery_address.clone(),
                special_requests: draft.special_requests.clone(),
                dietary_requirements: draft.dietary_requirements.clone(),
            },
            schedule: draft.schedule.clone(),
            passengers: draft.passengers,
            contact: draft.contact.clone(),
            pricing_snapshot: snapshot,
            payment_method: draft.payment_method,
            status: STATUS_PENDING.to_string(),
            payment_status: PAYMENT_STATUS_PENDING.to_string(),
            created_at,
        }
    }
}

/// Input to the booking store; the store allocates id and reference.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub flow: FlowKind,
    pub payload: SubmissionPayload,
    pub total: Decimal,
    pub currency: String,
}
