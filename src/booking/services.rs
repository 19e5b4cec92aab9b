//! Booking services: quoting, submission, and lookup.
//!
//! The pricing and gate logic stays pure; these functions wire it to the
//! catalog provider and the persistence store. `BookingSession` drives one
//! interactive booking attempt end to end, while `submit_draft` is the
//! one-shot path used by the HTTP API.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde_json::json;
use sqlx::PgPool;
use thiserror::Error;

use crate::booking::calculators::{self, CommissionBreakdown, PricingSnapshot};
use crate::booking::draft::{Draft, SelectionStore};
use crate::booking::models::{BookingRecord, NewBooking, SubmissionPayload};
use crate::booking::queries;
use crate::booking::steps::{flow_for, AdvanceOutcome, FlowController, GateReport, SubmitBlocked};
use crate::cache::AppCache;
use crate::catalog::models::{CatalogSnapshot, FlowKind};
use crate::catalog::provider::get_catalog;
use crate::error::AppError;

/// Where confirmed bookings go. Production uses Postgres; tests swap in an
/// in-memory store.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Allocate a reference and persist the booking under it.
    async fn create_booking(&self, booking: NewBooking) -> Result<BookingRecord, AppError>;

    async fn find_by_reference(&self, reference: &str) -> Result<Option<BookingRecord>, AppError>;
}

pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn create_booking(&self, booking: NewBooking) -> Result<BookingRecord, AppError> {
        let reference = queries::allocate_reference(&self.pool, booking.flow).await?;
        queries::insert_booking(&self.pool, &reference, &booking).await
    }

    async fn find_by_reference(&self, reference: &str) -> Result<Option<BookingRecord>, AppError> {
        queries::get_booking_by_reference(&self.pool, reference).await
    }
}

/// A priced draft, with the platform/supplier split for rental flows.
#[derive(Debug, Clone)]
pub struct QuoteOutcome {
    pub snapshot: PricingSnapshot,
    pub breakdown: Option<CommissionBreakdown>,
}

/// Price a draft against the flow's cached catalog.
pub async fn quote(pool: &PgPool, cache: &AppCache, draft: &Draft) -> Result<QuoteOutcome, AppError> {
    let catalog = get_catalog(pool, cache, draft.flow()).await?;
    Ok(quote_against(draft, &catalog))
}

/// Price a draft against an already-loaded catalog.
pub fn quote_against(draft: &Draft, catalog: &CatalogSnapshot) -> QuoteOutcome {
    let snapshot = calculators::price(draft, catalog);
    let breakdown = match draft.flow() {
        FlowKind::Rental => Some(calculators::split(&snapshot, &catalog.commissions)),
        FlowKind::Tour => None,
    };
    QuoteOutcome {
        snapshot,
        breakdown,
    }
}

/// Why a submission was refused or failed.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("submission attempted before the final step")]
    NotAtFinalStep,

    #[error("draft does not satisfy the flow's requirements")]
    Blocked(GateReport),

    #[error("a submission is already in flight")]
    InFlight,

    #[error("booking is already confirmed")]
    AlreadyConfirmed,

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<SubmitBlocked> for SubmitError {
    fn from(blocked: SubmitBlocked) -> Self {
        match blocked {
            SubmitBlocked::NotAtFinalStep => SubmitError::NotAtFinalStep,
            SubmitBlocked::Requirements(report) => SubmitError::Blocked(report),
            SubmitBlocked::AlreadyInFlight => SubmitError::InFlight,
            SubmitBlocked::AlreadyConfirmed => SubmitError::AlreadyConfirmed,
        }
    }
}

impl IntoResponse for SubmitError {
    fn into_response(self) -> Response {
        match self {
            SubmitError::Blocked(report) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "code": "draft_not_ready",
                    "message": "draft does not satisfy the flow's requirements",
                    "missing": report.missing,
                })),
            )
                .into_response(),
            SubmitError::Store(err) => err.into_response(),
            other => (
                StatusCode::CONFLICT,
                Json(json!({
                    "code": "submission_conflict",
                    "message": other.to_string(),
                })),
            )
                .into_response(),
        }
    }
}

/// Price the draft and freeze everything into a storable booking.
fn build_booking(draft: &Draft, catalog: &CatalogSnapshot) -> NewBooking {
    let snapshot = calculators::price(draft, catalog);
    let payload = SubmissionPayload::assemble(draft, snapshot, Utc::now());
    NewBooking {
        flow: draft.flow(),
        total: payload.pricing_snapshot.total,
        currency: payload.pricing_snapshot.currency.clone(),
        payload,
    }
}

/// Validate the whole flow and persist the booking in one shot.
pub async fn submit_draft<S>(
    store: &S,
    catalog: &CatalogSnapshot,
    draft: &Draft,
    today: NaiveDate,
) -> Result<BookingRecord, SubmitError>
where
    S: BookingStore + ?Sized,
{
    let report = flow_for(draft.flow()).gate_all(draft, catalog, today);
    if !report.is_ok() {
        return Err(SubmitError::Blocked(report));
    }

    let record = store.create_booking(build_booking(draft, catalog)).await?;
    tracing::info!(reference = %record.reference, total = %record.total, "booking created");
    Ok(record)
}

/// Cache-through booking lookup by reference.
pub async fn find_booking(
    pool: &PgPool,
    cache: &AppCache,
    reference: &str,
) -> Result<Option<Arc<BookingRecord>>, AppError> {
    let key = AppCache::booking_key(reference);
    if let Some(cached) = cache.bookings.get(&key).await {
        return Ok(Some(cached));
    }

    match queries::get_booking_by_reference(pool, reference).await? {
        Some(record) => {
            let record = Arc::new(record);
            cache.bookings.insert(key, record.clone()).await;
            Ok(Some(record))
        }
        None => Ok(None),
    }
}

/// One interactive booking attempt: the draft, the wizard cursor, and the
/// store that will receive the final submission.
///
/// Draft edits and backward navigation are refused from the moment a
/// submission enters flight; a failed submission unfreezes the session at
/// the final step so the customer can retry without losing input.
pub struct BookingSession<S> {
    selections: SelectionStore,
    controller: FlowController,
    gateway: S,
}

impl<S: BookingStore> BookingSession<S> {
    pub fn new(draft: Draft, gateway: S) -> Self {
        let controller = FlowController::new(draft.flow());
        Self {
            selections: SelectionStore::new(draft),
            controller,
            gateway,
        }
    }

    pub fn draft(&self) -> &Draft {
        self.selections.get()
    }

    pub fn controller(&self) -> &FlowController {
        &self.controller
    }

    /// Edit the draft. Returns false (and leaves the draft untouched) when
    /// the update is a no-op or the session is frozen.
    pub fn apply(&mut self, update: impl FnOnce(Draft) -> Draft) -> bool {
        if self.controller.is_submitting() || self.controller.is_confirmed() {
            return false;
        }
        self.selections.apply(update)
    }

    pub fn advance(&mut self, catalog: &CatalogSnapshot, today: NaiveDate) -> AdvanceOutcome {
        self.controller.advance(self.selections.get(), catalog, today)
    }

    pub fn retreat(&mut self) -> bool {
        self.controller.retreat()
    }

    /// Submit the draft. The controller re-validates every gate, freezes
    /// the session for the duration of the store call, and records the
    /// outcome.
    pub async fn submit(
        &mut self,
        catalog: &CatalogSnapshot,
        today: NaiveDate,
    ) -> Result<BookingRecord, SubmitError> {
        self.controller
            .begin_submission(self.selections.get(), catalog, today)?;

        let booking = build_booking(self.selections.get(), catalog);
        match self.gateway.create_booking(booking).await {
            Ok(record) => {
                self.controller.record_success(record.reference.clone());
                tracing::info!(reference = %record.reference, "booking created");
                Ok(record)
            }
            Err(err) => {
                self.controller.record_failure();
                Err(SubmitError::Store(err))
            }
        }
    }
}
