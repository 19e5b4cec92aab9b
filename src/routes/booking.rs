//! Booking API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::booking::calculators::{self, CommissionBreakdown};
use crate::booking::requests::{QuoteRequest, SplitRequest, StepCheckRequest, SubmitRequest};
use crate::booking::responses::{
    BookingResponse, QuoteResponse, StepCheckResponse, StepReportResponse, SubmissionResponse,
};
use crate::booking::services::{self, PgBookingStore, SubmitError};
use crate::booking::steps::flow_for;
use crate::booking::voucher;
use crate::catalog::models::FlowKind;
use crate::catalog::provider::get_catalog;
use crate::error::{AppError, Result};
use crate::AppState;

/// Price a draft against the current catalog
pub async fn quote(
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>> {
    let outcome = services::quote(&state.db, &state.cache, &request.draft).await?;
    Ok(Json(outcome.into()))
}

/// Split a priced snapshot between platform and supplier
pub async fn split(
    State(state): State<AppState>,
    Json(request): Json<SplitRequest>,
) -> Result<Json<CommissionBreakdown>> {
    let table = match request.commissions {
        Some(table) => table,
        None => {
            get_catalog(&state.db, &state.cache, FlowKind::Rental)
                .await?
                .commissions
                .clone()
        }
    };

    Ok(Json(calculators::split(&request.snapshot, &table)))
}

/// Run every step gate of the draft's flow
pub async fn check_steps(
    State(state): State<AppState>,
    Json(request): Json<StepCheckRequest>,
) -> Result<Json<StepCheckResponse>> {
    let draft = request.draft;
    let catalog = get_catalog(&state.db, &state.cache, draft.flow()).await?;
    let today = Utc::now().date_naive();

    let steps: Vec<StepReportResponse> = flow_for(draft.flow())
        .steps()
        .iter()
        .map(|step| {
            let report = step.check(&draft, &catalog, today);
            StepReportResponse {
                id: step.id,
                title: step.title,
                ok: report.is_ok(),
                missing: report.missing,
            }
        })
        .collect();
    let ready = steps.iter().all(|s| s.ok);

    Ok(Json(StepCheckResponse {
        flow: draft.flow(),
        steps,
        ready,
    }))
}

/// Submit a draft as a booking. Responds 201 with the reference and
/// voucher, or 422 listing what the draft is still missing.
pub async fn submit(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> std::result::Result<(StatusCode, Json<SubmissionResponse>), SubmitError> {
    let draft = request.draft;
    let catalog = get_catalog(&state.db, &state.cache, draft.flow()).await?;
    let store = PgBookingStore::new(state.db.clone());

    let record = services::submit_draft(&store, &catalog, &draft, Utc::now().date_naive()).await?;
    let voucher_qr = voucher::reference_qr_data_uri(&record.reference)?;

    Ok((
        StatusCode::CREATED,
        Json(SubmissionResponse::from_record(&record, voucher_qr)),
    ))
}

/// Look up a booking by reference
pub async fn lookup(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Json<BookingResponse>> {
    let record = services::find_booking(&state.db, &state.cache, &reference)
        .await?
        .ok_or(AppError::NotFound)?;

    let voucher_qr = voucher::reference_qr_data_uri(&record.reference)?;
    Ok(Json(BookingResponse::from_record(&record, voucher_qr)))
}
