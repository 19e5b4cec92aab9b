//! Database queries for bookings.

use sqlx::PgPool;
use uuid::Uuid;

use crate::booking::models::{BookingRecord, NewBooking};
use crate::catalog::models::FlowKind;
use crate::error::AppError;

/// Draw the next human-readable reference for the flow. The sequences start
/// at 1001, so the first references issued are PT01001 and VR01001.
pub async fn allocate_reference(pool: &PgPool, flow: FlowKind) -> Result<String, AppError> {
    let sql = match flow {
        FlowKind::Tour => "SELECT 'PT' || lpad(nextval('tour_booking_ref_seq')::text, 5, '0')",
        FlowKind::Rental => "SELECT 'VR' || lpad(nextval('rental_booking_ref_seq')::text, 5, '0')",
    };

    let reference = sqlx::query_scalar::<_, String>(sql).fetch_one(pool).await?;
    Ok(reference)
}

/// Insert a booking under an already-allocated reference.
pub async fn insert_booking(
    pool: &PgPool,
    reference: &str,
    booking: &NewBooking,
) -> Result<BookingRecord, AppError> {
    let payload = serde_json::to_value(&booking.payload)?;

    let record = sqlx::query_as::<_, BookingRecord>(
        r#"
        INSERT INTO bookings
            (id, reference, flow, status, payment_status, payload, total, currency, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id, reference, flow, status, payment_status, payload, total, currency, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(reference)
    .bind(booking.flow)
    .bind(&booking.payload.status)
    .bind(&booking.payload.payment_status)
    .bind(payload)
    .bind(booking.total)
    .bind(&booking.currency)
    .bind(booking.payload.created_at)
    .fetch_one(pool)
    .await?;

    Ok(record)
}

/// Look up a booking by its human-readable reference.
pub async fn get_booking_by_reference(
    pool: &PgPool,
    reference: &str,
) -> Result<Option<BookingRecord>, AppError> {
    let record = sqlx::query_as::<_, BookingRecord>(
        r#"
        SELECT id, reference, flow, status, payment_status, payload, total, currency, created_at
        FROM bookings
        WHERE reference = $1
        "#,
    )
    .bind(reference)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}
