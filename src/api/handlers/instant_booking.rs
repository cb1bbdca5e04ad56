use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use crate::api::extractors::json::ValidJson;
use crate::state::AppState;
use crate::api::dtos::requests::{required, InstantBookingBody};
use crate::api::dtos::responses::InstantBookingResponse;
use crate::domain::services::instant_booking::InstantBookingRequest;
use crate::error::AppError;
use std::sync::Arc;

/// 201 when a booking was created, 200 when an existing one was reused.
pub async fn ensure_instant_booking(
    State(state): State<Arc<AppState>>,
    ValidJson(payload): ValidJson<InstantBookingBody>,
) -> Result<impl IntoResponse, AppError> {
    let request = InstantBookingRequest {
        student_id: required(payload.student_id, "studentId")?,
        teacher_id: required(payload.teacher_id, "teacherId")?,
        booking_date: payload.booking_date.filter(|d| !d.trim().is_empty()),
        time_slot: required(payload.time_slot, "timeSlot")?,
    };

    let outcome = state.instant_booking_service.ensure(request).await?;
    let status = if outcome.is_new { StatusCode::CREATED } else { StatusCode::OK };

    Ok((status, Json(InstantBookingResponse {
        booking_id: outcome.booking.id.clone(),
        is_new: outcome.is_new,
        booking: outcome.booking,
    })))
}
