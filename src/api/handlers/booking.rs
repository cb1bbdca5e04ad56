use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use crate::api::extractors::{json::ValidJson, query::ValidQuery};
use crate::state::AppState;
use crate::api::dtos::requests::{
    parse_id, required, BookingActionQuery, BookingIdQuery, BookingListQuery, ConflictQuery,
    CreateBookingRequest,
};
use crate::api::dtos::responses::{
    BookingActionResponse, BookingCreatedResponse, BookingListResponse, BookingResponse,
    ConflictCheckResponse,
};
use crate::domain::models::booking::BookingFilter;
use crate::domain::services::booking_service::{BookingRequest, RequestTarget};
use crate::domain::services::slot_label;
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    ValidJson(payload): ValidJson<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let student_id = required(payload.student_id, "studentId")?;
    let teacher_id = required(payload.teacher_id, "teacherId")?;

    let target = match payload.schedule_id.filter(|s| !s.trim().is_empty()) {
        Some(schedule_id) => RequestTarget::Schedule { schedule_id },
        None => {
            let booking_date = required(payload.booking_date, "bookingDate")?;
            let time_slots = match (payload.suggested_time_slots, payload.time_slot) {
                (Some(slots), _) if !slots.is_empty() => slots,
                (_, Some(slot)) => vec![slot],
                _ => return Err(AppError::Validation("suggestedTimeSlots or timeSlot is required".into())),
            };
            RequestTarget::Candidates { booking_date, time_slots }
        }
    };

    let booking = state.booking_service
        .create_request(BookingRequest { student_id, teacher_id, target })
        .await?;

    Ok((StatusCode::CREATED, Json(BookingCreatedResponse { booking_id: booking.id.clone(), booking })))
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    ValidQuery(query): ValidQuery<BookingListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filter = BookingFilter {
        student_id: parse_id(query.student_id.as_deref(), "studentId")?,
        teacher_id: parse_id(query.teacher_id.as_deref(), "teacherId")?,
    };

    let bookings = state.booking_service.list(&filter).await?;
    Ok(Json(BookingListResponse { bookings }))
}

/// `PATCH /bookings?id=&action=approve|reject`
pub async fn update_booking(
    State(state): State<Arc<AppState>>,
    ValidQuery(query): ValidQuery<BookingActionQuery>,
) -> Result<impl IntoResponse, AppError> {
    let id = required(query.id.filter(|s| !s.is_empty()), "id")?;
    let action = required(query.action, "action")?;

    info!(booking_id = %id, "Booking action '{}' requested", action);

    let response = match action.as_str() {
        "approve" => {
            let outcome = state.booking_service
                .approve(&id, query.selected_time.as_deref(), query.force.unwrap_or(false))
                .await?;
            BookingActionResponse { booking: outcome.booking, conflicts: outcome.conflicts }
        }
        "reject" => BookingActionResponse { booking: state.booking_service.reject(&id).await?, conflicts: vec![] },
        other => return Err(AppError::Validation(format!("Unknown action '{}'", other))),
    };

    Ok(Json(response))
}

pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    ValidQuery(query): ValidQuery<BookingIdQuery>,
) -> Result<impl IntoResponse, AppError> {
    let id = required(query.id.filter(|s| !s.is_empty()), "id")?;
    let booking = state.booking_service.cancel(&id).await?;
    Ok(Json(BookingResponse { booking }))
}

pub async fn check_conflicts(
    State(state): State<Arc<AppState>>,
    ValidQuery(query): ValidQuery<ConflictQuery>,
) -> Result<impl IntoResponse, AppError> {
    let teacher_id = required(parse_id(query.teacher_id.as_deref(), "teacherId")?, "teacherId")?;
    let date = slot_label::parse_date(&required(query.date, "date")?, "date")?;
    let time_slot = slot_label::normalize_time_slot(&required(query.time_slot, "timeSlot")?)?;

    let bookings = state.conflicts.active_bookings(teacher_id, date, &time_slot).await?;
    Ok(Json(ConflictCheckResponse { has_active_booking: !bookings.is_empty(), bookings }))
}
