use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use crate::api::extractors::{json::ValidJson, query::ValidQuery};
use crate::state::AppState;
use crate::api::dtos::requests::{parse_id, required, AttendanceListQuery, RecordAttendanceRequest};
use crate::api::dtos::responses::{AttendanceCreatedResponse, AttendanceListResponse};
use crate::domain::models::attendance::AttendanceFilter;
use crate::domain::services::attendance_service::AttendanceRequest;
use crate::error::AppError;
use std::sync::Arc;

pub async fn record_attendance(
    State(state): State<Arc<AppState>>,
    ValidJson(payload): ValidJson<RecordAttendanceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let request = AttendanceRequest {
        session_id: required(payload.session_id, "sessionId")?,
        booking_id: payload.booking_id,
        student_name: payload.student_name,
        signature: payload.signature,
    };

    let attendance = state.attendance_service.record(request).await?;

    Ok((StatusCode::CREATED, Json(AttendanceCreatedResponse {
        attendance_id: attendance.id.clone(),
        signature_url: attendance.signature_url.clone(),
        attendance,
    })))
}

pub async fn list_attendance(
    State(state): State<Arc<AppState>>,
    ValidQuery(query): ValidQuery<AttendanceListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filter = AttendanceFilter {
        session_id: query.session_id.filter(|s| !s.trim().is_empty()),
        student_id: parse_id(query.student_id.as_deref(), "studentId")?,
    };

    let attendance = state.attendance_service.list(&filter).await?;
    Ok(Json(AttendanceListResponse { attendance }))
}
