use serde::Deserialize;
use crate::error::AppError;

/// Unwraps a field the client must send. Missing fields are a 400, not a 422.
pub fn required<T>(value: Option<T>, field: &str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::Validation(format!("{} is required", field)))
}

/// Query-string ids arrive as text so a malformed value becomes a JSON 400.
pub fn parse_id(raw: Option<&str>, field: &str) -> Result<Option<i64>, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.parse::<i64>()
            .map(Some)
            .map_err(|_| AppError::Validation(format!("{} must be an integer", field))),
        None => Ok(None),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub student_id: Option<i64>,
    pub teacher_id: Option<i64>,
    pub schedule_id: Option<String>,
    pub booking_date: Option<String>,
    pub suggested_time_slots: Option<Vec<String>>,
    pub time_slot: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingListQuery {
    pub student_id: Option<String>,
    pub teacher_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingActionQuery {
    pub id: Option<String>,
    pub action: Option<String>,
    pub selected_time: Option<String>,
    pub force: Option<bool>,
}

#[derive(Deserialize)]
pub struct BookingIdQuery {
    pub id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictQuery {
    pub teacher_id: Option<String>,
    pub date: Option<String>,
    pub time_slot: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstantBookingBody {
    pub student_id: Option<i64>,
    pub teacher_id: Option<i64>,
    pub booking_date: Option<String>,
    pub time_slot: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDay {
    pub date: Option<String>,
    pub time_slots: Option<Vec<String>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceScheduleRequest {
    pub teacher_id: Option<i64>,
    pub date: Option<String>,
    pub time_slots: Option<Vec<String>>,
    pub schedules: Option<Vec<ScheduleDay>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleQuery {
    pub teacher_id: Option<String>,
    pub date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordAttendanceRequest {
    pub session_id: Option<String>,
    pub student_name: Option<String>,
    pub booking_id: Option<String>,
    pub signature: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceListQuery {
    pub session_id: Option<String>,
    pub student_id: Option<String>,
}
