use serde::Serialize;
use crate::domain::models::{
    attendance::{Attendance, AttendanceView},
    availability::DaySchedule,
    booking::{Booking, BookingView},
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingCreatedResponse {
    pub booking_id: String,
    pub booking: Booking,
}

#[derive(Serialize)]
pub struct BookingListResponse {
    pub bookings: Vec<BookingView>,
}

#[derive(Serialize)]
pub struct BookingActionResponse {
    pub booking: Booking,
    /// Other active bookings on the approved slot; empty for rejections.
    pub conflicts: Vec<Booking>,
}

#[derive(Serialize)]
pub struct BookingResponse {
    pub booking: Booking,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictCheckResponse {
    pub has_active_booking: bool,
    pub bookings: Vec<Booking>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstantBookingResponse {
    pub booking_id: String,
    pub is_new: bool,
    pub booking: Booking,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResponse {
    pub teacher_id: i64,
    pub schedules: Vec<DaySchedule>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceCreatedResponse {
    pub attendance_id: String,
    pub signature_url: Option<String>,
    pub attendance: Attendance,
}

#[derive(Serialize)]
pub struct AttendanceListResponse {
    pub attendance: Vec<AttendanceView>,
}
