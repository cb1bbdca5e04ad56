use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: String,
    pub booking_id: Option<String>,
    pub student_id: i64,
    pub session_id: String,
    pub signature_url: Option<String>,
    pub attended_at: DateTime<Utc>,
}

impl Attendance {
    pub fn new(booking_id: Option<String>, student_id: i64, session_id: String, attended_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            booking_id,
            student_id,
            session_id,
            signature_url: None,
            attended_at,
        }
    }
}

#[derive(Debug, Serialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub attendance: Attendance,
    pub student_name: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct AttendanceFilter {
    pub session_id: Option<String>,
    pub student_id: Option<i64>,
}
