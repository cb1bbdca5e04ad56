use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{types::Json, FromRow};
use std::fmt;

/// Lifecycle of a booking.
///
/// ```text
/// pending ──approve──▶ approved ──attendance──▶ completed
///    │                    │
///    ├──reject──▶ rejected│
///    └──cancel──▶ cancelled ◀──cancel──┘
/// ```
///
/// Rejected, cancelled and completed are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "booking_status", rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Completed | Self::Cancelled)
    }

    /// The single source of truth for which transitions are legal.
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Approved)
                | (Self::Pending, Self::Rejected)
                | (Self::Pending, Self::Cancelled)
                | (Self::Approved, Self::Cancelled)
                | (Self::Approved, Self::Completed)
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub student_id: i64,
    pub teacher_id: i64,
    pub schedule_id: Option<String>,
    pub booking_date: NaiveDate,
    pub suggested_time_slots: Json<Vec<String>>,
    pub time_slot: Option<String>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

pub struct NewBookingParams {
    pub student_id: i64,
    pub teacher_id: i64,
    pub schedule_id: Option<String>,
    pub booking_date: NaiveDate,
    pub suggested_time_slots: Vec<String>,
    pub time_slot: Option<String>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(params: NewBookingParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            student_id: params.student_id,
            teacher_id: params.teacher_id,
            schedule_id: params.schedule_id,
            booking_date: params.booking_date,
            suggested_time_slots: Json(params.suggested_time_slots),
            time_slot: params.time_slot,
            status: params.status,
            created_at: params.created_at,
        }
    }

    /// Active bookings occupy their confirmed slot for conflict detection.
    pub fn is_active_claim(&self) -> bool {
        self.time_slot.is_some()
            && matches!(self.status, BookingStatus::Pending | BookingStatus::Approved)
    }

    pub fn suggests(&self, time_slot: &str) -> bool {
        self.suggested_time_slots.iter().any(|s| s == time_slot)
    }
}

/// A booking joined with the display names of both parties.
#[derive(Debug, Serialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BookingView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub booking: Booking,
    pub student_name: Option<String>,
    pub teacher_name: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct BookingFilter {
    pub student_id: Option<i64>,
    pub teacher_id: Option<i64>,
}
