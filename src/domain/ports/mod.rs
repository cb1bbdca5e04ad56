use crate::domain::models::{
    attendance::{Attendance, AttendanceFilter, AttendanceView},
    availability::{AvailabilitySlot, DayAvailability},
    booking::{Booking, BookingFilter, BookingStatus, BookingView},
    user::{User, UserRole},
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create(&self, booking: &Booking) -> Result<Booking, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError>;
    async fn list_recent(&self, filter: &BookingFilter, limit: i64) -> Result<Vec<BookingView>, AppError>;
    /// Bookings holding a confirmed slot in `pending` or `approved` for the teacher's day.
    async fn list_active_claims(&self, teacher_id: i64, date: NaiveDate) -> Result<Vec<Booking>, AppError>;
    async fn find_active_by_schedule(&self, schedule_id: &str, date: NaiveDate) -> Result<Option<Booking>, AppError>;
    /// Most recent booking for the exact walk-in key that is neither cancelled nor rejected.
    async fn find_latest_live(&self, student_id: i64, teacher_id: i64, date: NaiveDate, time_slot: &str) -> Result<Option<Booking>, AppError>;
    /// Compare-and-swap status change. `None` means the booking was not in `from`.
    async fn transition(&self, id: &str, from: BookingStatus, to: BookingStatus) -> Result<Option<Booking>, AppError>;
    /// `pending -> approved` with the confirmed slot. With `exclusive`, the write only
    /// happens when no other active booking holds the same teacher/date/slot.
    async fn confirm_slot(&self, id: &str, time_slot: &str, exclusive: bool) -> Result<Option<Booking>, AppError>;
}

#[async_trait]
pub trait AvailabilityRepository: Send + Sync {
    /// Discards and re-inserts every listed day in a single transaction.
    async fn replace_days(&self, teacher_id: i64, days: &[DayAvailability], created_at: DateTime<Utc>) -> Result<Vec<AvailabilitySlot>, AppError>;
    async fn list_by_date(&self, teacher_id: i64, date: NaiveDate) -> Result<Vec<AvailabilitySlot>, AppError>;
    async fn list_by_range(&self, teacher_id: i64, start: NaiveDate, end: NaiveDate) -> Result<Vec<AvailabilitySlot>, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<AvailabilitySlot>, AppError>;
}

#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    async fn create(&self, attendance: &Attendance) -> Result<Attendance, AppError>;
    /// Inserts the attendance and moves its booking `approved -> completed` atomically.
    async fn create_for_booking(&self, attendance: &Attendance, booking_id: &str) -> Result<(Attendance, Booking), AppError>;
    async fn list_recent(&self, filter: &AttendanceFilter, limit: i64) -> Result<Vec<AttendanceView>, AppError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, name: &str, role: UserRole, created_at: DateTime<Utc>) -> Result<User, AppError>;
    async fn find_student_by_name(&self, name: &str) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait SignatureStore: Send + Sync {
    /// Persists the blob and returns the URL the attendance row should reference.
    async fn put(&self, key: &str, content_type: &str, bytes: &[u8]) -> Result<String, AppError>;
    async fn delete(&self, key: &str) -> Result<(), AppError>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
    /// Calendar date of `now()` in the service timezone.
    fn today(&self) -> NaiveDate;
}
