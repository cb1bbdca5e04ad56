use crate::domain::{
    models::booking::{Booking, BookingFilter, BookingStatus, BookingView},
    ports::BookingRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::SqlitePool;

const VIEW_SELECT: &str = "SELECT b.*, s.name AS student_name, t.name AS teacher_name
     FROM bookings b
     LEFT JOIN users s ON s.id = b.student_id
     LEFT JOIN users t ON t.id = b.teacher_id";

pub struct SqliteBookingRepo {
    pool: SqlitePool,
}

impl SqliteBookingRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for SqliteBookingRepo {
    async fn create(&self, booking: &Booking) -> Result<Booking, AppError> {
        sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (id, student_id, teacher_id, schedule_id, booking_date, suggested_time_slots, time_slot, status, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&booking.id).bind(booking.student_id).bind(booking.teacher_id).bind(&booking.schedule_id)
            .bind(booking.booking_date).bind(&booking.suggested_time_slots).bind(&booking.time_slot)
            .bind(booking.status).bind(booking.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_recent(&self, filter: &BookingFilter, limit: i64) -> Result<Vec<BookingView>, AppError> {
        let sql = format!(
            "{} WHERE (? IS NULL OR b.student_id = ?) AND (? IS NULL OR b.teacher_id = ?)
             ORDER BY b.created_at DESC, b.id DESC LIMIT ?",
            VIEW_SELECT
        );
        sqlx::query_as::<_, BookingView>(&sql)
            .bind(filter.student_id).bind(filter.student_id)
            .bind(filter.teacher_id).bind(filter.teacher_id)
            .bind(limit)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_active_claims(&self, teacher_id: i64, date: NaiveDate) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings
             WHERE teacher_id = ? AND booking_date = ? AND time_slot IS NOT NULL AND status IN ('pending', 'approved')
             ORDER BY created_at ASC"
        )
            .bind(teacher_id).bind(date)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_active_by_schedule(&self, schedule_id: &str, date: NaiveDate) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE schedule_id = ? AND booking_date = ? AND status IN ('pending', 'approved') LIMIT 1"
        )
            .bind(schedule_id).bind(date)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_latest_live(&self, student_id: i64, teacher_id: i64, date: NaiveDate, time_slot: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings
             WHERE student_id = ? AND teacher_id = ? AND booking_date = ? AND time_slot = ?
               AND status NOT IN ('cancelled', 'rejected')
             ORDER BY created_at DESC LIMIT 1"
        )
            .bind(student_id).bind(teacher_id).bind(date).bind(time_slot)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn transition(&self, id: &str, from: BookingStatus, to: BookingStatus) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("UPDATE bookings SET status = ? WHERE id = ? AND status = ? RETURNING *")
            .bind(to).bind(id).bind(from)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn confirm_slot(&self, id: &str, time_slot: &str, exclusive: bool) -> Result<Option<Booking>, AppError> {
        if !exclusive {
            return sqlx::query_as::<_, Booking>(
                "UPDATE bookings SET status = 'approved', time_slot = ? WHERE id = ? AND status = 'pending' RETURNING *"
            )
                .bind(time_slot).bind(id)
                .fetch_optional(&self.pool).await.map_err(AppError::Database);
        }

        sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = 'approved', time_slot = ?
             WHERE id = ? AND status = 'pending'
               AND NOT EXISTS (
                   SELECT 1 FROM bookings o
                   WHERE o.teacher_id = bookings.teacher_id AND o.booking_date = bookings.booking_date
                     AND o.time_slot = ? AND o.id <> bookings.id AND o.status IN ('pending', 'approved')
               )
             RETURNING *"
        )
            .bind(time_slot).bind(id).bind(time_slot)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
}
