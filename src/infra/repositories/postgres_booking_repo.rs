use crate::domain::{
    models::booking::{Booking, BookingFilter, BookingStatus, BookingView},
    ports::BookingRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

pub struct PostgresBookingRepo {
    pool: PgPool,
}

impl PostgresBookingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for PostgresBookingRepo {
    async fn create(&self, booking: &Booking) -> Result<Booking, AppError> {
        sqlx::query_as::<_, Booking>("INSERT INTO bookings (id, student_id, teacher_id, schedule_id, booking_date, suggested_time_slots, time_slot, status, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *")
            .bind(&booking.id).bind(booking.student_id).bind(booking.teacher_id).bind(&booking.schedule_id)
            .bind(booking.booking_date).bind(&booking.suggested_time_slots).bind(&booking.time_slot)
            .bind(booking.status).bind(booking.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_recent(&self, filter: &BookingFilter, limit: i64) -> Result<Vec<BookingView>, AppError> {
        sqlx::query_as::<_, BookingView>(
            "SELECT b.*, s.name AS student_name, t.name AS teacher_name
             FROM bookings b
             LEFT JOIN users s ON s.id = b.student_id
             LEFT JOIN users t ON t.id = b.teacher_id
             WHERE ($1::BIGINT IS NULL OR b.student_id = $1) AND ($2::BIGINT IS NULL OR b.teacher_id = $2)
             ORDER BY b.created_at DESC, b.id DESC LIMIT $3"
        )
            .bind(filter.student_id).bind(filter.teacher_id).bind(limit)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_active_claims(&self, teacher_id: i64, date: NaiveDate) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE teacher_id = $1 AND booking_date = $2 AND time_slot IS NOT NULL AND status IN ('pending', 'approved') ORDER BY created_at ASC")
            .bind(teacher_id).bind(date)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_active_by_schedule(&self, schedule_id: &str, date: NaiveDate) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE schedule_id = $1 AND booking_date = $2 AND status IN ('pending', 'approved') LIMIT 1")
            .bind(schedule_id).bind(date)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_latest_live(&self, student_id: i64, teacher_id: i64, date: NaiveDate, time_slot: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings
             WHERE student_id = $1 AND teacher_id = $2 AND booking_date = $3 AND time_slot = $4
               AND status NOT IN ('cancelled', 'rejected')
             ORDER BY created_at DESC LIMIT 1"
        )
            .bind(student_id).bind(teacher_id).bind(date).bind(time_slot)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn transition(&self, id: &str, from: BookingStatus, to: BookingStatus) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("UPDATE bookings SET status = $1 WHERE id = $2 AND status = $3 RETURNING *")
            .bind(to).bind(id).bind(from)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn confirm_slot(&self, id: &str, time_slot: &str, exclusive: bool) -> Result<Option<Booking>, AppError> {
        if !exclusive {
            return sqlx::query_as::<_, Booking>("UPDATE bookings SET status = 'approved', time_slot = $1 WHERE id = $2 AND status = 'pending' RETURNING *")
                .bind(time_slot).bind(id)
                .fetch_optional(&self.pool).await.map_err(AppError::Database);
        }

        // Serialize exclusive approvals per teacher and day so two can't both pass the NOT EXISTS check.
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended(teacher_id::TEXT || '/' || booking_date::TEXT, 0)) FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        let approved = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = 'approved', time_slot = $1
             WHERE id = $2 AND status = 'pending'
               AND NOT EXISTS (
                   SELECT 1 FROM bookings o
                   WHERE o.teacher_id = bookings.teacher_id AND o.booking_date = bookings.booking_date
                     AND o.time_slot = $1 AND o.id <> bookings.id AND o.status IN ('pending', 'approved')
               )
             RETURNING *"
        )
            .bind(time_slot).bind(id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(approved)
    }
}
