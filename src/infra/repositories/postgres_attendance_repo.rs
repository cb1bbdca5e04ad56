use crate::domain::{
    models::{attendance::{Attendance, AttendanceFilter, AttendanceView}, booking::Booking},
    ports::AttendanceRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresAttendanceRepo {
    pool: PgPool,
}

impl PostgresAttendanceRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const INSERT_ATTENDANCE: &str = "INSERT INTO attendance (id, booking_id, student_id, session_id, signature_url, attended_at) VALUES ($1, $2, $3, $4, $5, $6) RETURNING *";

#[async_trait]
impl AttendanceRepository for PostgresAttendanceRepo {
    async fn create(&self, attendance: &Attendance) -> Result<Attendance, AppError> {
        sqlx::query_as::<_, Attendance>(INSERT_ATTENDANCE)
            .bind(&attendance.id).bind(&attendance.booking_id).bind(attendance.student_id)
            .bind(&attendance.session_id).bind(&attendance.signature_url).bind(attendance.attended_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn create_for_booking(&self, attendance: &Attendance, booking_id: &str) -> Result<(Attendance, Booking), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let completed = sqlx::query_as::<_, Booking>("UPDATE bookings SET status = 'completed' WHERE id = $1 AND status = 'approved' RETURNING *")
            .bind(booking_id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or(AppError::Conflict("Booking is no longer approved".into()))?;

        let created = sqlx::query_as::<_, Attendance>(INSERT_ATTENDANCE)
            .bind(&attendance.id).bind(booking_id).bind(attendance.student_id)
            .bind(&attendance.session_id).bind(&attendance.signature_url).bind(attendance.attended_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok((created, completed))
    }

    async fn list_recent(&self, filter: &AttendanceFilter, limit: i64) -> Result<Vec<AttendanceView>, AppError> {
        sqlx::query_as::<_, AttendanceView>(
            "SELECT a.*, u.name AS student_name
             FROM attendance a
             LEFT JOIN users u ON u.id = a.student_id
             WHERE ($1::TEXT IS NULL OR a.session_id = $1) AND ($2::BIGINT IS NULL OR a.student_id = $2)
             ORDER BY a.attended_at DESC, a.id DESC LIMIT $3"
        )
            .bind(&filter.session_id).bind(filter.student_id).bind(limit)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
