use crate::domain::{
    models::availability::{AvailabilitySlot, DayAvailability},
    ports::AvailabilityRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;

pub struct SqliteAvailabilityRepo {
    pool: SqlitePool,
}

impl SqliteAvailabilityRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AvailabilityRepository for SqliteAvailabilityRepo {
    async fn replace_days(&self, teacher_id: i64, days: &[DayAvailability], created_at: DateTime<Utc>) -> Result<Vec<AvailabilitySlot>, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let mut inserted = Vec::new();

        for day in days {
            sqlx::query("DELETE FROM availability_slots WHERE teacher_id = ? AND date = ?")
                .bind(teacher_id).bind(day.date)
                .execute(&mut *tx).await.map_err(AppError::Database)?;

            for label in &day.time_slots {
                let slot = AvailabilitySlot::new(teacher_id, day.date, label.clone(), created_at);
                let row = sqlx::query_as::<_, AvailabilitySlot>(
                    "INSERT INTO availability_slots (id, teacher_id, date, time_slot, is_available, created_at)
                     VALUES (?, ?, ?, ?, ?, ?)
                     RETURNING *"
                )
                    .bind(&slot.id).bind(slot.teacher_id).bind(slot.date).bind(&slot.time_slot)
                    .bind(slot.is_available).bind(slot.created_at)
                    .fetch_one(&mut *tx).await.map_err(AppError::Database)?;
                inserted.push(row);
            }
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(inserted)
    }

    async fn list_by_date(&self, teacher_id: i64, date: NaiveDate) -> Result<Vec<AvailabilitySlot>, AppError> {
        sqlx::query_as::<_, AvailabilitySlot>("SELECT * FROM availability_slots WHERE teacher_id = ? AND date = ? ORDER BY time_slot ASC")
            .bind(teacher_id).bind(date)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_range(&self, teacher_id: i64, start: NaiveDate, end: NaiveDate) -> Result<Vec<AvailabilitySlot>, AppError> {
        sqlx::query_as::<_, AvailabilitySlot>(
            "SELECT * FROM availability_slots WHERE teacher_id = ? AND date >= ? AND date <= ? ORDER BY date ASC, time_slot ASC"
        )
            .bind(teacher_id).bind(start).bind(end)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<AvailabilitySlot>, AppError> {
        sqlx::query_as::<_, AvailabilitySlot>("SELECT * FROM availability_slots WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
}
