use std::sync::Arc;
use chrono::NaiveDate;
use crate::domain::{models::booking::Booking, ports::BookingRepository};
use crate::error::AppError;

/// Answers "is this exact teacher/date/slot already held?".
///
/// Only bookings that have actually claimed a slot count. A pending request that
/// merely lists the slot among its suggestions does not occupy it.
pub struct ConflictDetector {
    repo: Arc<dyn BookingRepository>,
}

impl ConflictDetector {
    pub fn new(repo: Arc<dyn BookingRepository>) -> Self {
        Self { repo }
    }

    pub async fn active_bookings(&self, teacher_id: i64, date: NaiveDate, time_slot: &str) -> Result<Vec<Booking>, AppError> {
        let claims = self.repo.list_active_claims(teacher_id, date).await?;
        Ok(claims
            .into_iter()
            .filter(|b| b.is_active_claim() && b.time_slot.as_deref() == Some(time_slot))
            .collect())
    }

    pub async fn has_active_booking(&self, teacher_id: i64, date: NaiveDate, time_slot: &str) -> Result<bool, AppError> {
        Ok(!self.active_bookings(teacher_id, date, time_slot).await?.is_empty())
    }

    /// Which of `candidates` are already claimed on the teacher's day.
    pub async fn claimed_among(&self, teacher_id: i64, date: NaiveDate, candidates: &[String]) -> Result<Vec<String>, AppError> {
        let claims = self.repo.list_active_claims(teacher_id, date).await?;
        Ok(candidates
            .iter()
            .filter(|c| claims.iter().any(|b| b.is_active_claim() && b.time_slot.as_deref() == Some(c.as_str())))
            .cloned()
            .collect())
    }
}
