use std::sync::Arc;
use crate::domain::{
    models::booking::{Booking, BookingStatus, NewBookingParams},
    ports::{BookingRepository, Clock},
    services::{conflict::ConflictDetector, slot_label},
};
use crate::error::AppError;
use tracing::{info, warn};

pub struct InstantBookingRequest {
    pub student_id: i64,
    pub teacher_id: i64,
    /// Defaults to today in the service timezone.
    pub booking_date: Option<String>,
    pub time_slot: String,
}

pub struct InstantOutcome {
    pub booking: Booking,
    pub is_new: bool,
}

/// Walk-in bookings: created already approved at the moment the student shows up.
///
/// Calling `ensure` repeatedly with the same arguments yields the same booking.
/// A slot another student already holds is refused.
/// Concurrent callers race on the live-key unique index; the loser re-reads the winner.
pub struct InstantBookingService {
    repo: Arc<dyn BookingRepository>,
    conflicts: Arc<ConflictDetector>,
    clock: Arc<dyn Clock>,
}

impl InstantBookingService {
    pub fn new(repo: Arc<dyn BookingRepository>, conflicts: Arc<ConflictDetector>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, conflicts, clock }
    }

    pub async fn ensure(&self, request: InstantBookingRequest) -> Result<InstantOutcome, AppError> {
        let time_slot = slot_label::normalize_time_slot(&request.time_slot)?;
        let date = match request.booking_date.as_deref() {
            Some(raw) => slot_label::parse_date(raw, "bookingDate")?,
            None => self.clock.today(),
        };

        if let Some(existing) = self.repo.find_latest_live(request.student_id, request.teacher_id, date, &time_slot).await? {
            info!(booking_id = %existing.id, "Reusing instant booking for {} {}", date, time_slot);
            return Ok(InstantOutcome { booking: existing, is_new: false });
        }

        let others = self.conflicts.active_bookings(request.teacher_id, date, &time_slot).await?;
        if !others.is_empty() {
            let ids: Vec<&str> = others.iter().map(|b| b.id.as_str()).collect();
            warn!(teacher_id = request.teacher_id, "Refusing walk-in on {} {}: held by {:?}", date, time_slot, ids);
            return Err(AppError::Conflict(format!(
                "{} {} is already held by booking(s) {}",
                date, time_slot, ids.join(", ")
            )));
        }

        let booking = Booking::new(NewBookingParams {
            student_id: request.student_id,
            teacher_id: request.teacher_id,
            schedule_id: None,
            booking_date: date,
            suggested_time_slots: vec![time_slot.clone()],
            time_slot: Some(time_slot.clone()),
            status: BookingStatus::Approved,
            created_at: self.clock.now(),
        });

        match self.repo.create(&booking).await {
            Ok(created) => {
                info!(booking_id = %created.id, "Instant booking created for {} {}", date, time_slot);
                Ok(InstantOutcome { booking: created, is_new: true })
            }
            Err(e) if e.is_unique_violation() => {
                let winner = self.repo.find_latest_live(request.student_id, request.teacher_id, date, &time_slot).await?
                    .ok_or(AppError::Conflict("Instant booking collided with a concurrent request; retry".into()))?;
                info!(booking_id = %winner.id, "Instant booking raced; returning existing booking");
                Ok(InstantOutcome { booking: winner, is_new: false })
            }
            Err(e) => Err(e),
        }
    }
}
