use std::sync::Arc;
use crate::config::ConflictPolicy;
use crate::domain::{
    models::booking::{Booking, BookingFilter, BookingStatus, BookingView, NewBookingParams},
    ports::{AvailabilityRepository, BookingRepository, Clock},
    services::{conflict::ConflictDetector, slot_label},
};
use crate::error::AppError;
use tracing::{info, warn};

pub const LIST_LIMIT: i64 = 100;

pub enum RequestTarget {
    /// Legacy path: the student picked one of the teacher's published slots.
    Schedule { schedule_id: String },
    /// The student proposes one or more candidate slots on a date.
    Candidates { booking_date: String, time_slots: Vec<String> },
}

pub struct BookingRequest {
    pub student_id: i64,
    pub teacher_id: i64,
    pub target: RequestTarget,
}

pub struct ApprovalOutcome {
    pub booking: Booking,
    /// Other active bookings holding the approved slot at the time of approval.
    pub conflicts: Vec<Booking>,
}

/// Rejects any transition the state machine does not allow.
pub fn ensure_transition(booking: &Booking, target: BookingStatus) -> Result<(), AppError> {
    if booking.status.can_transition_to(target) {
        return Ok(());
    }
    if booking.status.is_terminal() {
        return Err(AppError::Conflict(format!("Booking {} is already {}", booking.id, booking.status)));
    }
    Err(AppError::Conflict(format!(
        "Booking {} is {} and cannot become {}",
        booking.id, booking.status, target
    )))
}

pub struct BookingService {
    repo: Arc<dyn BookingRepository>,
    availability_repo: Arc<dyn AvailabilityRepository>,
    conflicts: Arc<ConflictDetector>,
    clock: Arc<dyn Clock>,
    policy: ConflictPolicy,
}

impl BookingService {
    pub fn new(
        repo: Arc<dyn BookingRepository>,
        availability_repo: Arc<dyn AvailabilityRepository>,
        conflicts: Arc<ConflictDetector>,
        clock: Arc<dyn Clock>,
        policy: ConflictPolicy,
    ) -> Self {
        Self { repo, availability_repo, conflicts, clock, policy }
    }

    pub async fn create_request(&self, request: BookingRequest) -> Result<Booking, AppError> {
        let booking = match request.target {
            RequestTarget::Schedule { schedule_id } => {
                self.prepare_from_schedule(request.student_id, request.teacher_id, &schedule_id).await?
            }
            RequestTarget::Candidates { booking_date, time_slots } => {
                self.prepare_from_candidates(request.student_id, request.teacher_id, &booking_date, &time_slots).await?
            }
        };

        let created = self.repo.create(&booking).await?;
        info!(
            booking_id = %created.id,
            student_id = created.student_id,
            teacher_id = created.teacher_id,
            "Booking requested for {} with candidates {:?}",
            created.booking_date, created.suggested_time_slots.0
        );
        Ok(created)
    }

    async fn prepare_from_candidates(&self, student_id: i64, teacher_id: i64, raw_date: &str, raw_slots: &[String]) -> Result<Booking, AppError> {
        let date = slot_label::parse_date(raw_date, "bookingDate")?;
        let candidates = slot_label::normalize_slots(raw_slots)?;
        if candidates.is_empty() {
            return Err(AppError::Validation("At least one suggested time slot is required".into()));
        }

        let offered = self.availability_repo.list_by_date(teacher_id, date).await?;
        let offered: Vec<&str> = offered.iter().filter(|s| s.is_available).map(|s| s.time_slot.as_str()).collect();
        if !offered.is_empty() {
            let unavailable: Vec<&String> = candidates.iter().filter(|c| !offered.contains(&c.as_str())).collect();
            if !unavailable.is_empty() {
                return Err(AppError::Conflict(format!("Time slots {:?} are not available on {}", unavailable, date)));
            }
        }

        let taken = self.conflicts.claimed_among(teacher_id, date, &candidates).await?;
        if !taken.is_empty() {
            return Err(AppError::Conflict(format!("Time slots {:?} on {} are already booked", taken, date)));
        }

        Ok(Booking::new(NewBookingParams {
            student_id,
            teacher_id,
            schedule_id: None,
            booking_date: date,
            suggested_time_slots: candidates,
            time_slot: None,
            status: BookingStatus::Pending,
            created_at: self.clock.now(),
        }))
    }

    async fn prepare_from_schedule(&self, student_id: i64, teacher_id: i64, schedule_id: &str) -> Result<Booking, AppError> {
        let slot = self.availability_repo.find_by_id(schedule_id).await?
            .ok_or(AppError::NotFound("Schedule not found".into()))?;

        if slot.teacher_id != teacher_id {
            return Err(AppError::Conflict("Schedule belongs to a different teacher".into()));
        }
        if !slot.is_available {
            return Err(AppError::Conflict("Schedule is not available".into()));
        }
        if self.repo.find_active_by_schedule(&slot.id, slot.date).await?.is_some() {
            return Err(AppError::Conflict("This schedule is already booked".into()));
        }
        if self.conflicts.has_active_booking(teacher_id, slot.date, &slot.time_slot).await? {
            return Err(AppError::Conflict(format!("Time slot {} on {} is already booked", slot.time_slot, slot.date)));
        }

        Ok(Booking::new(NewBookingParams {
            student_id,
            teacher_id,
            schedule_id: Some(slot.id),
            booking_date: slot.date,
            suggested_time_slots: vec![slot.time_slot.clone()],
            time_slot: Some(slot.time_slot),
            status: BookingStatus::Pending,
            created_at: self.clock.now(),
        }))
    }

    pub async fn get(&self, id: &str) -> Result<Booking, AppError> {
        self.repo.find_by_id(id).await?
            .ok_or(AppError::NotFound("Booking not found".into()))
    }

    pub async fn list(&self, filter: &BookingFilter) -> Result<Vec<BookingView>, AppError> {
        self.repo.list_recent(filter, LIST_LIMIT).await
    }

    pub async fn approve(&self, id: &str, selected_time: Option<&str>, force: bool) -> Result<ApprovalOutcome, AppError> {
        let booking = self.get(id).await?;
        ensure_transition(&booking, BookingStatus::Approved)?;

        let slot = match selected_time {
            Some(raw) => slot_label::normalize_time_slot(raw)?,
            None => booking.time_slot.clone()
                .ok_or(AppError::Validation("selectedTime is required".into()))?,
        };

        if !booking.suggests(&slot) && booking.time_slot.as_deref() != Some(slot.as_str()) {
            return Err(AppError::Validation(format!("{} is not one of the suggested time slots", slot)));
        }

        let conflicts: Vec<Booking> = self.conflicts
            .active_bookings(booking.teacher_id, booking.booking_date, &slot)
            .await?
            .into_iter()
            .filter(|b| b.id != booking.id)
            .collect();

        let exclusive = self.policy == ConflictPolicy::Block && !force;
        if !conflicts.is_empty() {
            let ids: Vec<&str> = conflicts.iter().map(|b| b.id.as_str()).collect();
            if exclusive {
                return Err(AppError::Conflict(format!(
                    "Time slot {} on {} is already held by booking(s) {:?}",
                    slot, booking.booking_date, ids
                )));
            }
            warn!(booking_id = %booking.id, "Approving {} on {} despite active booking(s) {:?}", slot, booking.booking_date, ids);
        }

        let approved = self.repo.confirm_slot(&booking.id, &slot, exclusive).await?
            .ok_or(AppError::Conflict("Booking changed while it was being approved; reload and retry".into()))?;

        info!(booking_id = %approved.id, from = %booking.status, to = %approved.status, "Booking approved for {}", slot);
        Ok(ApprovalOutcome { booking: approved, conflicts })
    }

    pub async fn reject(&self, id: &str) -> Result<Booking, AppError> {
        self.move_to(id, BookingStatus::Rejected).await
    }

    pub async fn cancel(&self, id: &str) -> Result<Booking, AppError> {
        self.move_to(id, BookingStatus::Cancelled).await
    }

    async fn move_to(&self, id: &str, target: BookingStatus) -> Result<Booking, AppError> {
        let booking = self.get(id).await?;
        ensure_transition(&booking, target)?;

        let updated = self.repo.transition(&booking.id, booking.status, target).await?
            .ok_or(AppError::Conflict("Booking changed concurrently; reload and retry".into()))?;

        info!(booking_id = %updated.id, from = %booking.status, to = %updated.status, "Booking status changed");
        Ok(updated)
    }
}
