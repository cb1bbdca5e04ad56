use std::sync::Arc;
use chrono::{Duration, NaiveDate};
use crate::domain::{
    models::availability::{group_by_date, AvailabilitySlot, DayAvailability, DaySchedule},
    ports::{AvailabilityRepository, Clock},
    services::slot_label,
};
use crate::error::AppError;
use tracing::info;

const DEFAULT_RANGE_DAYS: i64 = 30;
const MAX_RANGE_DAYS: i64 = 366;

pub struct AvailabilityService {
    repo: Arc<dyn AvailabilityRepository>,
    clock: Arc<dyn Clock>,
}

impl AvailabilityService {
    pub fn new(repo: Arc<dyn AvailabilityRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Wholesale replacement of the listed days. An empty slot list clears that day.
    pub async fn replace(&self, teacher_id: i64, days: Vec<(String, Vec<String>)>) -> Result<Vec<DaySchedule>, AppError> {
        if days.is_empty() {
            return Err(AppError::Validation("At least one date is required".into()));
        }

        let mut parsed: Vec<DayAvailability> = Vec::with_capacity(days.len());
        for (raw_date, raw_slots) in days {
            let date = slot_label::parse_date(&raw_date, "date")?;
            if parsed.iter().any(|d| d.date == date) {
                return Err(AppError::Validation(format!("Date {} is listed more than once", date)));
            }
            let time_slots = slot_label::normalize_slots(&raw_slots)?;
            parsed.push(DayAvailability { date, time_slots });
        }

        let inserted = self.repo.replace_days(teacher_id, &parsed, self.clock.now()).await?;
        info!(teacher_id, days = parsed.len(), slots = inserted.len(), "Availability replaced");

        let mut schedules: Vec<DaySchedule> = parsed
            .iter()
            .map(|day| DaySchedule {
                date: day.date,
                slots: inserted.iter().filter(|s| s.date == day.date).cloned().collect(),
            })
            .collect();
        for schedule in &mut schedules {
            schedule.slots.sort_by(|a, b| a.time_slot.cmp(&b.time_slot));
        }
        schedules.sort_by_key(|s| s.date);
        Ok(schedules)
    }

    pub async fn get_day(&self, teacher_id: i64, date: &str) -> Result<Vec<AvailabilitySlot>, AppError> {
        let date = slot_label::parse_date(date, "date")?;
        let slots = self.repo.list_by_date(teacher_id, date).await?;
        Ok(slots.into_iter().filter(|s| s.is_available).collect())
    }

    pub async fn get_range(&self, teacher_id: i64, start: Option<&str>, end: Option<&str>) -> Result<Vec<DaySchedule>, AppError> {
        let start: NaiveDate = match start {
            Some(raw) => slot_label::parse_date(raw, "startDate")?,
            None => self.clock.today(),
        };
        let end: NaiveDate = match end {
            Some(raw) => slot_label::parse_date(raw, "endDate")?,
            None => start + Duration::days(DEFAULT_RANGE_DAYS),
        };

        if end < start {
            return Err(AppError::Validation("endDate must not be before startDate".into()));
        }
        if (end - start).num_days() > MAX_RANGE_DAYS {
            return Err(AppError::Validation(format!("Date range may span at most {} days", MAX_RANGE_DAYS)));
        }

        let slots = self.repo.list_by_range(teacher_id, start, end).await?;
        Ok(group_by_date(slots.into_iter().filter(|s| s.is_available).collect()))
    }
}
