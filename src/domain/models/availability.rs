use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySlot {
    pub id: String,
    pub teacher_id: i64,
    pub date: NaiveDate,
    pub time_slot: String,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

impl AvailabilitySlot {
    pub fn new(teacher_id: i64, date: NaiveDate, time_slot: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            teacher_id,
            date,
            time_slot,
            is_available: true,
            created_at,
        }
    }
}

/// The full replacement set of slots for one teacher on one date.
#[derive(Debug, Clone)]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub time_slots: Vec<String>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DaySchedule {
    pub date: NaiveDate,
    pub slots: Vec<AvailabilitySlot>,
}

/// Groups slots (already ordered by date, then label) into per-day buckets.
pub fn group_by_date(slots: Vec<AvailabilitySlot>) -> Vec<DaySchedule> {
    let mut days: Vec<DaySchedule> = Vec::new();
    for slot in slots {
        match days.last_mut() {
            Some(day) if day.date == slot.date => day.slots.push(slot),
            _ => days.push(DaySchedule { date: slot.date, slots: vec![slot] }),
        }
    }
    days
}
