use chrono::{NaiveDate, NaiveTime};
use crate::error::AppError;

pub fn parse_date(raw: &str, field: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid {} (expected YYYY-MM-DD)", field)))
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").ok()
}

/// Validates a slot label (`HH:MM` or `HH:MM-HH:MM`) and returns it zero-padded,
/// so labels compare and sort consistently.
pub fn normalize_time_slot(raw: &str) -> Result<String, AppError> {
    let invalid = || AppError::Validation(format!("Invalid time slot '{}' (expected HH:MM or HH:MM-HH:MM)", raw.trim()));

    match raw.split_once('-') {
        Some((start, end)) => {
            let start = parse_time(start).ok_or_else(invalid)?;
            let end = parse_time(end).ok_or_else(invalid)?;
            if end <= start {
                return Err(AppError::Validation(format!("Time slot '{}' must end after it starts", raw.trim())));
            }
            Ok(format!("{}-{}", start.format("%H:%M"), end.format("%H:%M")))
        }
        None => {
            let start = parse_time(raw).ok_or_else(invalid)?;
            Ok(start.format("%H:%M").to_string())
        }
    }
}

/// Normalizes every label and drops repeats, keeping first-seen order.
pub fn normalize_slots(raw: &[String]) -> Result<Vec<String>, AppError> {
    let mut slots: Vec<String> = Vec::with_capacity(raw.len());
    for label in raw {
        let label = normalize_time_slot(label)?;
        if !slots.contains(&label) {
            slots.push(label);
        }
    }
    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_and_range_labels() {
        assert_eq!(normalize_time_slot("20:00").unwrap(), "20:00");
        assert_eq!(normalize_time_slot(" 9:30 ").unwrap(), "09:30");
        assert_eq!(normalize_time_slot("19:00-20:00").unwrap(), "19:00-20:00");
        assert_eq!(normalize_time_slot("19:00 - 20:30").unwrap(), "19:00-20:30");
    }

    #[test]
    fn test_rejects_malformed_labels() {
        for bad in ["", "25:00", "evening", "20:00-19:00", "19:00-19:00", "19:00-"] {
            assert!(
                matches!(normalize_time_slot(bad), Err(AppError::Validation(_))),
                "expected '{}' to be rejected", bad
            );
        }
    }

    #[test]
    fn test_normalize_slots_dedupes_in_order() {
        let raw = vec!["20:00".to_string(), "19:00".to_string(), "20:00".to_string()];
        assert_eq!(normalize_slots(&raw).unwrap(), vec!["20:00", "19:00"]);
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2025-11-01", "bookingDate").unwrap(), NaiveDate::from_ymd_opt(2025, 11, 1).unwrap());
        assert!(parse_date("11/01/2025", "bookingDate").is_err());
    }
}
