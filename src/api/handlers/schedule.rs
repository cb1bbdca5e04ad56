use axum::{extract::State, response::IntoResponse, Json};
use crate::api::extractors::{json::ValidJson, query::ValidQuery};
use crate::state::AppState;
use crate::api::dtos::requests::{parse_id, required, ReplaceScheduleRequest, ScheduleQuery};
use crate::api::dtos::responses::ScheduleResponse;
use crate::domain::models::availability::DaySchedule;
use crate::domain::services::slot_label;
use crate::error::AppError;
use std::sync::Arc;

pub async fn replace_schedule(
    State(state): State<Arc<AppState>>,
    ValidJson(payload): ValidJson<ReplaceScheduleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let teacher_id = required(payload.teacher_id, "teacherId")?;

    let days: Vec<(String, Vec<String>)> = match (payload.schedules, payload.date) {
        (Some(schedules), None) => schedules
            .into_iter()
            .map(|day| Ok((required(day.date, "schedules[].date")?, day.time_slots.unwrap_or_default())))
            .collect::<Result<_, AppError>>()?,
        (None, Some(date)) => vec![(date, required(payload.time_slots, "timeSlots")?)],
        (Some(_), Some(_)) => return Err(AppError::Validation("Send either date or schedules, not both".into())),
        (None, None) => return Err(AppError::Validation("date or schedules is required".into())),
    };

    let schedules = state.availability_service.replace(teacher_id, days).await?;
    Ok(Json(ScheduleResponse { teacher_id, schedules }))
}

pub async fn get_schedule(
    State(state): State<Arc<AppState>>,
    ValidQuery(query): ValidQuery<ScheduleQuery>,
) -> Result<impl IntoResponse, AppError> {
    let teacher_id = required(parse_id(query.teacher_id.as_deref(), "teacherId")?, "teacherId")?;

    let schedules = match query.date.as_deref() {
        Some(date) => {
            let day = slot_label::parse_date(date, "date")?;
            let slots = state.availability_service.get_day(teacher_id, date).await?;
            vec![DaySchedule { date: day, slots }]
        }
        None => state.availability_service
            .get_range(teacher_id, query.start_date.as_deref(), query.end_date.as_deref())
            .await?,
    };

    Ok(Json(ScheduleResponse { teacher_id, schedules }))
}
