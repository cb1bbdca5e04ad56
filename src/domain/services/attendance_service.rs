use std::sync::Arc;
use crate::domain::{
    models::{
        attendance::{Attendance, AttendanceFilter, AttendanceView},
        booking::BookingStatus,
        user::UserRole,
    },
    ports::{AttendanceRepository, BookingRepository, Clock, SignatureStore, UserRepository},
    services::{booking_service::{ensure_transition, LIST_LIMIT}, signature::decode_signature},
};
use crate::error::AppError;
use tracing::{debug, info, warn};

pub struct AttendanceRequest {
    pub session_id: String,
    pub booking_id: Option<String>,
    pub student_name: Option<String>,
    pub signature: Option<String>,
}

/// Records check-ins. A check-in against a booking is the only way a booking completes.
pub struct AttendanceService {
    repo: Arc<dyn AttendanceRepository>,
    booking_repo: Arc<dyn BookingRepository>,
    user_repo: Arc<dyn UserRepository>,
    signatures: Arc<dyn SignatureStore>,
    clock: Arc<dyn Clock>,
    max_signature_bytes: usize,
}

impl AttendanceService {
    pub fn new(
        repo: Arc<dyn AttendanceRepository>,
        booking_repo: Arc<dyn BookingRepository>,
        user_repo: Arc<dyn UserRepository>,
        signatures: Arc<dyn SignatureStore>,
        clock: Arc<dyn Clock>,
        max_signature_bytes: usize,
    ) -> Self {
        Self { repo, booking_repo, user_repo, signatures, clock, max_signature_bytes }
    }

    pub async fn record(&self, request: AttendanceRequest) -> Result<Attendance, AppError> {
        let session_id = request.session_id.trim().to_string();
        if session_id.is_empty() {
            return Err(AppError::Validation("sessionId is required".into()));
        }

        let signature = match request.signature.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(decode_signature(raw, self.max_signature_bytes)?),
            _ => None,
        };

        let booking = match request.booking_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => {
                let booking = self.booking_repo.find_by_id(id).await?
                    .ok_or(AppError::NotFound("Booking not found".into()))?;
                ensure_transition(&booking, BookingStatus::Completed)?;
                Some(booking)
            }
            _ => None,
        };

        let student_id = match &booking {
            Some(booking) => {
                if let Some(name) = &request.student_name {
                    debug!(booking_id = %booking.id, "Ignoring client supplied student name '{}'", name);
                }
                booking.student_id
            }
            None => self.resolve_student(request.student_name.as_deref()).await?,
        };

        let mut attendance = Attendance::new(booking.as_ref().map(|b| b.id.clone()), student_id, session_id, self.clock.now());

        let signature_key = match signature {
            Some(payload) => {
                let key = format!("{}.{}", attendance.id, payload.extension());
                let url = self.signatures.put(&key, &payload.content_type, &payload.bytes).await?;
                attendance.signature_url = Some(url);
                Some(key)
            }
            None => None,
        };

        let result = match &booking {
            Some(booking) => self.repo.create_for_booking(&attendance, &booking.id).await.map(|(created, completed)| {
                info!(booking_id = %completed.id, from = %booking.status, to = %completed.status, "Booking completed by attendance {}", created.id);
                created
            }),
            None => self.repo.create(&attendance).await,
        };

        match result {
            Ok(created) => {
                info!(attendance_id = %created.id, session_id = %created.session_id, student_id = created.student_id, "Attendance recorded");
                Ok(created)
            }
            Err(e) => {
                if let Some(key) = signature_key {
                    if let Err(cleanup) = self.signatures.delete(&key).await {
                        warn!("Failed to remove orphaned signature {}: {}", key, cleanup);
                    }
                }
                Err(e)
            }
        }
    }

    async fn resolve_student(&self, name: Option<&str>) -> Result<i64, AppError> {
        let name = name.map(str::trim).filter(|n| !n.is_empty())
            .ok_or(AppError::Validation("studentName is required when no bookingId is given".into()))?;

        if let Some(student) = self.user_repo.find_student_by_name(name).await? {
            return Ok(student.id);
        }

        let created = self.user_repo.create(name, UserRole::Student, self.clock.now()).await?;
        info!(student_id = created.id, "Created student '{}' from anonymous check-in", name);
        Ok(created.id)
    }

    pub async fn list(&self, filter: &AttendanceFilter) -> Result<Vec<AttendanceView>, AppError> {
        self.repo.list_recent(filter, LIST_LIMIT).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{
        booking::{Booking, BookingFilter, BookingView, NewBookingParams},
        user::User,
    };
    use crate::infra::clock::FixedClock;
    use async_trait::async_trait;
    use base64::{Engine as _, engine::general_purpose};
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct OneBooking(Booking);

    #[async_trait]
    impl BookingRepository for OneBooking {
        async fn create(&self, _: &Booking) -> Result<Booking, AppError> { unreachable!() }
        async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
            Ok(Some(self.0.clone()).filter(|b| b.id == id))
        }
        async fn list_recent(&self, _: &BookingFilter, _: i64) -> Result<Vec<BookingView>, AppError> { unreachable!() }
        async fn list_active_claims(&self, _: i64, _: NaiveDate) -> Result<Vec<Booking>, AppError> { unreachable!() }
        async fn find_active_by_schedule(&self, _: &str, _: NaiveDate) -> Result<Option<Booking>, AppError> { unreachable!() }
        async fn find_latest_live(&self, _: i64, _: i64, _: NaiveDate, _: &str) -> Result<Option<Booking>, AppError> { unreachable!() }
        async fn transition(&self, _: &str, _: BookingStatus, _: BookingStatus) -> Result<Option<Booking>, AppError> { unreachable!() }
        async fn confirm_slot(&self, _: &str, _: &str, _: bool) -> Result<Option<Booking>, AppError> { unreachable!() }
    }

    /// Loses the race: the booking moved on between the read and the write.
    struct RacedAttendance;

    #[async_trait]
    impl AttendanceRepository for RacedAttendance {
        async fn create(&self, _: &Attendance) -> Result<Attendance, AppError> { unreachable!() }
        async fn create_for_booking(&self, _: &Attendance, _: &str) -> Result<(Attendance, Booking), AppError> {
            Err(AppError::Conflict("Booking is no longer approved".into()))
        }
        async fn list_recent(&self, _: &AttendanceFilter, _: i64) -> Result<Vec<AttendanceView>, AppError> { unreachable!() }
    }

    struct NoUsers;

    #[async_trait]
    impl UserRepository for NoUsers {
        async fn create(&self, _: &str, _: UserRole, _: DateTime<Utc>) -> Result<User, AppError> { unreachable!() }
        async fn find_student_by_name(&self, _: &str) -> Result<Option<User>, AppError> { unreachable!() }
    }

    #[derive(Default)]
    struct MemoryStore(Mutex<HashMap<String, Vec<u8>>>);

    #[async_trait]
    impl SignatureStore for MemoryStore {
        async fn put(&self, key: &str, _: &str, bytes: &[u8]) -> Result<String, AppError> {
            self.0.lock().unwrap().insert(key.to_string(), bytes.to_vec());
            Ok(format!("/signatures/{}", key))
        }
        async fn delete(&self, key: &str) -> Result<(), AppError> {
            self.0.lock().unwrap().remove(key);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_signature_removed_when_insert_fails() {
        let now = Utc.with_ymd_and_hms(2025, 11, 1, 11, 0, 0).unwrap();
        let booking = Booking::new(NewBookingParams {
            student_id: 3,
            teacher_id: 1,
            schedule_id: None,
            booking_date: NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
            suggested_time_slots: vec!["20:00".into()],
            time_slot: Some("20:00".into()),
            status: BookingStatus::Approved,
            created_at: now,
        });
        let booking_id = booking.id.clone();
        let store = Arc::new(MemoryStore::default());

        let service = AttendanceService::new(
            Arc::new(RacedAttendance),
            Arc::new(OneBooking(booking)),
            Arc::new(NoUsers),
            store.clone(),
            Arc::new(FixedClock { now, tz: chrono_tz::Asia::Seoul }),
            1024,
        );

        let result = service.record(AttendanceRequest {
            session_id: "s1".into(),
            booking_id: Some(booking_id),
            student_name: None,
            signature: Some(general_purpose::STANDARD.encode(b"sig")),
        }).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert!(store.0.lock().unwrap().is_empty());
    }
}
