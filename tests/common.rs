use lesson_booking::{
    api::router::create_router,
    state::AppState,
    config::{Config, ConflictPolicy},
    infra::{
        clock::FixedClock,
        repositories::{
            sqlite_attendance_repo::SqliteAttendanceRepo,
            sqlite_availability_repo::SqliteAvailabilityRepo,
            sqlite_booking_repo::SqliteBookingRepo,
            sqlite_user_repo::SqliteUserRepo,
        },
    },
    domain::{models::user::UserRole, ports::{SignatureStore, UserRepository}},
    error::AppError,
};
use sqlx::{sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions}, Pool, Sqlite};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tower::ServiceExt;
use serde_json::Value;

/// Local date of the fixed test clock in Asia/Seoul.
#[allow(dead_code)]
pub const TODAY: &str = "2025-10-31";

#[derive(Default)]
pub struct MockSignatureStore {
    pub blobs: Mutex<HashMap<String, Vec<u8>>>,
}

#[async_trait]
impl SignatureStore for MockSignatureStore {
    async fn put(&self, key: &str, _content_type: &str, bytes: &[u8]) -> Result<String, AppError> {
        self.blobs.lock().unwrap().insert(key.to_string(), bytes.to_vec());
        Ok(format!("/signatures/{}", key))
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.blobs.lock().unwrap().remove(key);
        Ok(())
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub signatures: Arc<MockSignatureStore>,
    pub teacher_id: i64,
    pub other_teacher_id: i64,
    pub student_id: i64,
    pub other_student_id: i64,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        Self::with_policy(ConflictPolicy::Warn).await
    }

    pub async fn with_policy(policy: ConflictPolicy) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(10));

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            timezone: chrono_tz::Asia::Seoul,
            approval_conflict_policy: policy,
            signature_dir: "./unused".to_string(),
            signature_base_url: "/signatures".to_string(),
            max_signature_bytes: 64 * 1024,
        };

        // 12:00 in Seoul
        let clock = Arc::new(FixedClock {
            now: Utc.with_ymd_and_hms(2025, 10, 31, 3, 0, 0).unwrap(),
            tz: chrono_tz::Asia::Seoul,
        });

        let user_repo = Arc::new(SqliteUserRepo::new(pool.clone()));
        let now = Utc::now();
        let teacher_id = user_repo.create("Teacher Kim", UserRole::Teacher, now).await.unwrap().id;
        let other_teacher_id = user_repo.create("Teacher Lee", UserRole::Teacher, now).await.unwrap().id;
        let student_id = user_repo.create("Alice", UserRole::Student, now).await.unwrap().id;
        let other_student_id = user_repo.create("Bob", UserRole::Student, now).await.unwrap().id;

        let signatures = Arc::new(MockSignatureStore::default());

        let state = Arc::new(AppState::new(
            config,
            Arc::new(SqliteBookingRepo::new(pool.clone())),
            Arc::new(SqliteAvailabilityRepo::new(pool.clone())),
            Arc::new(SqliteAttendanceRepo::new(pool.clone())),
            user_repo,
            signatures.clone(),
            clock,
        ));

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            signatures,
            teacher_id,
            other_teacher_id,
            student_id,
            other_student_id,
        }
    }

    /// Sends a request through the router and returns the status with the parsed JSON body.
    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self.router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, json)
    }

    /// Posts a candidate booking request and returns the new booking id.
    pub async fn request_booking(&self, student_id: i64, date: &str, slots: &[&str]) -> String {
        let (status, body) = self.send("POST", "/bookings", Some(serde_json::json!({
            "studentId": student_id,
            "teacherId": self.teacher_id,
            "bookingDate": date,
            "suggestedTimeSlots": slots,
        }))).await;
        assert_eq!(status, StatusCode::CREATED, "booking request failed: {}", body);
        body["bookingId"].as_str().unwrap().to_string()
    }

    pub async fn approve(&self, id: &str, slot: &str) -> (StatusCode, Value) {
        self.send("PATCH", &format!("/bookings?id={}&action=approve&selectedTime={}", id, slot), None).await
    }

    pub async fn booking_status(&self, id: &str) -> String {
        let booking = self.state.booking_service.get(id).await.unwrap();
        booking.status.as_str().to_string()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}
