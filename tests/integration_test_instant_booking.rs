mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::{TestApp, TODAY};
use serde_json::{json, Value};
use std::collections::HashSet;
use tokio::task::JoinSet;
use tower::ServiceExt;

fn walk_in(app: &TestApp, student_id: i64, slot: &str) -> Value {
    json!({
        "studentId": student_id,
        "teacherId": app.teacher_id,
        "bookingDate": "2025-11-01",
        "timeSlot": slot,
    })
}

#[tokio::test]
async fn test_repeated_calls_return_the_same_booking() {
    let app = TestApp::new().await;

    let (status, first) = app.send("POST", "/bookings/instant", Some(walk_in(&app, app.student_id, "20:00"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["isNew"], true);
    assert_eq!(first["booking"]["status"], "approved");
    assert_eq!(first["booking"]["timeSlot"], "20:00");

    let (status, second) = app.send("POST", "/bookings/instant", Some(walk_in(&app, app.student_id, "20:00"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["isNew"], false);
    assert_eq!(second["bookingId"], first["bookingId"]);

    let (_, list) = app.send("GET", &format!("/bookings?studentId={}", app.student_id), None).await;
    assert_eq!(list["bookings"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_cancelled_booking_is_not_reused() {
    let app = TestApp::new().await;

    let (_, first) = app.send("POST", "/bookings/instant", Some(walk_in(&app, app.student_id, "20:00"))).await;
    let first_id = first["bookingId"].as_str().unwrap().to_string();

    let (status, _) = app.send("DELETE", &format!("/bookings?id={}", first_id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, again) = app.send("POST", "/bookings/instant", Some(walk_in(&app, app.student_id, "20:00"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(again["isNew"], true);
    assert_ne!(again["bookingId"], first_id.as_str());
    assert_eq!(app.booking_status(&first_id).await, "cancelled");
}

#[tokio::test]
async fn test_completed_booking_is_reused() {
    let app = TestApp::new().await;

    let (_, first) = app.send("POST", "/bookings/instant", Some(walk_in(&app, app.student_id, "20:00"))).await;
    let id = first["bookingId"].as_str().unwrap().to_string();
    let (status, _) = app.send("POST", "/attendance", Some(json!({"sessionId": "s-20", "bookingId": id}))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, again) = app.send("POST", "/bookings/instant", Some(walk_in(&app, app.student_id, "20:00"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["bookingId"], id.as_str());
    assert_eq!(again["booking"]["status"], "completed");
}

#[tokio::test]
async fn test_date_defaults_to_local_today() {
    let app = TestApp::new().await;

    let (status, body) = app.send("POST", "/bookings/instant", Some(json!({
        "studentId": app.student_id,
        "teacherId": app.teacher_id,
        "timeSlot": "9:00",
    }))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["booking"]["bookingDate"], TODAY);
    assert_eq!(body["booking"]["timeSlot"], "09:00");
}

#[tokio::test]
async fn test_distinct_keys_create_distinct_bookings() {
    let app = TestApp::new().await;

    let (_, a) = app.send("POST", "/bookings/instant", Some(walk_in(&app, app.student_id, "19:00"))).await;
    let (_, b) = app.send("POST", "/bookings/instant", Some(walk_in(&app, app.student_id, "20:00"))).await;
    let (status, c) = app.send("POST", "/bookings/instant", Some(walk_in(&app, app.other_student_id, "21:00"))).await;

    assert_eq!(status, StatusCode::CREATED);
    let ids: HashSet<&str> = [&a, &b, &c].iter().map(|v| v["bookingId"].as_str().unwrap()).collect();
    assert_eq!(ids.len(), 3);
}

#[tokio::test]
async fn test_walk_in_on_slot_held_by_another_student_is_refused() {
    let app = TestApp::new().await;

    let id = app.request_booking(app.student_id, "2025-11-01", &["19:00"]).await;
    let (status, _) = app.approve(&id, "19:00").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.send("POST", "/bookings/instant", Some(walk_in(&app, app.other_student_id, "19:00"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains(&id));

    let (_, conflicts) = app.send("GET", &format!(
        "/bookings/conflicts?teacherId={}&date=2025-11-01&timeSlot=19:00", app.teacher_id
    ), None).await;
    assert_eq!(conflicts["bookings"].as_array().unwrap().len(), 1);

    // the holder's own walk-in still reuses the approved booking
    let (status, own) = app.send("POST", "/bookings/instant", Some(walk_in(&app, app.student_id, "19:00"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(own["bookingId"], id.as_str());
}

#[tokio::test]
async fn test_concurrent_identical_calls_create_one_booking() {
    let app = TestApp::new().await;
    let payload = walk_in(&app, app.student_id, "21:00").to_string();

    let mut set = JoinSet::new();
    for _ in 0..12 {
        let router = app.router.clone();
        let payload = payload.clone();
        set.spawn(async move {
            let response = router.oneshot(
                Request::builder().method("POST").uri("/bookings/instant")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload)).unwrap()
            ).await.unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body: Value = serde_json::from_slice(&bytes).unwrap();
            (status, body)
        });
    }

    let mut created = 0;
    let mut ids = HashSet::new();
    while let Some(result) = set.join_next().await {
        let (status, body) = result.unwrap();
        assert!(status.is_success(), "unexpected {}: {}", status, body);
        if body["isNew"] == true {
            created += 1;
        }
        ids.insert(body["bookingId"].as_str().unwrap().to_string());
    }

    assert_eq!(created, 1);
    assert_eq!(ids.len(), 1);
}

#[tokio::test]
async fn test_instant_validation() {
    let app = TestApp::new().await;

    let (status, _) = app.send("POST", "/bookings/instant", Some(json!({
        "studentId": app.student_id,
        "teacherId": app.teacher_id,
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.send("POST", "/bookings/instant", Some(json!({
        "studentId": app.student_id,
        "teacherId": app.teacher_id,
        "bookingDate": "tomorrow",
        "timeSlot": "20:00",
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
