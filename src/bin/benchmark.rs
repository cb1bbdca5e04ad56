use chrono::{Duration as ChronoDuration, Utc};
use colored::*;
use governor::{Quota, RateLimiter};
use hdrhistogram::Histogram;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use uuid::Uuid;

const DURATION_SECS: u64 = 20;
const BURST_SIZE: usize = 50;

struct Target {
    name: &'static str,
    method: &'static str,
    url: String,
    body: Option<Value>,
}

#[tokio::main]
async fn main() {
    let base_url = std::env::var("BENCH_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

    println!("{}", "🚀 Starting Benchmark Suite".bold().green());
    println!("Target URL: {}", base_url);

    let client = Client::builder()
        .pool_max_idle_per_host(1000)
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap();

    if client.get(format!("{}/health", base_url)).send().await.is_err() {
        eprintln!("{}", format!("❌ Server is NOT reachable at {}. Please start it first.", base_url).red().bold());
        return;
    }

    // Random ids keep repeated runs from reusing each other's bookings.
    let teacher_id: i64 = 1_000_000 + (Uuid::new_v4().as_u128() % 1_000_000) as i64;
    let date = (Utc::now() + ChronoDuration::days(7)).date_naive().to_string();

    println!("\n{}", "⚙️  Setting up benchmark data...".yellow());
    setup_schedule(&client, &base_url, teacher_id, &date).await;
    println!("{}", "✅ Data created successfully.".green());
    println!("   Teacher ID: {}", teacher_id);
    println!("   Date:       {}", date);

    let targets = vec![
        Target {
            name: "Health Check",
            method: "GET",
            url: format!("{}/health", base_url),
            body: None,
        },
        Target {
            name: "Teacher Schedule (Read)",
            method: "GET",
            url: format!("{}/schedule?teacherId={}&startDate={}", base_url, teacher_id, date),
            body: None,
        },
        Target {
            name: "Booking Listing (Join)",
            method: "GET",
            url: format!("{}/bookings?teacherId={}", base_url, teacher_id),
            body: None,
        },
        Target {
            name: "Instant Booking (Idempotent Write)",
            method: "POST",
            url: format!("{}/bookings/instant", base_url),
            body: Some(json!({
                "studentId": 1,
                "teacherId": teacher_id,
                "bookingDate": date,
                "timeSlot": "20:00"
            })),
        },
    ];

    let rps_stages = vec![10, 50, 200, 1000];

    for target in targets {
        println!("\n{}", "=".repeat(60));
        println!("Benchmarking Endpoint: {}", target.name.cyan().bold());
        println!("URL: {}", target.url);
        println!("{}", "=".repeat(60));

        println!("{:<10} | {:<15} | {:<15} | {:<15}", "RPS", "Mean (ms)", "P99 (ms)", "Success Rate");
        println!("{:-<10}-+-{:-<15}-+-{:-<15}-+-{:-<15}", "", "", "", "");

        for &rps in &rps_stages {
            run_stage(&client, &target, rps).await;
        }
    }

    verify_instant_burst(&client, &base_url, teacher_id, &date).await;
}

async fn setup_schedule(client: &Client, base_url: &str, teacher_id: i64, date: &str) {
    let res = client.post(format!("{}/schedule", base_url))
        .json(&json!({
            "teacherId": teacher_id,
            "date": date,
            "timeSlots": ["18:00", "19:00", "20:00", "21:00"]
        }))
        .send()
        .await
        .expect("Failed to send schedule request");

    if !res.status().is_success() {
        let status = res.status();
        let txt = res.text().await.unwrap_or_default();
        panic!("Failed to create schedule. Status: {}. Body: {}", status, txt);
    }
}

/// Fires identical instant bookings at once; exactly one may report `isNew`.
async fn verify_instant_burst(client: &Client, base_url: &str, teacher_id: i64, date: &str) {
    println!("\n{}", "=".repeat(60));
    println!("Idempotence check: {} concurrent identical instant bookings", BURST_SIZE);
    println!("{}", "=".repeat(60));

    let body = json!({
        "studentId": 2,
        "teacherId": teacher_id,
        "bookingDate": date,
        "timeSlot": "21:00"
    });

    let mut set = JoinSet::new();
    for _ in 0..BURST_SIZE {
        let client = client.clone();
        let url = format!("{}/bookings/instant", base_url);
        let body = body.clone();
        set.spawn(async move {
            let res = client.post(&url).json(&body).send().await.ok()?;
            let status = res.status();
            let json: Value = res.json().await.ok()?;
            Some((status, json["bookingId"].as_str().map(str::to_string), json["isNew"].as_bool()))
        });
    }

    let mut created = 0;
    let mut failed = 0;
    let mut ids = std::collections::HashSet::new();
    while let Some(joined) = set.join_next().await {
        match joined.ok().flatten() {
            Some((status, Some(id), Some(is_new))) if status.is_success() => {
                if is_new {
                    created += 1;
                    assert_eq!(status, StatusCode::CREATED);
                }
                ids.insert(id);
            }
            _ => failed += 1,
        }
    }

    if created == 1 && ids.len() == 1 {
        println!("{}", format!("✅ One booking created, {} failed calls", failed).green().bold());
    } else {
        println!("{}", format!("❌ {} bookings reported new across {} distinct ids", created, ids.len()).red().bold());
    }
}

async fn run_stage(client: &Client, target: &Target, rps: u32) {
    let limiter = Arc::new(RateLimiter::direct(
        Quota::per_second(NonZeroU32::new(rps).unwrap())
    ));

    let (tx, mut rx) = mpsc::channel(50000);
    let start_time = Instant::now();
    let duration = Duration::from_secs(DURATION_SECS);

    loop {
        if start_time.elapsed() > duration {
            break;
        }

        if limiter.check().is_ok() {
            let client = client.clone();
            let url = target.url.clone();
            let body = target.body.clone();
            let method = target.method;
            let tx = tx.clone();

            tokio::spawn(async move {
                let req_start = Instant::now();
                let res = match method {
                    "POST" => {
                        let mut req = client.post(&url);
                        if let Some(b) = body {
                            req = req.json(&b);
                        }
                        req.send().await
                    },
                    _ => client.get(&url).send().await,
                };
                let latency = req_start.elapsed();

                let success = match res {
                    Ok(r) => r.status().is_success(),
                    Err(_) => false,
                };

                let _ = tx.send((latency, success)).await;
            });
        } else {
            tokio::task::yield_now().await;
        }
    }

    drop(tx);

    let mut histogram = Histogram::<u64>::new(3).unwrap();
    let mut successes = 0;
    let mut total = 0;

    while let Some((latency, success)) = rx.recv().await {
        total += 1;
        if success { successes += 1; }
        histogram.record(latency.as_micros() as u64).unwrap();
    }

    let mean_ms = histogram.mean() / 1000.0;
    let p99_ms = histogram.value_at_quantile(0.99) as f64 / 1000.0;
    let success_rate = if total > 0 { (successes as f64 / total as f64) * 100.0 } else { 0.0 };

    println!(
        "{:<10} | {:<15.2} | {:<15.2} | {:<14.1}%",
        rps,
        mean_ms,
        p99_ms,
        success_rate
    );

    tokio::time::sleep(Duration::from_millis(500)).await;
}
