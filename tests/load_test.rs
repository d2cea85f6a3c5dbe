//! Load testing for the gateway.

use std::time::Instant;

use serde_json::json;

mod common;

#[tokio::test]
async fn test_load_performance() {
    // 1. Setup Mock Backend
    let backend = common::start_programmable_backend(|_| async move {
        let line: Vec<[f64; 2]> = (0..200).map(|i| [-97.9 + i as f64 * 0.001, 30.2 + i as f64 * 0.001]).collect();
        (200, json!({ "trips": [{}], "line": { "coordinates": line } }).to_string())
    })
    .await;

    // 2. Start Gateway
    let gateway = common::start_gateway(common::config_for(backend)).await;

    // 3. Run Load Test
    let concurrency = 20;
    let requests_per_task = 25;
    let total_requests = concurrency * requests_per_task;

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let start = Instant::now();

    let mut handles = Vec::new();
    for _ in 0..concurrency {
        let client = client.clone();
        let url = gateway.url("/api/location/latest");
        handles.push(tokio::spawn(async move {
            let mut ok = 0;
            for _ in 0..requests_per_task {
                if let Ok(res) = client.get(&url).send().await {
                    if res.status().is_success() {
                        let body: serde_json::Value = res.json().await.unwrap();
                        // The whole line sits inside the Austin box.
                        assert_eq!(body["line"]["coordinates"].as_array().unwrap().len(), 1);
                        ok += 1;
                    }
                }
            }
            ok
        }));
    }

    let mut success_count = 0;
    for handle in handles {
        success_count += handle.await.unwrap();
    }

    let duration = start.elapsed();
    println!(
        "Completed {} requests in {:?} ({:.0} req/s)",
        total_requests,
        duration,
        total_requests as f64 / duration.as_secs_f64()
    );

    assert_eq!(success_count, total_requests, "All requests should succeed");

    gateway.shutdown.trigger();
}
