//! Metrics endpoint integration tests.
//!
//! Drives traffic through a real server and checks what `/metrics` reports.

use goapp_test_utils::TestGoappServer;
use std::time::Duration;
use tokio::task::JoinSet;

const HOME: &[(&str, &str)] = &[("handler", "home")];
const CONTACT: &[(&str, &str)] = &[("handler", "contact")];

/// Test that the counter equals the number of completed requests across both
/// endpoints, and each histogram series counts only its own handler.
#[tokio::test]
async fn test_counter_and_histogram_track_requests() -> Result<(), anyhow::Error> {
    let server = TestGoappServer::spawn().await?;

    for _ in 0..3 {
        assert_eq!(server.get("/").await?.status(), 200);
    }
    for _ in 0..2 {
        assert_eq!(server.get("/contact").await?.status(), 200);
    }

    let scrape = server.scrape().await?;
    assert_eq!(scrape.value("goapp_http_requests_total", &[]), Some(5.0));
    assert_eq!(
        scrape.value("goapp_http_requests_duration_count", HOME),
        Some(3.0)
    );
    assert_eq!(
        scrape.value("goapp_http_requests_duration_count", CONTACT),
        Some(2.0)
    );

    // Every home observation is below 1s, so the 1s bucket holds all of them
    assert_eq!(
        scrape.value(
            "goapp_http_requests_duration_bucket",
            &[("handler", "home"), ("le", "1")]
        ),
        Some(3.0)
    );

    Ok(())
}

/// Test that scraping does not count as a request.
#[tokio::test]
async fn test_scrapes_are_not_counted() -> Result<(), anyhow::Error> {
    let server = TestGoappServer::spawn().await?;

    for _ in 0..3 {
        server.scrape().await?;
    }

    let scrape = server.scrape().await?;
    assert_eq!(scrape.value("goapp_http_requests_total", &[]), Some(0.0));

    Ok(())
}

/// Test that the online users gauge is refreshed and stays in [0, 2000).
#[tokio::test]
async fn test_online_users_gauge_in_range() -> Result<(), anyhow::Error> {
    let server = TestGoappServer::spawn().await?;

    let mut seen = Vec::new();
    for _ in 0..10 {
        tokio::time::sleep(Duration::from_millis(25)).await;
        let scrape = server.scrape().await?;
        let value = scrape
            .value("goapp_online_users", &[("course", "fullcycle")])
            .ok_or_else(|| anyhow::anyhow!("gauge missing from scrape"))?;
        assert!((0.0..2000.0).contains(&value), "out of range: {value}");
        seen.push(value);
    }

    seen.dedup();
    assert!(seen.len() > 1, "gauge should change between scrapes");

    Ok(())
}

/// Test that 100 concurrent requests split across both endpoints are all counted.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_are_not_lost() -> Result<(), anyhow::Error> {
    let server = TestGoappServer::spawn().await?;
    let client = reqwest::Client::new();

    let mut requests = JoinSet::new();
    for i in 0..100 {
        let client = client.clone();
        let path = if i % 2 == 0 { "/" } else { "/contact" };
        let url = format!("{}{}", server.url(), path);
        requests.spawn(async move { client.get(url).send().await.map(|r| r.status()) });
    }
    while let Some(result) = requests.join_next().await {
        assert_eq!(result??, 200);
    }

    let scrape = server.scrape().await?;
    assert_eq!(scrape.value("goapp_http_requests_total", &[]), Some(100.0));
    assert_eq!(
        scrape.value("goapp_http_requests_duration_count", HOME),
        Some(50.0)
    );
    assert_eq!(
        scrape.value("goapp_http_requests_duration_count", CONTACT),
        Some(50.0)
    );

    Ok(())
}

/// Test that `/metrics` exposes exactly one series per declared family, plus
/// bucket/sum/count per handler label for the histogram.
#[tokio::test]
async fn test_exposition_shape() -> Result<(), anyhow::Error> {
    let server = TestGoappServer::spawn().await?;
    server.get("/").await?;
    server.get("/contact").await?;

    let response = server.get("/metrics").await?;
    assert_eq!(response.status(), 200);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    assert!(
        content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("text/plain")),
        "Expected text/plain content type, got {:?}",
        content_type
    );

    let scrape = goapp_test_utils::Scrape::parse(&response.text().await?)?;

    assert_eq!(
        scrape.types.get("goapp_online_users").map(String::as_str),
        Some("gauge")
    );
    assert_eq!(
        scrape.types.get("goapp_http_requests_total").map(String::as_str),
        Some("counter")
    );
    assert_eq!(
        scrape
            .types
            .get("goapp_http_requests_duration")
            .map(String::as_str),
        Some("histogram")
    );

    assert_eq!(scrape.series("goapp_online_users").len(), 1);
    assert_eq!(scrape.series("goapp_http_requests_total").len(), 1);
    assert_eq!(scrape.series("goapp_http_requests_duration_sum").len(), 2);
    assert_eq!(scrape.series("goapp_http_requests_duration_count").len(), 2);

    // 11 finite buckets plus +Inf, per handler
    let buckets = scrape.series("goapp_http_requests_duration_bucket");
    assert_eq!(buckets.len(), 24);
    for handler in ["home", "contact"] {
        assert_eq!(
            buckets
                .iter()
                .filter(|s| s.labels.get("handler").map(String::as_str) == Some(handler))
                .count(),
            12
        );
    }

    Ok(())
}
