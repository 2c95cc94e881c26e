//! Integration tests for `BarberCollector`.
//!
//! Each test stands up a `wiremock` server serving store pages so no real
//! network traffic is made. Covers successful reads, the `-` sentinel,
//! selector misses, HTTP failures, mock mode, and target filtering.

use chrono::{NaiveDate, NaiveDateTime};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use waitwatch_core::{
    DelayWindow, ScrapeStatus, Selector, SelectorKind, StoreTarget, TabularRecord,
};
use waitwatch_scraper::{BarberCollector, HttpClient};

const NO_DELAY: DelayWindow = DelayWindow {
    min_secs: 0.0,
    max_secs: 0.0,
};

fn test_client() -> HttpClient {
    HttpClient::new(5, "waitwatch-test/0.1", 0, 0).expect("failed to build test HttpClient")
}

fn collector(mock_mode: bool) -> BarberCollector {
    BarberCollector::new(test_client(), NO_DELAY, mock_mode)
}

fn target(id: &str, url: String, kind: &str) -> StoreTarget {
    StoreTarget {
        id: id.to_string(),
        name: format!("Shop {id}"),
        area: "Nagoya".to_string(),
        url,
        selector: Selector {
            kind: SelectorKind::Class,
            value: "waiting-view__number".to_string(),
        },
        weather_area_code: Some("230000".to_string()),
        kind: kind.to_string(),
    }
}

fn page(number: &str) -> String {
    format!(
        r#"<html><body><div class="waiting-view"><span class="waiting-view__number">{number}</span></div></body></html>"#
    )
}

fn noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 4)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

async fn serve(server: &MockServer, route: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn reads_wait_count_from_page() {
    let server = MockServer::start().await;
    serve(&server, "/shop1", ResponseTemplate::new(200).set_body_string(page("3組"))).await;

    let store = target("store_001", format!("{}/shop1", server.uri()), "barber");
    let record = collector(false).collect_store(&store, noon()).await;

    assert_eq!(record.wait_count, Some(3));
    assert_eq!(record.status, ScrapeStatus::Success);
    assert_eq!(record.store_id, "store_001");
    assert_eq!(record.timestamp, noon());

    let row = record.to_row();
    assert_eq!(row[0], "2024-05-04 12:00:00");
    assert_eq!(row[5], "3");
    assert_eq!(row[7], "Saturday");
    assert_eq!(row[10], "true");
    assert_eq!(row[11], "success");
}

#[tokio::test]
async fn dash_reads_as_zero() {
    let server = MockServer::start().await;
    serve(&server, "/shop1", ResponseTemplate::new(200).set_body_string(page("-"))).await;

    let store = target("store_001", format!("{}/shop1", server.uri()), "barber");
    let record = collector(false).collect_store(&store, noon()).await;

    assert_eq!(record.wait_count, Some(0));
    assert_eq!(record.status, ScrapeStatus::Success);
}

#[tokio::test]
async fn element_without_digits_is_success_with_null_count() {
    let server = MockServer::start().await;
    serve(&server, "/shop1", ResponseTemplate::new(200).set_body_string(page("受付終了"))).await;

    let store = target("store_001", format!("{}/shop1", server.uri()), "barber");
    let record = collector(false).collect_store(&store, noon()).await;

    assert_eq!(record.wait_count, None);
    assert_eq!(record.status, ScrapeStatus::Success);
}

#[tokio::test]
async fn missing_element_is_extract_error() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/shop1",
        ResponseTemplate::new(200).set_body_string("<html><body>closed</body></html>"),
    )
    .await;

    let store = target("store_001", format!("{}/shop1", server.uri()), "barber");
    let record = collector(false).collect_store(&store, noon()).await;

    assert_eq!(record.wait_count, None);
    assert!(
        matches!(record.status, ScrapeStatus::Error { kind: "extract", .. }),
        "expected extract error, got: {:?}",
        record.status
    );
    assert!(record.to_row()[11].starts_with("extract_error: "));
}

#[tokio::test]
async fn server_error_is_http_error() {
    let server = MockServer::start().await;
    serve(&server, "/shop1", ResponseTemplate::new(500)).await;

    let store = target("store_001", format!("{}/shop1", server.uri()), "barber");
    let record = collector(false).collect_store(&store, noon()).await;

    assert_eq!(record.wait_count, None);
    assert!(
        matches!(record.status, ScrapeStatus::Error { kind: "http", .. }),
        "expected http error, got: {:?}",
        record.status
    );
    assert_eq!(record.to_row()[5], "");
}

#[tokio::test]
async fn mock_mode_makes_no_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page("1")))
        .expect(0)
        .mount(&server)
        .await;

    let store = target("store_001", format!("{}/shop1", server.uri()), "barber");
    let record = collector(true).collect_store(&store, noon()).await;

    assert_eq!(record.status, ScrapeStatus::Mock);
    let count = record.wait_count.expect("mock mode always produces a count");
    assert!((3..=15).contains(&count), "noon count out of band: {count}");
}

#[tokio::test]
async fn collect_all_skips_non_barber_targets_and_keeps_order() {
    let server = MockServer::start().await;
    serve(&server, "/a", ResponseTemplate::new(200).set_body_string(page("2"))).await;
    serve(&server, "/b", ResponseTemplate::new(404)).await;
    Mock::given(method("GET"))
        .and(path("/cafe"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page("9")))
        .expect(0)
        .mount(&server)
        .await;

    let targets = vec![
        target("a", format!("{}/a", server.uri()), "barber"),
        target("cafe", format!("{}/cafe", server.uri()), "cafe"),
        target("b", format!("{}/b", server.uri()), "barber"),
    ];
    let records = collector(false).collect_all(&targets).await;

    assert_eq!(records.len(), 2, "one record per barber target");
    assert_eq!(records[0].store_id, "a");
    assert_eq!(records[0].wait_count, Some(2));
    assert_eq!(records[1].store_id, "b");
    assert!(records[1].status.is_error());
}

#[tokio::test]
async fn collect_all_with_no_targets_is_empty() {
    let records = collector(false).collect_all(&[]).await;
    assert!(records.is_empty());
}
