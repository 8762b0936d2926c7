use std::time::Duration;

use jobwatch_core::{FetchFailure, HistoryEntry, JobHandle, JobStatus, ProgressSnapshot};
use jobwatch_engine::{ClientSettings, FailureKind, ReqwestStatusClient, StatusClient};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ReqwestStatusClient {
    let settings = ClientSettings::new(&format!("{}/api", server.uri())).expect("settings");
    ReqwestStatusClient::new(settings).expect("client")
}

#[tokio::test]
async fn decodes_progress_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/progress/stocks_20240101"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{
                "status": "running",
                "current": 3,
                "total": 10,
                "success_count": 2,
                "failed_count": 1,
                "phase": "Phase 2",
                "current_item": "005930",
                "items_history": [
                    {"index": 0, "item": "000660", "success": true, "timestamp": "2024-01-01T10:00:00"}
                ],
                "error_message": null,
                "description": "Stock refresh"
            }"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let snapshot = client_for(&server)
        .fetch_progress(&JobHandle::from("stocks_20240101"))
        .await
        .expect("fetch ok");

    assert_eq!(
        snapshot,
        ProgressSnapshot {
            status: JobStatus::Running,
            current: 3,
            total: 10,
            success_count: 2,
            failed_count: 1,
            phase: Some("Phase 2".into()),
            current_item: Some("005930".into()),
            items_history: vec![HistoryEntry {
                index: 0,
                item: "000660".into(),
                success: true,
                timestamp: Some("2024-01-01T10:00:00".into()),
            }],
            error_message: None,
            description: Some("Stock refresh".into()),
        }
    );
}

#[tokio::test]
async fn missing_job_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/progress/etf_1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_progress(&JobHandle::from("etf_1"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::NotFound);
    assert_eq!(err.to_failure(), FetchFailure::NotFound);
}

#[tokio::test]
async fn server_error_is_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/progress/etf_1"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_progress(&JobHandle::from("etf_1"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(502));
    assert_eq!(
        err.to_failure(),
        FetchFailure::Transient("http status 502".into())
    );
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/progress/etf_1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html>", "text/html"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_progress(&JobHandle::from("etf_1"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/progress/etf_1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_raw("{}", "application/json"),
        )
        .mount(&server)
        .await;

    let settings = ClientSettings {
        request_timeout: Duration::from_millis(50),
        ..ClientSettings::new(&server.uri()).unwrap()
    };
    let client = ReqwestStatusClient::new(settings).unwrap();
    let err = client
        .fetch_progress(&JobHandle::from("etf_1"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}
