//! Integration tests for the scraping platform's HTTP surface.
//!
//! Exercises the router end-to-end via `tower::ServiceExt::oneshot`, the
//! same way `api-gateway/tests/integration_tests.rs` drives its router.
//! Requires a reachable Redis at `REDIS_HOST`/`REDIS_PORT` (defaults to
//! `127.0.0.1:6379`), matching that suite's assumption of a reachable test
//! database rather than mocking the queue.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use scraping_api::{build_router, AppState, Config};

async fn test_state() -> AppState {
    AppState::new(Config::default())
        .await
        .expect("failed to build AppState against a local Redis instance")
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

fn multipart_body(boundary: &str, filename: &str, csv: &str) -> Vec<u8> {
    format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
         Content-Type: text/csv\r\n\r\n\
         {csv}\r\n--{boundary}--\r\n"
    )
    .into_bytes()
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let app = build_router(test_state().await);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn upload_without_file_part_is_bad_request() {
    let app = build_router(test_state().await);
    let boundary = "X-BOUNDARY-1";
    let body = format!("--{boundary}--\r\n");

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/scraping-batch")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "missing_file");
}

#[tokio::test]
async fn upload_with_non_csv_suffix_is_bad_request() {
    let app = build_router(test_state().await);
    let boundary = "X-BOUNDARY-2";
    let body = multipart_body(boundary, "records.txt", "name,address\nAcme,Main St 1\n");

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/scraping-batch")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "wrong_suffix");
}

#[tokio::test]
async fn status_for_unknown_batch_is_not_found() {
    let app = build_router(test_state().await);
    let unknown = Uuid::new_v4();

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/scraping-batch/{unknown}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn export_for_unknown_batch_is_not_found() {
    let app = build_router(test_state().await);
    let unknown = Uuid::new_v4();

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/scraping-batch/{unknown}/export"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Mirrors the "ingest consistency" seed test in the invariant list: the
/// upload reply's `jobsCreated` must equal the number of jobs the status
/// endpoint reports for that batch, observable immediately after the reply.
#[tokio::test]
async fn upload_reply_job_count_matches_observable_batch_total() {
    let app = build_router(test_state().await);
    let boundary = "X-BOUNDARY-3";
    let csv = "name,address,city,postcode\n\
               Acme Bakery,Bahnhofstrasse 1,Zürich,8001\n\
               Müller Bäckerei,Marktgasse 2,Bern,3000\n";
    let body = multipart_body(boundary, "batch.csv", csv);

    let upload_response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/scraping-batch")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(upload_response.status(), StatusCode::OK);
    let upload_body = json_body(upload_response).await;
    assert_eq!(upload_body["jobsCreated"], 2);
    assert_eq!(upload_body["encoding"], "utf-8");
    assert_eq!(upload_body["bomRemoved"], false);

    let batch_id = upload_body["batchId"].as_str().unwrap();
    let status_response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/scraping-batch/{batch_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(status_response.status(), StatusCode::OK);
    let status_body = json_body(status_response).await;
    assert_eq!(status_body["total"], 2);
}
