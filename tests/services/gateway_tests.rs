//! Gateway HTTP tests with the engines unreachable.

use actix_web::{App, test};
use submission_checker_lib::startup;

use super::test_helpers::*;

macro_rules! gateway_app {
    ($storage_url:expr, $analysis_url:expr) => {{
        let service = submission_service($storage_url, $analysis_url);
        let limits = gateway_limits();
        test::init_service(
            App::new().configure(move |cfg| startup::configure_gateway(cfg, service, limits)),
        )
        .await
    }};
}

#[actix_rt::test]
async fn test_submit_validates_before_calling_storage() {
    let app = gateway_app!(&closed_url(), &closed_url());

    let body = multipart_body(&[("assignment_id", "a1")], Some(("a.txt", b"abc")));
    let (status, body) = call_json(&app, multipart_request("/submit", body).to_request()).await;

    assert_eq!(status, 400);
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(body["message"].as_str().unwrap().contains("student_id"));
}

#[actix_rt::test]
async fn test_submit_rejects_oversized_file() {
    let app = gateway_app!(&closed_url(), &closed_url());

    let data = vec![b'x'; MAX_UPLOAD_SIZE + 1];
    let req = submission_request("/submit", "s1", "a1", "big.txt", &data).to_request();
    let (status, _) = call_json(&app, req).await;

    assert_eq!(status, 413);
}

#[actix_rt::test]
async fn test_submit_with_storage_down_is_unavailable() {
    let app = gateway_app!(&closed_url(), &closed_url());

    let req = submission_request("/submit", "s1", "a1", "a.txt", b"hello world").to_request();
    let (status, body) = call_json(&app, req).await;

    assert_eq!(status, 503);
    assert_eq!(body["error"], "SERVICE_UNAVAILABLE");
    assert!(body["details"].is_string());
}

#[actix_rt::test]
async fn test_report_lookup_with_analysis_down_is_unavailable() {
    let app = gateway_app!(&closed_url(), &closed_url());

    let req = test::TestRequest::get().uri("/reports/report-abc").to_request();
    let (status, body) = call_json(&app, req).await;

    assert_eq!(status, 503);
    assert_eq!(body["error"], "SERVICE_UNAVAILABLE");
}

#[actix_rt::test]
async fn test_health_is_ok_even_when_engines_are_down() {
    let app = gateway_app!(&closed_url(), &closed_url());

    let (status, body) = call_json(&app, test::TestRequest::get().uri("/health").to_request()).await;

    assert_eq!(status, 200);
    assert_eq!(body["status"], "OK");
    assert_eq!(body["gateway"], "healthy");
    assert_eq!(body["file_storage"], "unhealthy");
    assert_eq!(body["file_analysis"], "unhealthy");
}
