//! End-to-end submission scenarios across live engines.

use std::sync::Arc;

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

/// Storage and analysis engines on ephemeral ports.
async fn spawn_engines() -> (StorageFixture, AnalysisFixture, String, String) {
    let storage = storage_fixture().await;
    let storage_url = spawn_storage_engine(&storage);
    let analysis = analysis_fixture(Arc::new(storage_client(&storage_url))).await;
    let analysis_url = spawn_analysis_engine(&analysis);
    (storage, analysis, storage_url, analysis_url)
}

#[actix_rt::test]
async fn test_submit_succeeds_with_analysis_offline() {
    let storage = storage_fixture().await;
    let storage_url = spawn_storage_engine(&storage);
    let app = gateway_app!(&storage_url, &closed_url());

    let req = submission_request("/submit", "s1", "a1", "hello.txt", b"hello world").to_request();
    let (status, body) = call_json(&app, req).await;

    assert_eq!(status, 200, "submission should be accepted: {}", body);
    assert!(body["work_id"].as_str().unwrap().starts_with("work-"));
    let file_id = body["file_id"].as_str().unwrap();
    assert!(body["submitted_at"].is_string());

    let metadata = storage.engine.get_file_metadata(file_id).await.unwrap();
    assert_eq!(metadata.size_bytes, 11);
    assert_eq!(metadata.student_id, "s1");
}

#[actix_rt::test]
async fn test_resubmission_is_flagged_against_first_copy() {
    let (_storage, _analysis, storage_url, analysis_url) = spawn_engines().await;
    let app = gateway_app!(&storage_url, &analysis_url);

    let (status, first) = call_json(
        &app,
        submission_request("/submit", "s1", "a1", "essay.txt", b"the same essay").to_request(),
    )
    .await;
    assert_eq!(status, 200, "{}", first);
    let (status, second) = call_json(
        &app,
        submission_request("/submit", "s1", "a1", "essay.txt", b"the same essay").to_request(),
    )
    .await;
    assert_eq!(status, 200, "{}", second);

    assert_eq!(first["work_id"], second["work_id"]);
    assert_ne!(first["file_id"], second["file_id"]);

    let dup_client = storage_client(&storage_url);
    let duplicates = submission_checker_lib::services::FileContentSource::duplicate_files(
        &dup_client,
        second["file_id"].as_str().unwrap(),
        submission_checker_lib::services::Deadline::after(std::time::Duration::from_secs(5)),
    )
    .await
    .unwrap();
    assert_eq!(duplicates, vec![first["file_id"].as_str().unwrap().to_string()]);

    let req = test::TestRequest::get()
        .uri(&format!("/reports/work/{}", first["work_id"].as_str().unwrap()))
        .to_request();
    let (status, reports) = call_json(&app, req).await;
    assert_eq!(status, 200, "{}", reports);
    assert_eq!(reports["count"], 2);

    let reports = reports["reports"].as_array().unwrap();
    let second_report = reports
        .iter()
        .find(|r| r["file_id"] == second["file_id"])
        .unwrap();
    assert_eq!(second_report["is_plagiarism"], true);
    assert_eq!(second_report["similar_works"][0]["similar_work_id"], first["file_id"]);

    let first_report = reports
        .iter()
        .find(|r| r["file_id"] == first["file_id"])
        .unwrap();
    assert_eq!(first_report["similar_works"].as_array().unwrap().len(), 0);

    let req = test::TestRequest::get()
        .uri(&format!("/reports/{}", second_report["report_id"].as_str().unwrap()))
        .to_request();
    let (status, fetched) = call_json(&app, req).await;
    assert_eq!(status, 200);
    assert_eq!(fetched["report_id"], second_report["report_id"]);
}

#[actix_rt::test]
async fn test_download_through_gateway() {
    let (_storage, _analysis, storage_url, analysis_url) = spawn_engines().await;
    let app = gateway_app!(&storage_url, &analysis_url);

    let (_, submitted) = call_json(
        &app,
        submission_request("/submit", "s9", "a9", "report.txt", b"final answer").to_request(),
    )
    .await;

    let req = test::TestRequest::get()
        .uri(&format!("/files/{}", submitted["file_id"].as_str().unwrap()))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 200);
    let disposition = resp
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("report.txt"));
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], b"final answer");

    let req = test::TestRequest::get().uri("/files/unknown").to_request();
    let (status, body) = call_json(&app, req).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "NOT_FOUND");
}

#[actix_rt::test]
async fn test_unknown_report_passes_through_as_not_found() {
    let (_storage, _analysis, storage_url, analysis_url) = spawn_engines().await;
    let app = gateway_app!(&storage_url, &analysis_url);

    let req = test::TestRequest::get().uri("/reports/report-missing").to_request();
    let (status, body) = call_json(&app, req).await;

    assert_eq!(status, 404);
    assert_eq!(body["error"], "NOT_FOUND");
}

#[actix_rt::test]
async fn test_health_reports_live_engines() {
    let (_storage, _analysis, storage_url, analysis_url) = spawn_engines().await;
    let app = gateway_app!(&storage_url, &analysis_url);

    let (status, body) = call_json(&app, test::TestRequest::get().uri("/health").to_request()).await;

    assert_eq!(status, 200);
    assert_eq!(body["file_storage"], "healthy");
    assert_eq!(body["file_analysis"], "healthy");
}
