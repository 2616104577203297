//! Analysis engine HTTP tests against an in-process content source.

use std::collections::HashMap;
use std::sync::Arc;

use actix_web::{App, test};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use submission_checker_lib::entity::report;
use submission_checker_lib::error::{AppError, AppResult};
use submission_checker_lib::models::FileMetadata;
use submission_checker_lib::services::{Deadline, FileContentSource};
use submission_checker_lib::startup;

use super::test_helpers::*;

/// Content source serving fixed files and duplicate lists.
#[derive(Default)]
struct StaticSource {
    files: HashMap<String, Vec<u8>>,
    duplicates: HashMap<String, Vec<String>>,
}

impl StaticSource {
    fn with_file(mut self, file_id: &str, content: &[u8]) -> Self {
        self.files.insert(file_id.to_string(), content.to_vec());
        self
    }

    fn with_duplicates(mut self, file_id: &str, duplicates: &[&str]) -> Self {
        self.duplicates.insert(
            file_id.to_string(),
            duplicates.iter().map(|d| d.to_string()).collect(),
        );
        self
    }
}

#[async_trait]
impl FileContentSource for StaticSource {
    async fn file_content(&self, file_id: &str, _deadline: Deadline) -> AppResult<Vec<u8>> {
        self.files
            .get(file_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("File {}", file_id)))
    }

    async fn file_metadata(&self, file_id: &str, _deadline: Deadline) -> AppResult<FileMetadata> {
        Err(AppError::NotFound(format!("File {}", file_id)))
    }

    async fn duplicate_files(&self, file_id: &str, _deadline: Deadline) -> AppResult<Vec<String>> {
        Ok(self.duplicates.get(file_id).cloned().unwrap_or_default())
    }
}

macro_rules! analysis_app {
    ($fixture:expr) => {{
        let engine = $fixture.engine.clone();
        let pool = $fixture.pool.clone();
        test::init_service(
            App::new().configure(move |cfg| startup::configure_analysis_engine(cfg, engine, pool)),
        )
        .await
    }};
}

fn analyze_request(work_id: &str, file_id: &str) -> actix_http::Request {
    test::TestRequest::post()
        .uri("/analyze")
        .set_json(serde_json::json!({
            "work_id": work_id,
            "file_id": file_id,
            "student_id": "s1",
            "assignment_id": "a1",
        }))
        .to_request()
}

fn stored_report(index: i64, work_id: &str) -> report::Model {
    report::Model {
        report_id: format!("report-{:016}", index),
        work_id: work_id.to_string(),
        file_id: format!("file-{}", index),
        student_id: "s1".to_string(),
        assignment_id: "a1".to_string(),
        plagiarism_score: 100.0,
        is_plagiarism: true,
        word_count: 2,
        analysis_duration_ms: 1,
        status: "completed".to_string(),
        error_message: None,
        created_at: Utc::now() - Duration::seconds(100 - index),
    }
}

#[actix_rt::test]
async fn test_analyze_scores_and_persists_report() {
    let fixture = analysis_fixture(Arc::new(StaticSource::default().with_file("f1", b"hello world"))).await;
    let app = analysis_app!(fixture);

    let (status, body) = call_json(&app, analyze_request("w1", "f1")).await;

    assert_eq!(status, 201, "analysis should succeed: {}", body);
    let report_id = body["report_id"].as_str().unwrap();
    assert!(report_id.starts_with("report-"));
    assert_eq!(report_id.len(), "report-".len() + 16);
    assert_eq!(body["plagiarism_score"], 100.0);
    assert_eq!(body["is_plagiarism"], true);
    assert_eq!(body["word_count"], 2);
    assert_eq!(body["status"], "completed");
    assert_eq!(body["similar_works"].as_array().unwrap().len(), 0);

    let req = test::TestRequest::get()
        .uri(&format!("/reports/{}", report_id))
        .to_request();
    let (status, fetched) = call_json(&app, req).await;
    assert_eq!(status, 200);
    assert_eq!(fetched["report_id"], body["report_id"]);
}

#[actix_rt::test]
async fn test_analyze_links_checksum_duplicates() {
    let source = StaticSource::default()
        .with_file("f2", b"copied essay text")
        .with_duplicates("f2", &["f1"]);
    let fixture = analysis_fixture(Arc::new(source)).await;
    let app = analysis_app!(fixture);

    let (status, body) = call_json(&app, analyze_request("w2", "f2")).await;

    assert_eq!(status, 201);
    let similar = body["similar_works"].as_array().unwrap();
    assert_eq!(similar.len(), 1);
    assert_eq!(similar[0]["original_work_id"], "f2");
    assert_eq!(similar[0]["similar_work_id"], "f1");
    assert_eq!(similar[0]["similarity_percentage"], 100.0);
    assert_eq!(similar[0]["report_id"], body["report_id"]);
}

#[actix_rt::test]
async fn test_analyze_requires_work_and_file_ids() {
    let fixture = analysis_fixture(Arc::new(StaticSource::default())).await;
    let app = analysis_app!(fixture);

    let req = test::TestRequest::post()
        .uri("/analyze")
        .set_json(serde_json::json!({ "work_id": "w1" }))
        .to_request();
    let (status, body) = call_json(&app, req).await;

    assert_eq!(status, 400);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[actix_rt::test]
async fn test_failed_analysis_is_persisted_and_retrievable() {
    let fixture = analysis_fixture(Arc::new(StaticSource::default())).await;
    let app = analysis_app!(fixture);

    let (status, body) = call_json(&app, analyze_request("w1", "missing")).await;

    assert_eq!(status, 500);
    assert_eq!(body["error"], "ANALYSIS_FAILED");
    let report_id = body["details"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri(&format!("/reports/{}", report_id))
        .to_request();
    let (status, report) = call_json(&app, req).await;
    assert_eq!(status, 200);
    assert_eq!(report["status"], "failed");
    assert_eq!(report["is_plagiarism"], false);
    assert!(report["error_message"].as_str().unwrap().contains("fetch"));
}

#[actix_rt::test]
async fn test_list_reports_paginates_newest_first() {
    let fixture = analysis_fixture(Arc::new(StaticSource::default())).await;
    for i in 0..25 {
        fixture.pool.insert_report(stored_report(i, "w-list")).await.unwrap();
    }
    let app = analysis_app!(fixture);

    let req = test::TestRequest::get().uri("/reports?limit=10").to_request();
    let (status, body) = call_json(&app, req).await;

    assert_eq!(status, 200);
    assert_eq!(body["total"], 25);
    assert_eq!(body["limit"], 10);
    let reports = body["reports"].as_array().unwrap();
    assert_eq!(reports.len(), 10);
    assert_eq!(reports[0]["report_id"], format!("report-{:016}", 24));
    assert_eq!(reports[9]["report_id"], format!("report-{:016}", 15));

    let req = test::TestRequest::get()
        .uri("/reports?work_id=w-list&limit=500&offset=20")
        .to_request();
    let (_, body) = call_json(&app, req).await;
    assert_eq!(body["limit"], 100);
    assert_eq!(body["offset"], 20);
    assert_eq!(body["reports"].as_array().unwrap().len(), 5);
}

#[actix_rt::test]
async fn test_work_reports_are_counted() {
    let fixture = analysis_fixture(Arc::new(StaticSource::default())).await;
    fixture.pool.insert_report(stored_report(1, "w-a")).await.unwrap();
    fixture.pool.insert_report(stored_report(2, "w-a")).await.unwrap();
    fixture.pool.insert_report(stored_report(3, "w-b")).await.unwrap();
    let app = analysis_app!(fixture);

    let req = test::TestRequest::get().uri("/reports/work/w-a").to_request();
    let (status, body) = call_json(&app, req).await;

    assert_eq!(status, 200);
    assert_eq!(body["count"], 2);
    assert_eq!(body["reports"][0]["report_id"], format!("report-{:016}", 2));
}

#[actix_rt::test]
async fn test_status_update_rules() {
    let fixture = analysis_fixture(Arc::new(StaticSource::default().with_file("f1", b"text"))).await;
    let app = analysis_app!(fixture);
    let (_, created) = call_json(&app, analyze_request("w1", "f1")).await;
    let report_id = created["report_id"].as_str().unwrap();

    let req = test::TestRequest::patch()
        .uri(&format!("/reports/{}/status", report_id))
        .set_json(serde_json::json!({ "status": "failed" }))
        .to_request();
    let (status, _) = call_json(&app, req).await;
    assert_eq!(status, 400);

    let req = test::TestRequest::patch()
        .uri(&format!("/reports/{}/status", report_id))
        .set_json(serde_json::json!({ "status": "failed", "error_message": "manual review" }))
        .to_request();
    let (status, body) = call_json(&app, req).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "failed");

    // Cached copy from analysis must not survive the update.
    let req = test::TestRequest::get()
        .uri(&format!("/reports/{}", report_id))
        .to_request();
    let (_, body) = call_json(&app, req).await;
    assert_eq!(body["error_message"], "manual review");

    let req = test::TestRequest::patch()
        .uri(&format!("/reports/{}/status", report_id))
        .set_json(serde_json::json!({ "status": "completed" }))
        .to_request();
    let (_, body) = call_json(&app, req).await;
    assert_eq!(body["status"], "completed");
    assert!(body.get("error_message").is_none());
}

#[actix_rt::test]
async fn test_delete_report_then_not_found() {
    let source = StaticSource::default()
        .with_file("f2", b"copy")
        .with_duplicates("f2", &["f1"]);
    let fixture = analysis_fixture(Arc::new(source)).await;
    let app = analysis_app!(fixture);
    let (_, created) = call_json(&app, analyze_request("w1", "f2")).await;
    let report_id = created["report_id"].as_str().unwrap();

    let req = test::TestRequest::delete()
        .uri(&format!("/reports/{}", report_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 204);

    let req = test::TestRequest::get()
        .uri(&format!("/reports/{}", report_id))
        .to_request();
    let (status, _) = call_json(&app, req).await;
    assert_eq!(status, 404);

    let req = test::TestRequest::delete()
        .uri(&format!("/reports/{}", report_id))
        .to_request();
    let (status, _) = call_json(&app, req).await;
    assert_eq!(status, 404);
}

#[actix_rt::test]
async fn test_unknown_report_is_not_found() {
    let fixture = analysis_fixture(Arc::new(StaticSource::default())).await;
    let app = analysis_app!(fixture);

    let req = test::TestRequest::get().uri("/reports/report-unknown").to_request();
    let (status, body) = call_json(&app, req).await;

    assert_eq!(status, 404);
    assert_eq!(body["error"], "NOT_FOUND");
}
