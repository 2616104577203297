//! Storage engine HTTP tests.

use actix_web::{App, test};
use submission_checker_lib::startup;

use super::test_helpers::*;

macro_rules! storage_app {
    ($fixture:expr) => {{
        let engine = $fixture.engine.clone();
        let pool = $fixture.pool.clone();
        test::init_service(
            App::new().configure(move |cfg| startup::configure_storage_engine(cfg, engine, pool)),
        )
        .await
    }};
}

#[actix_rt::test]
async fn test_upload_returns_created_with_sharded_path() {
    let fixture = storage_fixture().await;
    let app = storage_app!(fixture);

    let req = submission_request("/files", "s1", "a1", "essay.txt", b"hello world").to_request();
    let (status, body) = call_json(&app, req).await;

    assert_eq!(status, 201, "upload should succeed: {}", body);
    let file_id = body["file_id"].as_str().unwrap();
    assert_eq!(file_id.len(), 24);
    assert!(body["work_id"].as_str().unwrap().starts_with("work-"));
    assert_eq!(body["filename"], "essay.txt");
    assert_eq!(body["size_bytes"], 11);

    let expected = fixture.dir.path().join(&file_id[..2]).join(file_id);
    assert_eq!(body["storage_path"].as_str().unwrap(), expected.to_string_lossy());
    assert_eq!(std::fs::read(expected).unwrap(), b"hello world");
}

#[actix_rt::test]
async fn test_upload_rejects_missing_fields() {
    let fixture = storage_fixture().await;
    let app = storage_app!(fixture);

    let body = multipart_body(&[("student_id", "s1")], Some(("a.txt", b"abc")));
    let (status, body) = call_json(&app, multipart_request("/files", body).to_request()).await;

    assert_eq!(status, 400);
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(body["message"].as_str().unwrap().contains("assignment_id"));
}

#[actix_rt::test]
async fn test_upload_rejects_empty_file() {
    let fixture = storage_fixture().await;
    let app = storage_app!(fixture);

    let req = submission_request("/files", "s1", "a1", "empty.txt", b"").to_request();
    let (status, _) = call_json(&app, req).await;

    assert_eq!(status, 400);
}

#[actix_rt::test]
async fn test_upload_rejects_oversized_file() {
    let fixture = storage_fixture().await;
    let app = storage_app!(fixture);

    let data = vec![b'x'; MAX_UPLOAD_SIZE + 1];
    let req = submission_request("/files", "s1", "a1", "big.txt", &data).to_request();
    let (status, body) = call_json(&app, req).await;

    assert_eq!(status, 413);
    assert_eq!(body["error"], "PAYLOAD_TOO_LARGE");
}

#[actix_rt::test]
async fn test_same_student_and_assignment_share_a_work() {
    let fixture = storage_fixture().await;
    let app = storage_app!(fixture);

    let (_, first) = call_json(
        &app,
        submission_request("/files", "s1", "a1", "v1.txt", b"same bytes").to_request(),
    )
    .await;
    let (_, second) = call_json(
        &app,
        submission_request("/files", "s1", "a1", "v2.txt", b"same bytes").to_request(),
    )
    .await;

    assert_eq!(first["work_id"], second["work_id"]);
    assert_ne!(first["file_id"], second["file_id"]);

    let work_id = first["work_id"].as_str().unwrap();
    let req = test::TestRequest::get()
        .uri(&format!("/works/{}/files", work_id))
        .to_request();
    let (status, listing) = call_json(&app, req).await;
    assert_eq!(status, 200);
    assert_eq!(listing["count"], 2);
    assert_eq!(listing["files"][0]["file_id"], first["file_id"]);
}

#[actix_rt::test]
async fn test_check_file_exists_finds_earliest_other_duplicate() {
    let fixture = storage_fixture().await;
    let app = storage_app!(fixture);

    let (_, first) = call_json(
        &app,
        submission_request("/files", "s1", "a1", "a.txt", b"copied text").to_request(),
    )
    .await;
    let (_, second) = call_json(
        &app,
        submission_request("/files", "s2", "a1", "b.txt", b"copied text").to_request(),
    )
    .await;
    let (_, third) = call_json(
        &app,
        submission_request("/files", "s3", "a1", "c.txt", b"copied text").to_request(),
    )
    .await;

    let req = test::TestRequest::get()
        .uri(&format!("/files/{}/exists", third["file_id"].as_str().unwrap()))
        .to_request();
    let (status, body) = call_json(&app, req).await;
    assert_eq!(status, 200);
    assert_eq!(body["files"].as_array().unwrap().len(), 1);
    assert_eq!(body["files"][0], first["file_id"]);

    let req = test::TestRequest::get()
        .uri(&format!("/files/{}/exists", first["file_id"].as_str().unwrap()))
        .to_request();
    let (_, body) = call_json(&app, req).await;
    assert_eq!(body["files"][0], second["file_id"]);
}

#[actix_rt::test]
async fn test_check_file_exists_for_unique_and_unknown_files() {
    let fixture = storage_fixture().await;
    let app = storage_app!(fixture);

    let (_, uploaded) = call_json(
        &app,
        submission_request("/files", "s1", "a1", "a.txt", b"original work").to_request(),
    )
    .await;

    let req = test::TestRequest::get()
        .uri(&format!("/files/{}/exists", uploaded["file_id"].as_str().unwrap()))
        .to_request();
    let (status, body) = call_json(&app, req).await;
    assert_eq!(status, 200);
    assert_eq!(body["files"].as_array().unwrap().len(), 0);

    let req = test::TestRequest::get().uri("/files/nope/exists").to_request();
    let (status, body) = call_json(&app, req).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "NOT_FOUND");
}

#[actix_rt::test]
async fn test_metadata_carries_owner_and_checksums() {
    let fixture = storage_fixture().await;
    let app = storage_app!(fixture);

    let (_, uploaded) = call_json(
        &app,
        submission_request("/files", "s1", "a1", "hello.txt", b"hello world").to_request(),
    )
    .await;
    let file_id = uploaded["file_id"].as_str().unwrap();

    let req = test::TestRequest::get()
        .uri(&format!("/files/{}/metadata", file_id))
        .to_request();
    let (status, body) = call_json(&app, req).await;

    assert_eq!(status, 200);
    assert_eq!(body["student_id"], "s1");
    assert_eq!(body["assignment_id"], "a1");
    assert_eq!(body["original_filename"], "hello.txt");
    assert_eq!(body["checksum"], "5eb63bbbe01eeed093cb22bb8f5acdc3");
    assert_eq!(
        body["checksum_sha256"],
        "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
    );
}

#[actix_rt::test]
async fn test_download_sets_attachment_headers() {
    let fixture = storage_fixture().await;
    let app = storage_app!(fixture);

    let (_, uploaded) = call_json(
        &app,
        submission_request("/files", "s1", "a1", "notes.txt", b"hello world").to_request(),
    )
    .await;
    let file_id = uploaded["file_id"].as_str().unwrap();

    let req = test::TestRequest::get()
        .uri(&format!("/files/{}", file_id))
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
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains("notes.txt"));
    assert!(
        resp.headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/plain")
    );
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], b"hello world");
}

#[actix_rt::test]
async fn test_download_reports_bytes_missing_from_disk() {
    let fixture = storage_fixture().await;
    let app = storage_app!(fixture);

    let (_, uploaded) = call_json(
        &app,
        submission_request("/files", "s1", "a1", "gone.txt", b"soon gone").to_request(),
    )
    .await;
    std::fs::remove_file(uploaded["storage_path"].as_str().unwrap()).unwrap();

    let req = test::TestRequest::get()
        .uri(&format!("/files/{}", uploaded["file_id"].as_str().unwrap()))
        .to_request();
    let (status, body) = call_json(&app, req).await;

    assert_eq!(status, 500);
    assert_eq!(body["error"], "FILE_MISSING_ON_DISK");
}

#[actix_rt::test]
async fn test_delete_removes_row_and_bytes() {
    let fixture = storage_fixture().await;
    let app = storage_app!(fixture);

    let (_, uploaded) = call_json(
        &app,
        submission_request("/files", "s1", "a1", "tmp.txt", b"temporary").to_request(),
    )
    .await;
    let file_id = uploaded["file_id"].as_str().unwrap();

    let req = test::TestRequest::delete()
        .uri(&format!("/files/{}", file_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 204);
    assert!(!std::path::Path::new(uploaded["storage_path"].as_str().unwrap()).exists());

    let req = test::TestRequest::get()
        .uri(&format!("/files/{}/metadata", file_id))
        .to_request();
    let (status, _) = call_json(&app, req).await;
    assert_eq!(status, 404);
}

#[actix_rt::test]
async fn test_health_and_ready() {
    let fixture = storage_fixture().await;
    let app = storage_app!(fixture);

    let (status, body) = call_json(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "storage-engine");

    let (status, body) = call_json(&app, test::TestRequest::get().uri("/ready").to_request()).await;
    assert_eq!(status, 200);
    assert_eq!(body["database"], "connected");
}
