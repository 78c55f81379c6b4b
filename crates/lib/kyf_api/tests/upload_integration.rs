//! Upload rejections: nothing may reach the disk or the database.

mod common;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE};
use axum::http::{Request, StatusCode};
use common::*;

fn documents_dir(root: &std::path::Path) -> std::path::PathBuf {
    root.join("uploads").join("documents")
}

#[tokio::test]
async fn non_multipart_upload_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = offline_app(dir.path());
    let token = token_for(&session_user(1));

    let req = Request::builder()
        .method("POST")
        .uri("/api/document")
        .header(CONTENT_TYPE, "application/json")
        .header(COOKIE, session_cookie(&token))
        .body(Body::from("{}"))
        .unwrap();
    let resp = send(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(resp).await["error"],
        "Request must be multipart/form-data"
    );
}

#[tokio::test]
async fn disallowed_extension_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let app = offline_app(dir.path());
    let token = token_for(&session_user(1));

    let req = multipart_request(
        "POST",
        "/api/document",
        Some(&token),
        &[Part::Text("type", "RG"), Part::File("file", "rg.exe", b"MZ\x90\x00")],
    );
    let resp = send(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert!(json["error"].as_str().unwrap().contains(".pdf"));

    assert_eq!(file_count(&documents_dir(dir.path())), 0);
}

#[tokio::test]
async fn oversized_upload_is_413() {
    let dir = tempfile::tempdir().unwrap();
    let app = offline_app(dir.path());
    let token = token_for(&session_user(1));

    let big = vec![7u8; kyf_api::config::DEFAULT_MAX_UPLOAD_BYTES + 1];
    let req = multipart_request(
        "POST",
        "/api/document",
        Some(&token),
        &[Part::Text("type", "RG"), Part::File("file", "rg.png", &big)],
    );
    let resp = send(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(file_count(&documents_dir(dir.path())), 0);
}

#[tokio::test]
async fn missing_file_part_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = offline_app(dir.path());
    let token = token_for(&session_user(1));

    let req = multipart_request("POST", "/api/document", Some(&token), &[Part::Text("type", "RG")]);
    let resp = send(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"]["errors"][0]["path"], "file");
}

#[tokio::test]
async fn avatar_must_be_an_image() {
    let dir = tempfile::tempdir().unwrap();
    let app = offline_app(dir.path());
    let token = token_for(&session_user(1));

    let req = multipart_request(
        "PUT",
        "/api/user/update",
        Some(&token),
        &[Part::Text("name", "Ana"), Part::File("photo", "me.pdf", b"%PDF-1.7")],
    );
    let resp = send(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(file_count(&dir.path().join("uploads").join("avatars")), 0);
}
