//! Router-level wiring: health probes, docs, media files and request ids.

mod common;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use common::{response_json, TestApp};

#[tokio::test]
async fn readiness_checks_database_and_media_root() {
    let app = TestApp::new().await;
    let response = app.get("/health/ready").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["status"], "up");
    assert_eq!(body["details"]["database"]["status"], "up");
    assert_eq!(body["details"]["media"]["status"], "up");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::new().await;
    let response = app.get("/api-docs/openapi.json").await;
    assert_eq!(response.status(), StatusCode::OK);

    let doc = response_json(response).await;
    assert!(doc["paths"]["/api/catalog"].is_object());
    assert!(doc["paths"]["/api/basket"].is_object());
}

#[tokio::test]
async fn media_root_is_served_under_the_media_url() {
    let app = TestApp::new().await;
    let dir = app.media_dir.path().join("products/product_1/images");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("front.png"), b"image").unwrap();

    let response = app.get("/media/products/product_1/images/front.png").await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"image");
}

#[tokio::test]
async fn request_id_is_echoed_on_errors() {
    let app = TestApp::new().await;
    let request = Request::get("/api/product/404")
        .header("x-request-id", "req-smoke-1")
        .body(Body::empty())
        .unwrap();

    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers()["x-request-id"], "req-smoke-1");

    let body = response_json(response).await;
    assert_eq!(body["request_id"], "req-smoke-1");
}
