// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::http::StatusCode;
use serde_json::Value;

use super::helpers::{create_test_app, create_test_app_with};

/// 健康检查测试
///
/// 验证健康检查端点是否正常工作
#[tokio::test]
async fn health_check_works() {
    let app = create_test_app().await;

    let response = app.server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "OK");
}

#[tokio::test]
async fn version_reports_package_version() {
    let app = create_test_app().await;

    let response = app.server.get("/version").await;

    assert_eq!(response.text(), env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = create_test_app().await;

    let doc = app.server.get("/docs/openapi.json").await.json::<Value>();

    assert!(doc["paths"]["/api/product"].is_object());
    assert!(doc["paths"]["/api/order/{id}/pdf"].is_object());
}

#[tokio::test]
async fn unknown_route_returns_error_body() {
    let app = create_test_app().await;

    let response = app.server.get("/nope").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body = response.json::<Value>();
    assert_eq!(body["statusCode"], 404);
    assert_eq!(body["error"], "Not Found");
}

#[tokio::test]
async fn responses_carry_security_headers() {
    let app = create_test_app().await;

    let response = app.server.get("/health").await;

    assert_eq!(response.header("x-content-type-options"), "nosniff");
    assert_eq!(response.header("x-frame-options"), "SAMEORIGIN");
    assert_eq!(response.header("referrer-policy"), "no-referrer");
}

#[tokio::test]
async fn local_storage_files_are_served_under_public_base_path() {
    let dir = tempfile::tempdir().expect("temp dir");
    std::fs::create_dir_all(dir.path().join("products")).expect("mkdir");
    std::fs::write(dir.path().join("products/aceite.png"), b"png-bytes").expect("write");
    let local_path = dir.path().to_string_lossy().to_string();

    let app = create_test_app_with(&[
        ("storage.storage_type", "local"),
        ("storage.local_path", local_path.as_str()),
        ("storage.public_base_url", "http://localhost:3001/storage"),
    ])
    .await;

    let response = app.server.get("/storage/products/aceite.png").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.as_bytes().as_ref(), b"png-bytes");
    assert_eq!(response.header("x-content-type-options"), "nosniff");

    let missing = app.server.get("/storage/products/otro.png").await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
}
