// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::http::StatusCode;
use serde_json::{json, Value};

use crate::integration::helpers::create_test_app;

#[tokio::test]
async fn only_staff_can_create_categories() {
    let app = create_test_app().await;
    let (_, client) = app.sign_up("cliente@example.com", None).await;
    let (_, asistente) = app.sign_up("asistente@example.com", Some("ASISTENTE")).await;

    let denied = app
        .server
        .post("/api/category")
        .authorization_bearer(&client)
        .json(&json!({ "name": "Grasas" }))
        .await;
    assert_eq!(denied.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(
        denied.json::<Value>()["message"],
        "Requires one of: ADMIN, ASISTENTE"
    );

    let created = app
        .server
        .post("/api/category")
        .authorization_bearer(&asistente)
        .json(&json!({ "name": "Grasas" }))
        .await;
    assert_eq!(created.status_code(), StatusCode::CREATED);
    assert_eq!(created.json::<Value>()["name"], "Grasas");

    let listed = app.server.get("/api/category").await.json::<Vec<Value>>();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn product_catalog_is_public_but_detail_requires_login() {
    let app = create_test_app().await;
    let (_, admin) = app.sign_up("admin@example.com", Some("ADMIN")).await;
    let product = app.create_product(&admin, "Aceite Súper 10W-40").await;

    assert_eq!(product["slug"], "aceite-super-10w-40");
    assert_eq!(product["category"], json!(["Lubricantes"]));

    let page = app
        .server
        .get("/api/product")
        .add_query_param("page", 1)
        .add_query_param("limit", 10)
        .await;
    assert_eq!(page.status_code(), StatusCode::OK);
    let page = page.json::<Value>();
    assert_eq!(page["total"], 1);
    assert_eq!(page["data"][0]["name"], "Aceite Súper 10W-40");

    let id = product["id"].as_i64().expect("id");
    let anonymous = app.server.get(&format!("/api/product/{}", id)).await;
    assert_eq!(anonymous.status_code(), StatusCode::UNAUTHORIZED);

    let detail = app
        .server
        .get(&format!("/api/product/{}", id))
        .authorization_bearer(&admin)
        .await;
    assert_eq!(detail.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn product_delete_is_admin_only() {
    let app = create_test_app().await;
    let (_, admin) = app.sign_up("admin@example.com", Some("ADMIN")).await;
    let (_, asistente) = app.sign_up("asistente@example.com", Some("ASISTENTE")).await;
    let product = app.create_product(&admin, "Refrigerante").await;
    let path = format!("/api/product/{}", product["id"]);

    let denied = app.server.delete(&path).authorization_bearer(&asistente).await;
    assert_eq!(denied.status_code(), StatusCode::FORBIDDEN);

    let deleted = app.server.delete(&path).authorization_bearer(&admin).await;
    assert_eq!(deleted.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn price_list_export_sets_attachment_headers() {
    let app = create_test_app().await;
    let (_, admin) = app.sign_up("admin@example.com", Some("ADMIN")).await;
    app.create_product(&admin, "Aceite Hidráulico").await;

    let response = app
        .server
        .get("/api/product/file/listUpdatePrices")
        .add_query_param("format", "csv")
        .authorization_bearer(&admin)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let disposition = response.header("content-disposition");
    assert!(disposition.to_str().unwrap().starts_with("attachment;"));
    assert!(response.text().contains("Aceite Hidráulico"));
}
