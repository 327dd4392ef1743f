// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::http::StatusCode;
use serde_json::{json, Value};

use crate::integration::helpers::{create_test_app, TestApp};

fn order_body() -> Value {
    json!({
        "customerType": "CLIENTE_MINORISTA",
        "contactInfo": {
            "fullName": "Juan Pérez",
            "email": "juan@example.com",
            "phone": "1122334455",
            "address": "Av. Siempre Viva 742",
        },
        "notes": "Entregar por la mañana",
    })
}

async fn cart_of(app: &TestApp, user: &Value, token: &str) -> Value {
    let response = app
        .server
        .get(&format!("/api/cart/user/{}", user["id"].as_str().expect("id")))
        .authorization_bearer(token)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    response.json::<Value>()
}

#[tokio::test]
async fn cart_creation_is_idempotent() {
    let app = create_test_app().await;
    let (user, token) = app.sign_up("cliente@example.com", None).await;
    let existing = cart_of(&app, &user, &token).await;

    let response = app
        .server
        .post("/api/cart/create")
        .authorization_bearer(&token)
        .json(&json!({ "userId": user["id"] }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    assert_eq!(response.json::<Value>()["id"], existing["id"]);
}

#[tokio::test]
async fn cart_items_validate_and_merge_presentations() {
    let app = create_test_app().await;
    let (_, admin) = app.sign_up("admin@example.com", Some("ADMIN")).await;
    let product = app.create_product(&admin, "Aceite Sintético").await;
    let (user, token) = app.sign_up("cliente@example.com", None).await;
    let cart = cart_of(&app, &user, &token).await;
    let path = format!("/api/cart/{}/add/product/{}", cart["id"], product["id"]);

    let invalid = app
        .server
        .put(&path)
        .add_query_param("quantity", 1)
        .add_query_param("presentation", "Tambor 200 Litros")
        .authorization_bearer(&token)
        .await;
    assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);

    for _ in 0..2 {
        let added = app
            .server
            .put(&path)
            .add_query_param("quantity", 2)
            .add_query_param("presentation", "balde 20 litros")
            .authorization_bearer(&token)
            .await;
        assert_eq!(added.status_code(), StatusCode::OK);
    }

    let cart = cart_of(&app, &user, &token).await;
    let items = cart["items"].as_array().expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 4);
    assert_eq!(items[0]["presentation"], "Balde 20 Litros");

    let emptied = app
        .server
        .patch(&format!("/api/cart/{}/empty", cart["id"]))
        .authorization_bearer(&token)
        .await;
    assert_eq!(emptied.status_code(), StatusCode::OK);
    assert_eq!(emptied.json::<Value>()["items"], json!([]));
}

#[tokio::test]
async fn send_order_succeeds_without_broker_and_respects_ownership() {
    let app = create_test_app().await;
    let (_, admin) = app.sign_up("admin@example.com", Some("ADMIN")).await;
    let product = app.create_product(&admin, "Aceite Sintético").await;
    let (user, token) = app.sign_up("cliente@example.com", None).await;
    let (_, other) = app.sign_up("otro@example.com", None).await;
    let cart = cart_of(&app, &user, &token).await;

    app.server
        .put(&format!("/api/cart/{}/add/product/{}", cart["id"], product["id"]))
        .add_query_param("quantity", 3)
        .add_query_param("presentation", "Bidón 5 Litros")
        .authorization_bearer(&token)
        .await;

    let sent = app
        .server
        .post("/api/email/send-order")
        .authorization_bearer(&token)
        .json(&order_body())
        .await;
    assert_eq!(sent.status_code(), StatusCode::CREATED);
    let sent = sent.json::<Value>();
    assert!(!sent["pdfBase64"].as_str().expect("pdf").is_empty());
    let order_id = sent["orderId"].as_str().expect("order id").to_string();

    let own = app
        .server
        .get(&format!("/api/order/{}", order_id))
        .authorization_bearer(&token)
        .await;
    assert_eq!(own.status_code(), StatusCode::OK);
    let own = own.json::<Value>();
    assert_eq!(own["status"], "success");
    assert_eq!(own["data"]["items"][0]["quantity"], 3);
    assert_eq!(own["data"]["items"][0]["presentation"], "Bidón 5 Litros");

    let foreign = app
        .server
        .get(&format!("/api/order/{}", order_id))
        .authorization_bearer(&other)
        .await;
    assert_eq!(foreign.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(
        foreign.json::<Value>()["message"],
        "No tienes permiso para ver esta orden"
    );

    let staff = app
        .server
        .get(&format!("/api/order/{}", order_id))
        .authorization_bearer(&admin)
        .await;
    assert_eq!(staff.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn order_management_requires_staff() {
    let app = create_test_app().await;
    let (_, admin) = app.sign_up("admin@example.com", Some("ADMIN")).await;
    let (_, token) = app.sign_up("cliente@example.com", None).await;

    let sent = app
        .server
        .post("/api/email/send-order")
        .authorization_bearer(&token)
        .json(&order_body())
        .await
        .json::<Value>();
    let order_id = sent["orderId"].as_str().expect("order id").to_string();

    let denied = app.server.get("/api/order").authorization_bearer(&token).await;
    assert_eq!(denied.status_code(), StatusCode::FORBIDDEN);

    let updated = app
        .server
        .patch(&format!("/api/order/{}/status", order_id))
        .authorization_bearer(&admin)
        .json(&json!({ "status": "PROCESANDO" }))
        .await;
    assert_eq!(updated.status_code(), StatusCode::OK);
    assert_eq!(updated.json::<Value>()["data"]["status"], "PROCESANDO");

    let pdf = app
        .server
        .get(&format!("/api/order/{}/pdf", order_id))
        .authorization_bearer(&admin)
        .await;
    assert_eq!(pdf.status_code(), StatusCode::OK);
    assert_eq!(pdf.header("content-type"), "application/pdf");
    let disposition = pdf.header("content-disposition");
    let disposition = disposition.to_str().expect("ascii header");
    assert!(disposition.contains("_Juan_P_rez.pdf\""));
    assert!(disposition.ends_with("_Juan_P%C3%A9rez.pdf"));

    let mine = app
        .server
        .get("/api/order/my-orders/paginated")
        .authorization_bearer(&token)
        .await
        .json::<Value>();
    assert_eq!(mine["total"], 1);
    assert_eq!(mine["limit"], 10);

    let deleted = app
        .server
        .delete(&format!("/api/order/{}", order_id))
        .authorization_bearer(&admin)
        .await;
    assert_eq!(deleted.status_code(), StatusCode::OK);
    assert_eq!(deleted.json::<Value>()["message"], "Order deleted successfully");
}
