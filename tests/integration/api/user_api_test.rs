// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::http::StatusCode;
use serde_json::{json, Value};

use crate::integration::helpers::{create_test_app, PASSWORD};

#[tokio::test]
async fn register_returns_user_without_password() {
    let app = create_test_app().await;

    let user = app.register("  Cliente@Example.COM ", None).await;

    assert_eq!(user["email"], "cliente@example.com");
    assert_eq!(user["rol"], "CLIENTE_MINORISTA");
    assert!(user.get("password").is_none());
}

#[tokio::test]
async fn duplicate_registration_is_conflict() {
    let app = create_test_app().await;
    app.register("dup@example.com", None).await;

    let response = app
        .server
        .post("/api/user/register")
        .json(&json!({
            "email": "DUP@example.com",
            "password": PASSWORD,
            "nombre": "Otra",
            "apellido": "Persona",
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    let body = response.json::<Value>();
    assert_eq!(body["statusCode"], 409);
    assert_eq!(body["message"], "User with this email already exists");
}

#[tokio::test]
async fn short_password_is_rejected() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/user/register")
        .json(&json!({
            "email": "corto@example.com",
            "password": "123",
            "nombre": "Ana",
            "apellido": "Gómez",
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["message"], "Password is too short");
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let app = create_test_app().await;
    app.register("login@example.com", None).await;

    let response = app
        .server
        .post("/api/user/login")
        .json(&json!({ "email": "login@example.com", "password": "incorrecta" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["message"], "Credenciales inválidas");
}

#[tokio::test]
async fn profile_requires_bearer_token() {
    let app = create_test_app().await;

    let missing = app.server.get("/api/user/profile").await;
    assert_eq!(missing.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(missing.json::<Value>()["message"], "Authorization header missing");

    let invalid = app
        .server
        .get("/api/user/profile")
        .authorization_bearer("not-a-jwt")
        .await;
    assert_eq!(invalid.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(invalid.json::<Value>()["message"], "Invalid token");
}

#[tokio::test]
async fn profile_can_be_read_and_updated() {
    let app = create_test_app().await;
    let (_, token) = app.sign_up("perfil@example.com", None).await;

    let profile = app
        .server
        .get("/api/user/profile")
        .authorization_bearer(&token)
        .await
        .json::<Value>();
    assert_eq!(profile["email"], "perfil@example.com");

    let updated = app
        .server
        .put("/api/user/profile")
        .authorization_bearer(&token)
        .json(&json!({ "telefono": "1199887766" }))
        .await;
    assert_eq!(updated.status_code(), StatusCode::OK);
    assert_eq!(updated.json::<Value>()["telefono"], "1199887766");
}
