// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::http::StatusCode;
use axum_test::TestServer;
use kansaco::config::settings::Settings;
use kansaco::infrastructure::database::connection;
use kansaco::infrastructure::messaging::DisabledPublisher;
use kansaco::infrastructure::storage::create_storage_repository;
use kansaco::presentation::routes::{self, AppServices};
use serde_json::{json, Value};
use std::sync::Arc;

pub const PASSWORD: &str = "secreto123";

#[allow(dead_code)]
pub struct TestApp {
    pub server: TestServer,
    pub services: AppServices,
}

/// 内存数据库、内存存储、关闭消息队列与速率限制的应用
pub async fn create_test_app() -> TestApp {
    create_test_app_with(&[]).await
}

/// 同上，再叠加额外的配置覆盖
pub async fn create_test_app_with(overrides: &[(&str, &str)]) -> TestApp {
    let db = Arc::new(connection::connect_in_memory().await.expect("in-memory database"));

    let mut builder = Settings::builder()
        .expect("defaults")
        .set_override("storage.storage_type", "memory")
        .expect("override")
        .set_override("storage.public_base_url", "http://cdn.test")
        .expect("override")
        .set_override("rate_limiting.enabled", false)
        .expect("override")
        .set_override("auth.jwt_secret", "integration-secret")
        .expect("override");
    for (key, value) in overrides {
        builder = builder.set_override(*key, *value).expect("override");
    }
    let settings: Settings = builder
        .build()
        .expect("build")
        .try_deserialize()
        .expect("deserialize");

    let storage = create_storage_repository(&settings.storage).expect("storage");
    let services = AppServices::new(db, &settings, storage, Arc::new(DisabledPublisher));
    let app = routes::routes(&services, &settings).expect("router");

    TestApp {
        server: TestServer::new(app).expect("test server"),
        services,
    }
}

impl TestApp {
    /// 注册用户并返回响应体
    pub async fn register(&self, email: &str, rol: Option<&str>) -> Value {
        let mut body = json!({
            "email": email,
            "password": PASSWORD,
            "nombre": "Juan",
            "apellido": "Pérez",
            "telefono": "1122334455",
        });
        if let Some(rol) = rol {
            body["rol"] = json!(rol);
        }

        let response = self.server.post("/api/user/register").json(&body).await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        response.json::<Value>()
    }

    pub async fn login(&self, email: &str) -> String {
        let response = self
            .server
            .post("/api/user/login")
            .json(&json!({ "email": email, "password": PASSWORD }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        response.json::<Value>()["token"]
            .as_str()
            .expect("token")
            .to_string()
    }

    /// 注册并登录，返回 (用户, 令牌)
    pub async fn sign_up(&self, email: &str, rol: Option<&str>) -> (Value, String) {
        let user = self.register(email, rol).await;
        let token = self.login(email).await;
        (user, token)
    }

    /// 以员工身份创建一个带两种包装规格的产品
    pub async fn create_product(&self, staff_token: &str, name: &str) -> Value {
        let response = self
            .server
            .post("/api/product/create")
            .authorization_bearer(staff_token)
            .json(&json!({
                "name": name,
                "description": "Aceite sintético",
                "presentation": "Balde 20 Litros, Bidón 5 Litros",
                "aplication": "Motores",
                "stock": 50,
                "isVisible": true,
                "price": "1500.50",
                "category": ["Lubricantes"],
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        response.json::<Value>()
    }
}
