// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::models::user::{CreateUserDto, LoginDto, LoginResponse, UpdateUserDto, User};
use crate::domain::services::user_service::UserService;
use crate::presentation::errors::AppError;
use crate::presentation::extractors::current_user::CurrentUser;
use crate::presentation::extractors::json::ApiJson;

/// 注册
#[utoipa::path(
    post,
    path = "/api/user/register",
    tag = "user",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    Extension(users): Extension<Arc<UserService>>,
    ApiJson(dto): ApiJson<CreateUserDto>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = users.create(dto).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// 登录
#[utoipa::path(
    post,
    path = "/api/user/login",
    tag = "user",
    request_body = LoginDto,
    responses(
        (status = 201, description = "Token issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    Extension(users): Extension<Arc<UserService>>,
    ApiJson(dto): ApiJson<LoginDto>,
) -> Result<(StatusCode, Json<LoginResponse>), AppError> {
    let response = users.login(dto).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(get, path = "/api/user", tag = "user", responses((status = 200, body = Vec<User>)))]
pub async fn list_users(
    Extension(users): Extension<Arc<UserService>>,
) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(users.find_all().await?))
}

#[utoipa::path(get, path = "/api/user/profile", tag = "user", responses((status = 200, body = User)))]
pub async fn get_profile(
    Extension(users): Extension<Arc<UserService>>,
    CurrentUser(caller): CurrentUser,
) -> Result<Json<User>, AppError> {
    Ok(Json(users.find_one(caller.id).await?))
}

#[utoipa::path(
    put,
    path = "/api/user/profile",
    tag = "user",
    request_body = UpdateUserDto,
    responses((status = 200, body = User), (status = 409, description = "Email already in use"))
)]
pub async fn update_profile(
    Extension(users): Extension<Arc<UserService>>,
    CurrentUser(caller): CurrentUser,
    ApiJson(dto): ApiJson<UpdateUserDto>,
) -> Result<Json<User>, AppError> {
    Ok(Json(users.update(caller.id, dto).await?))
}

#[utoipa::path(
    get,
    path = "/api/user/{id}",
    tag = "user",
    params(("id" = Uuid, Path, description = "User id")),
    responses((status = 200, body = User), (status = 404, description = "User not found"))
)]
pub async fn get_user(
    Extension(users): Extension<Arc<UserService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    Ok(Json(users.find_one(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/user/{id}",
    tag = "user",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UpdateUserDto,
    responses((status = 200, body = User))
)]
pub async fn update_user(
    Extension(users): Extension<Arc<UserService>>,
    Path(id): Path<Uuid>,
    ApiJson(dto): ApiJson<UpdateUserDto>,
) -> Result<Json<User>, AppError> {
    Ok(Json(users.update(id, dto).await?))
}

#[utoipa::path(
    delete,
    path = "/api/user/{id}",
    tag = "user",
    params(("id" = Uuid, Path, description = "User id")),
    responses((status = 200, description = "User deleted"))
)]
pub async fn delete_user(
    Extension(users): Extension<Arc<UserService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    users.remove(id).await?;
    Ok(Json(json!({ "message": "User deleted successfully" })))
}
