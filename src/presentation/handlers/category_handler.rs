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

use crate::domain::models::category::{Category, CreateCategoryDto, UpdateCategoryDto};
use crate::domain::services::category_service::CategoryService;
use crate::presentation::errors::AppError;
use crate::presentation::extractors::json::ApiJson;

#[utoipa::path(get, path = "/api/category", tag = "category", responses((status = 200, body = Vec<Category>)))]
pub async fn list_categories(
    Extension(categories): Extension<Arc<CategoryService>>,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(categories.find_all().await?))
}

#[utoipa::path(
    get,
    path = "/api/category/{id}",
    tag = "category",
    params(("id" = i32, Path, description = "Category id")),
    responses((status = 200, body = Category), (status = 404, description = "Category not found"))
)]
pub async fn get_category(
    Extension(categories): Extension<Arc<CategoryService>>,
    Path(id): Path<i32>,
) -> Result<Json<Category>, AppError> {
    Ok(Json(categories.find_one(id).await?))
}

/// 创建分类（仅 ADMIN/ASISTENTE）
#[utoipa::path(
    post,
    path = "/api/category",
    tag = "category",
    request_body = CreateCategoryDto,
    responses((status = 201, body = Category), (status = 400, description = "Invalid or duplicate name"))
)]
pub async fn create_category(
    Extension(categories): Extension<Arc<CategoryService>>,
    ApiJson(dto): ApiJson<CreateCategoryDto>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let category = categories.create(dto).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

#[utoipa::path(
    put,
    path = "/api/category/{id}",
    tag = "category",
    params(("id" = i32, Path, description = "Category id")),
    request_body = UpdateCategoryDto,
    responses((status = 200, body = Category))
)]
pub async fn update_category(
    Extension(categories): Extension<Arc<CategoryService>>,
    Path(id): Path<i32>,
    ApiJson(dto): ApiJson<UpdateCategoryDto>,
) -> Result<Json<Category>, AppError> {
    Ok(Json(categories.update(id, dto).await?))
}

#[utoipa::path(
    delete,
    path = "/api/category/{id}",
    tag = "category",
    params(("id" = i32, Path, description = "Category id")),
    responses((status = 200, description = "Category deleted"), (status = 400, description = "Category in use"))
)]
pub async fn delete_category(
    Extension(categories): Extension<Arc<CategoryService>>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    categories.delete(id).await?;
    Ok(Json(json!({ "message": "Category deleted successfully" })))
}
