// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Extension, Multipart, Path},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::domain::models::product::ProductImage;
use crate::domain::services::image_service::{parse_image_ids, ImageService, UploadedImage};
use crate::presentation::errors::{AppError, HttpError};
use crate::presentation::extractors::json::{ApiJson, ApiQuery};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryParams {
    /// `true` 时设为主图
    pub is_primary: Option<String>,
}

impl PrimaryParams {
    fn flag(&self) -> bool {
        self.is_primary
            .as_deref()
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssociateImageDto {
    #[serde(default)]
    pub image_key: String,
    pub is_primary: Option<bool>,
}

/// 上传产品图片（multipart 字段 `image`）
#[utoipa::path(
    post,
    path = "/api/product/{id}/image",
    tag = "image",
    params(("id" = i32, Path, description = "Product id"), PrimaryParams),
    responses((status = 201, body = ProductImage), (status = 400, description = "Invalid file"))
)]
pub async fn upload_image(
    Extension(images): Extension<Arc<ImageService>>,
    Path(id): Path<i32>,
    ApiQuery(params): ApiQuery<PrimaryParams>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ProductImage>), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| HttpError::bad_request(e.body_text()))?
    {
        if field.name() != Some("image") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("image").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| HttpError::bad_request(e.body_text()))?;

        let image = images
            .upload(
                id,
                UploadedImage {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                },
                params.flag(),
            )
            .await?;
        return Ok((StatusCode::CREATED, Json(image)));
    }

    Err(HttpError::bad_request("No file uploaded").into())
}

#[utoipa::path(
    get,
    path = "/api/product/{id}/images",
    tag = "image",
    params(("id" = i32, Path, description = "Product id")),
    responses((status = 200, body = Vec<ProductImage>))
)]
pub async fn list_images(
    Extension(images): Extension<Arc<ImageService>>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<ProductImage>>, AppError> {
    Ok(Json(images.list(id).await?))
}

/// 关联存储桶中已有的图片
#[utoipa::path(
    post,
    path = "/api/product/{id}/image/associate",
    tag = "image",
    params(("id" = i32, Path, description = "Product id"), PrimaryParams),
    request_body = AssociateImageDto,
    responses((status = 201, body = ProductImage), (status = 400, description = "Key missing or not in storage"))
)]
pub async fn associate_image(
    Extension(images): Extension<Arc<ImageService>>,
    Path(id): Path<i32>,
    ApiQuery(params): ApiQuery<PrimaryParams>,
    ApiJson(dto): ApiJson<AssociateImageDto>,
) -> Result<(StatusCode, Json<ProductImage>), AppError> {
    let is_primary = dto.is_primary.unwrap_or(false) || params.flag();
    let image = images.associate(id, &dto.image_key, is_primary).await?;
    Ok((StatusCode::CREATED, Json(image)))
}

#[utoipa::path(
    delete,
    path = "/api/product/{id}/image/{imageId}",
    tag = "image",
    params(("id" = i32, Path, description = "Product id"), ("imageId" = i32, Path, description = "Image id")),
    responses((status = 200, description = "Image deleted"))
)]
pub async fn delete_image(
    Extension(images): Extension<Arc<ImageService>>,
    Path((id, image_id)): Path<(i32, i32)>,
) -> Result<Json<Value>, AppError> {
    images.delete(id, image_id).await?;
    Ok(Json(json!({ "message": "Image deleted successfully" })))
}

#[utoipa::path(
    patch,
    path = "/api/product/{id}/image/{imageId}/primary",
    tag = "image",
    params(("id" = i32, Path, description = "Product id"), ("imageId" = i32, Path, description = "Image id")),
    responses((status = 200, body = ProductImage))
)]
pub async fn set_primary_image(
    Extension(images): Extension<Arc<ImageService>>,
    Path((id, image_id)): Path<(i32, i32)>,
) -> Result<Json<ProductImage>, AppError> {
    Ok(Json(images.set_primary(id, image_id).await?))
}

/// 重排图片，请求体 `{imageIds: [...]}`
#[utoipa::path(
    patch,
    path = "/api/product/{id}/images/reorder",
    tag = "image",
    params(("id" = i32, Path, description = "Product id")),
    responses((status = 200, description = "Images reordered"), (status = 400, description = "Invalid ids"))
)]
pub async fn reorder_images(
    Extension(images): Extension<Arc<ImageService>>,
    Path(id): Path<i32>,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<Value>, AppError> {
    let ids = parse_image_ids(body.get("imageIds").unwrap_or(&Value::Null))?;
    images.reorder(id, &ids).await?;
    Ok(Json(json!({ "message": "Images reordered successfully" })))
}
