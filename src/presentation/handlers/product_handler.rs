// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Extension, Multipart, Path},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;
use utoipa::IntoParams;

use crate::domain::models::pagination::PaginatedResponse;
use crate::domain::models::product::{CreateProductDto, Product, UpdateProductDto};
use crate::domain::services::product_service::{parse_filters, ProductService};
use crate::presentation::errors::{AppError, HttpError};
use crate::presentation::handlers::download::attachment_disposition;
use crate::presentation::extractors::json::{ApiJson, ApiQuery};

/// 分页与过滤参数
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct ProductListParams {
    /// 页码，默认 1
    page: Option<u64>,
    /// 每页数量，默认 20，最大 100
    limit: Option<u64>,
    name: Option<String>,
    slug: Option<String>,
    sku: Option<String>,
    whole_saler: Option<String>,
    /// 可重复
    category: Option<Vec<String>>,
    stock: Option<i32>,
    is_visible: Option<bool>,
    is_featured: Option<bool>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ExportParams {
    /// `csv`、`xml` 或 `xlsx`
    pub format: Option<String>,
}

fn parse_number(key: &str, value: &str) -> Result<u64, HttpError> {
    value
        .trim()
        .parse()
        .map_err(|_| HttpError::bad_request(format!("{} must be a positive integer", key)))
}

/// 分页查询产品
#[utoipa::path(
    get,
    path = "/api/product",
    tag = "product",
    params(ProductListParams),
    responses((status = 200, description = "Paginated products"), (status = 400, description = "Invalid filters"))
)]
pub async fn list_products(
    Extension(products): Extension<Arc<ProductService>>,
    ApiQuery(params): ApiQuery<Vec<(String, String)>>,
) -> Result<Json<PaginatedResponse<Product>>, AppError> {
    let mut page = None;
    let mut limit = None;
    let mut rest = Vec::with_capacity(params.len());
    for (key, value) in params {
        match key.as_str() {
            "page" if !value.trim().is_empty() => page = Some(parse_number("page", &value)?),
            "limit" if !value.trim().is_empty() => limit = Some(parse_number("limit", &value)?),
            "page" | "limit" => {}
            _ => rest.push((key, value)),
        }
    }

    let filters = parse_filters(&rest)?;
    Ok(Json(products.list_paginated(page, limit, &filters).await?))
}

/// 按条件过滤产品（不分页）
#[utoipa::path(
    get,
    path = "/api/product/filter",
    tag = "product",
    responses((status = 200, body = Vec<Product>), (status = 400, description = "Unknown column"))
)]
pub async fn filter_products(
    Extension(products): Extension<Arc<ProductService>>,
    ApiQuery(params): ApiQuery<Vec<(String, String)>>,
) -> Result<Json<Vec<Product>>, AppError> {
    let filters = parse_filters(&params)?;
    Ok(Json(products.list_filtered(&filters).await?))
}

#[utoipa::path(
    get,
    path = "/api/product/{id}",
    tag = "product",
    params(("id" = i32, Path, description = "Product id")),
    responses((status = 200, body = Product), (status = 404, description = "Product not found"))
)]
pub async fn get_product(
    Extension(products): Extension<Arc<ProductService>>,
    Path(id): Path<i32>,
) -> Result<Json<Product>, AppError> {
    Ok(Json(products.get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/product/{id}/edit",
    tag = "product",
    params(("id" = i32, Path, description = "Product id")),
    request_body = UpdateProductDto,
    responses((status = 200, body = Product))
)]
pub async fn edit_product(
    Extension(products): Extension<Arc<ProductService>>,
    Path(id): Path<i32>,
    ApiJson(dto): ApiJson<UpdateProductDto>,
) -> Result<Json<Product>, AppError> {
    Ok(Json(products.edit(id, dto).await?))
}

#[utoipa::path(
    post,
    path = "/api/product/create",
    tag = "product",
    request_body = CreateProductDto,
    responses((status = 201, body = Product))
)]
pub async fn create_product(
    Extension(products): Extension<Arc<ProductService>>,
    ApiJson(dto): ApiJson<CreateProductDto>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let product = products.create(dto).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[utoipa::path(
    delete,
    path = "/api/product/{id}",
    tag = "product",
    params(("id" = i32, Path, description = "Product id")),
    responses((status = 200, body = Product), (status = 409, description = "Product in use"))
)]
pub async fn delete_product(
    Extension(products): Extension<Arc<ProductService>>,
    Path(id): Path<i32>,
) -> Result<Json<Product>, AppError> {
    Ok(Json(products.delete(id).await?))
}

/// 下载价格表
#[utoipa::path(
    get,
    path = "/api/product/file/listUpdatePrices",
    tag = "product",
    params(ExportParams),
    responses((status = 200, description = "Price list file"), (status = 400, description = "Format Unnacepted"))
)]
pub async fn export_prices(
    Extension(products): Extension<Arc<ProductService>>,
    ApiQuery(params): ApiQuery<ExportParams>,
) -> Result<Response, AppError> {
    debug!("Started file generation");
    let file = products
        .export_prices(params.format.as_deref().unwrap_or_default())
        .await?;
    debug!("Ended file generation");

    let disposition = attachment_disposition(&file.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response())
}

/// 上传价格表（multipart 字段 `file`）
#[utoipa::path(
    patch,
    path = "/api/product/file/updatePrices",
    tag = "product",
    responses((status = 200, body = Vec<Product>), (status = 400, description = "Invalid file or no changes"))
)]
pub async fn update_prices(
    Extension(products): Extension<Arc<ProductService>>,
    mut multipart: Multipart,
) -> Result<Json<Vec<Product>>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| HttpError::bad_request(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| HttpError::bad_request(e.body_text()))?;
        return Ok(Json(products.import_prices(&file_name, &bytes).await?));
    }

    Err(HttpError::bad_request("No file uploaded").into())
}
