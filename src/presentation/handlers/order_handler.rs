// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Extension, Path},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::domain::models::order::{Order, UpdateOrderStatusDto};
use crate::domain::models::pagination::PaginatedResponse;
use crate::domain::services::order_service::OrderService;
use crate::presentation::errors::AppError;
use crate::presentation::handlers::download::attachment_disposition;
use crate::presentation::extractors::current_user::CurrentUser;
use crate::presentation::extractors::json::{ApiJson, ApiQuery};

#[derive(Debug, Deserialize, IntoParams)]
pub struct PageParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// 全部订单（ADMIN/ASISTENTE）
#[utoipa::path(get, path = "/api/order", tag = "order", responses((status = 200, description = "{status, data}")))]
pub async fn list_orders(
    Extension(orders): Extension<Arc<OrderService>>,
) -> Result<Json<Value>, AppError> {
    let data = orders.find_all().await?;
    Ok(Json(json!({ "status": "success", "data": data })))
}

#[utoipa::path(get, path = "/api/order/my-orders", tag = "order", responses((status = 200, description = "{status, data}")))]
pub async fn my_orders(
    Extension(orders): Extension<Arc<OrderService>>,
    CurrentUser(caller): CurrentUser,
) -> Result<Json<Value>, AppError> {
    let data = orders.find_by_user(caller.id).await?;
    Ok(Json(json!({ "status": "success", "data": data })))
}

#[utoipa::path(
    get,
    path = "/api/order/my-orders/paginated",
    tag = "order",
    params(PageParams),
    responses((status = 200, description = "Paginated orders of the caller"))
)]
pub async fn my_orders_paginated(
    Extension(orders): Extension<Arc<OrderService>>,
    CurrentUser(caller): CurrentUser,
    ApiQuery(params): ApiQuery<PageParams>,
) -> Result<Json<PaginatedResponse<Order>>, AppError> {
    let page = orders
        .find_by_user_paginated(caller.id, params.page, params.limit)
        .await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/order/all/paginated",
    tag = "order",
    params(PageParams),
    responses((status = 200, description = "Paginated orders"))
)]
pub async fn all_orders_paginated(
    Extension(orders): Extension<Arc<OrderService>>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> Result<Json<PaginatedResponse<Order>>, AppError> {
    Ok(Json(orders.find_all_paginated(params.page, params.limit).await?))
}

/// 下载订单报价单 PDF
#[utoipa::path(
    get,
    path = "/api/order/{id}/pdf",
    tag = "order",
    params(("id" = Uuid, Path, description = "Order id")),
    responses((status = 200, description = "PDF attachment", content_type = "application/pdf"))
)]
pub async fn order_pdf(
    Extension(orders): Extension<Arc<OrderService>>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let pdf = orders.render_pdf(id).await?;
    let disposition = attachment_disposition(&pdf.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf.bytes,
    )
        .into_response())
}

/// 订单详情，仅所有者或员工可见
#[utoipa::path(
    get,
    path = "/api/order/{id}",
    tag = "order",
    params(("id" = Uuid, Path, description = "Order id")),
    responses((status = 200, description = "{status, data}"), (status = 403, description = "Not the owner"))
)]
pub async fn get_order(
    Extension(orders): Extension<Arc<OrderService>>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let order = orders.find_visible(id, caller.id, caller.rol).await?;
    Ok(Json(json!({ "status": "success", "data": order })))
}

#[utoipa::path(
    patch,
    path = "/api/order/{id}/status",
    tag = "order",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = UpdateOrderStatusDto,
    responses((status = 200, description = "{status, data}"))
)]
pub async fn update_order_status(
    Extension(orders): Extension<Arc<OrderService>>,
    Path(id): Path<Uuid>,
    ApiJson(dto): ApiJson<UpdateOrderStatusDto>,
) -> Result<Json<Value>, AppError> {
    let order = orders.update_status(id, dto.status).await?;
    Ok(Json(json!({ "status": "success", "data": order })))
}

#[utoipa::path(
    delete,
    path = "/api/order/{id}",
    tag = "order",
    params(("id" = Uuid, Path, description = "Order id")),
    responses((status = 200, description = "Order deleted"))
)]
pub async fn delete_order(
    Extension(orders): Extension<Arc<OrderService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    orders.remove(id).await?;
    Ok(Json(json!({ "status": "success", "message": "Order deleted successfully" })))
}
