// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::domain::models::cart::{Cart, CreateCartDto};
use crate::domain::services::cart_service::CartService;
use crate::presentation::errors::AppError;
use crate::presentation::extractors::json::{ApiJson, ApiQuery};

/// 条目数量与包装规格
#[derive(Debug, Deserialize, IntoParams)]
pub struct CartItemParams {
    /// 默认 1
    pub quantity: Option<i32>,
    pub presentation: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/cart/user/{userId}",
    tag = "cart",
    params(("userId" = Uuid, Path, description = "Owner id")),
    responses((status = 200, body = Cart), (status = 404, description = "Cart not found"))
)]
pub async fn get_cart_by_user(
    Extension(carts): Extension<Arc<CartService>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Cart>, AppError> {
    Ok(Json(carts.get_by_user(user_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/cart/{id}",
    tag = "cart",
    params(("id" = i32, Path, description = "Cart id")),
    responses((status = 200, body = Cart), (status = 404, description = "Cart not found"))
)]
pub async fn get_cart(
    Extension(carts): Extension<Arc<CartService>>,
    Path(id): Path<i32>,
) -> Result<Json<Cart>, AppError> {
    Ok(Json(carts.get(id).await?))
}

/// 创建购物车；用户已有购物车时返回现有的
#[utoipa::path(
    post,
    path = "/api/cart/create",
    tag = "cart",
    request_body = CreateCartDto,
    responses((status = 201, body = Cart), (status = 404, description = "User not found"))
)]
pub async fn create_cart(
    Extension(carts): Extension<Arc<CartService>>,
    ApiJson(dto): ApiJson<CreateCartDto>,
) -> Result<(StatusCode, Json<Cart>), AppError> {
    let cart = carts.create(dto.user_id).await?;
    Ok((StatusCode::CREATED, Json(cart)))
}

#[utoipa::path(
    put,
    path = "/api/cart/{id}/add/product/{productId}",
    tag = "cart",
    params(
        ("id" = i32, Path, description = "Cart id"),
        ("productId" = i32, Path, description = "Product id"),
        CartItemParams
    ),
    responses((status = 200, body = Cart), (status = 400, description = "Invalid quantity or presentation"))
)]
pub async fn add_item(
    Extension(carts): Extension<Arc<CartService>>,
    Path((id, product_id)): Path<(i32, i32)>,
    ApiQuery(params): ApiQuery<CartItemParams>,
) -> Result<Json<Cart>, AppError> {
    let cart = carts
        .add_item(id, product_id, params.quantity.unwrap_or(1), params.presentation.as_deref())
        .await?;
    Ok(Json(cart))
}

#[utoipa::path(
    patch,
    path = "/api/cart/{id}/delete/product/{productId}",
    tag = "cart",
    params(
        ("id" = i32, Path, description = "Cart id"),
        ("productId" = i32, Path, description = "Product id"),
        CartItemParams
    ),
    responses((status = 200, body = Cart), (status = 400, description = "Item not in cart"))
)]
pub async fn delete_item(
    Extension(carts): Extension<Arc<CartService>>,
    Path((id, product_id)): Path<(i32, i32)>,
    ApiQuery(params): ApiQuery<CartItemParams>,
) -> Result<Json<Cart>, AppError> {
    let cart = carts
        .delete_item(id, product_id, params.quantity.unwrap_or(1), params.presentation.as_deref())
        .await?;
    Ok(Json(cart))
}

#[utoipa::path(
    patch,
    path = "/api/cart/{id}/empty",
    tag = "cart",
    params(("id" = i32, Path, description = "Cart id")),
    responses((status = 200, body = Cart))
)]
pub async fn empty_cart(
    Extension(carts): Extension<Arc<CartService>>,
    Path(id): Path<i32>,
) -> Result<Json<Cart>, AppError> {
    Ok(Json(carts.empty(id).await?))
}
