// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{extract::Extension, http::StatusCode, Json};
use std::sync::Arc;
use validator::Validate;

use crate::domain::models::order::SendOrderDto;
use crate::domain::services::email_service::{EmailService, SendOrderResponse};
use crate::domain::services::validation_message;
use crate::presentation::errors::{AppError, HttpError};
use crate::presentation::extractors::current_user::CurrentUser;
use crate::presentation::extractors::json::ApiJson;

/// 网页下单：购物车 → 订单 → 报价单 PDF → 邮件消息
#[utoipa::path(
    post,
    path = "/api/email/send-order",
    tag = "email",
    request_body = SendOrderDto,
    responses(
        (status = 201, body = SendOrderResponse),
        (status = 404, description = "Cart not found")
    )
)]
pub async fn send_order(
    Extension(email): Extension<Arc<EmailService>>,
    CurrentUser(caller): CurrentUser,
    ApiJson(dto): ApiJson<SendOrderDto>,
) -> Result<(StatusCode, Json<SendOrderResponse>), AppError> {
    dto.validate()
        .map_err(|e| HttpError::bad_request(validation_message(&e)))?;

    let response = email.send_order(caller.id, &caller.email, dto).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
