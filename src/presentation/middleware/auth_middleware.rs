// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::domain::models::user::UserRole;
use crate::domain::services::auth_service::AuthService;
use crate::presentation::errors::HttpError;

/// 认证状态
#[derive(Clone)]
pub struct AuthState {
    /// 令牌服务
    pub auth: Arc<AuthService>,
}

/// 通过认证的调用者，由认证中间件写入请求扩展
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
    pub rol: UserRole,
}

/// 从 `Authorization` 头中取出 Bearer 令牌
fn bearer_token(req: &Request) -> Result<&str, HttpError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| HttpError::unauthorized("Authorization header missing"))?
        .to_str()
        .map_err(|_| HttpError::unauthorized("Invalid authorization format"))?;

    match value.split_once(' ') {
        Some(("Bearer", token)) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(HttpError::unauthorized("Invalid authorization format")),
    }
}

/// 认证中间件
///
/// 验证请求中的 JWT 令牌
///
/// # 参数
///
/// * `state` - 认证状态
/// * `req` - HTTP请求
/// * `next` - 下一个中间件
///
/// # 返回值
///
/// * `Ok(Response)` - 认证成功的响应
/// * `Err(HttpError)` - 401 及原因
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, HttpError> {
    debug!("AuthMiddleware processing path: {}", req.uri().path());

    let claims = {
        let token = bearer_token(&req)?;
        state
            .auth
            .verify_token(token)
            .map_err(|_| HttpError::unauthorized("Invalid token"))?
    };

    req.extensions_mut().insert(AuthenticatedUser {
        id: claims.id,
        email: claims.email,
        rol: claims.rol,
    });
    Ok(next.run(req).await)
}
