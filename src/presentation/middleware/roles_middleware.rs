// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;

use super::auth_middleware::AuthenticatedUser;
use crate::domain::models::user::UserRole;
use crate::domain::repositories::user_repository::UserRepository;
use crate::presentation::errors::{AppError, HttpError};

pub const STAFF: &[UserRole] = &[UserRole::Admin, UserRole::Asistente];
pub const ADMIN_ONLY: &[UserRole] = &[UserRole::Admin];

/// 角色守卫状态
#[derive(Clone)]
pub struct RolesState {
    pub users: Arc<dyn UserRepository>,
    pub roles: &'static [UserRole],
}

impl RolesState {
    pub fn new(users: Arc<dyn UserRepository>, roles: &'static [UserRole]) -> Self {
        Self { users, roles }
    }
}

/// 角色守卫，须位于认证中间件之后
///
/// 以数据库中的当前角色为准，而不是令牌中的角色
pub async fn roles_middleware(
    State(state): State<RolesState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let caller = req
        .extensions()
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or_else(|| HttpError::unauthorized("Authorization header missing"))?;

    let user = state
        .users
        .find_by_id(caller.id)
        .await?
        .ok_or_else(|| HttpError::unauthorized("User not found"))?;

    if !state.roles.contains(&user.rol) {
        warn!("User {} with role {} denied on {}", user.id, user.rol, req.uri().path());
        let names: Vec<&str> = state.roles.iter().map(|r| r.as_str()).collect();
        return Err(HttpError::forbidden(format!("Requires one of: {}", names.join(", "))).into());
    }

    Ok(next.run(req).await)
}
