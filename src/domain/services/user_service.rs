// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::ValidateEmail;

use super::auth_service::{hash_password, verify_password, AuthService};
use super::ServiceError;
use crate::domain::models::user::{
    CreateUserDto, LoginDto, LoginResponse, NewUser, UpdateUserDto, User, UserRole,
};
use crate::domain::repositories::cart_repository::CartRepository;
use crate::domain::repositories::user_repository::{UserChanges, UserRepository};

const MIN_PASSWORD_LEN: usize = 8;
const MIN_NAME_LEN: usize = 2;

/// 规范化邮箱：去除首尾空白并转为小写
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_password(password: &str) -> Result<(), ServiceError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ServiceError::BadRequest("Password is too short".to_string()));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), ServiceError> {
    if !email.validate_email() {
        return Err(ServiceError::BadRequest("Email is not valid".to_string()));
    }
    Ok(())
}

fn validate_name(value: &str, field: &str) -> Result<(), ServiceError> {
    if value.trim().chars().count() < MIN_NAME_LEN {
        return Err(ServiceError::BadRequest(format!("{} is too short", field)));
    }
    Ok(())
}

/// 用户服务
///
/// 注册时同时为用户创建购物车
pub struct UserService {
    users: Arc<dyn UserRepository>,
    carts: Arc<dyn CartRepository>,
    auth: Arc<AuthService>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        carts: Arc<dyn CartRepository>,
        auth: Arc<AuthService>,
    ) -> Self {
        Self { users, carts, auth }
    }

    /// 注册新用户
    ///
    /// 依次校验邮箱格式、密码长度、名与姓长度，然后检查邮箱是否已被占用
    pub async fn create(&self, dto: CreateUserDto) -> Result<User, ServiceError> {
        let email = normalize_email(&dto.email);
        validate_email(&email)?;
        validate_password(&dto.password)?;
        validate_name(&dto.nombre, "Nombre")?;
        validate_name(&dto.apellido, "Apellido")?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(ServiceError::Conflict(
                "User with this email already exists".to_string(),
            ));
        }

        let user = self
            .users
            .create(NewUser {
                email,
                password_hash: hash_password(&dto.password)?,
                nombre: dto.nombre.trim().to_string(),
                apellido: dto.apellido.trim().to_string(),
                direccion: dto.direccion,
                telefono: dto.telefono,
                rol: dto.rol.unwrap_or(UserRole::ClienteMinorista),
            })
            .await?;

        self.carts.create(user.id).await?;
        info!("Registered user {} with role {}", user.id, user.rol);

        Ok(user)
    }

    pub async fn find_all(&self) -> Result<Vec<User>, ServiceError> {
        Ok(self.users.find_all().await?)
    }

    pub async fn find_one(&self, id: Uuid) -> Result<User, ServiceError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }

    /// 更新用户资料；新邮箱不得属于其他用户，新密码重新哈希
    pub async fn update(&self, id: Uuid, dto: UpdateUserDto) -> Result<User, ServiceError> {
        self.find_one(id).await?;

        let email = match dto.email.as_deref() {
            Some(raw) => {
                let email = normalize_email(raw);
                validate_email(&email)?;
                if let Some(owner) = self.users.find_by_email(&email).await? {
                    if owner.id != id {
                        return Err(ServiceError::Conflict("Email already in use".to_string()));
                    }
                }
                Some(email)
            }
            None => None,
        };

        let password_hash = match dto.password.as_deref() {
            Some(password) => {
                validate_password(password)?;
                Some(hash_password(password)?)
            }
            None => None,
        };

        if let Some(nombre) = dto.nombre.as_deref() {
            validate_name(nombre, "Nombre")?;
        }
        if let Some(apellido) = dto.apellido.as_deref() {
            validate_name(apellido, "Apellido")?;
        }

        let changes = UserChanges {
            email,
            password_hash,
            nombre: dto.nombre.map(|n| n.trim().to_string()),
            apellido: dto.apellido.map(|a| a.trim().to_string()),
            direccion: dto.direccion,
            telefono: dto.telefono,
            rol: dto.rol,
        };

        Ok(self.users.update(id, changes).await?)
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), ServiceError> {
        self.find_one(id).await?;
        self.users.delete(id).await?;
        info!("Deleted user {}", id);
        Ok(())
    }

    /// 登录；用户不存在或密码错误均返回 401
    pub async fn login(&self, dto: LoginDto) -> Result<LoginResponse, ServiceError> {
        let email = normalize_email(&dto.email);
        let invalid = || ServiceError::Unauthorized("Credenciales inválidas".to_string());

        let user = self.users.find_by_email(&email).await?.ok_or_else(invalid)?;
        if !verify_password(&user.password, &dto.password) {
            return Err(invalid());
        }

        let token = self.auth.generate_token(user.id, &user.email, user.rol)?;
        Ok(LoginResponse { token, user })
    }
}
