// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use uuid::Uuid;

use super::ServiceError;
use crate::config::settings::AuthSettings;
use crate::domain::models::user::UserRole;

/// JWT 声明
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,
    pub email: String,
    pub rol: UserRole,
    pub iat: i64,
    pub exp: i64,
}

/// 使用 Argon2 与随机盐哈希密码
pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!("Argon2 password hashing failed: {}", e);
            ServiceError::Internal(format!("Password hashing failed: {}", e))
        })
}

/// 校验密码；哈希格式无法解析时视为不匹配
pub fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            error!("Stored password hash is malformed: {}", e);
            false
        }
    }
}

/// 令牌签发与校验
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
}

impl AuthService {
    pub fn new(settings: &AuthSettings) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(settings.jwt_secret.as_bytes()),
            token_ttl: Duration::hours(settings.token_ttl_hours),
        }
    }

    /// 签发 HS256 令牌
    ///
    /// # 参数
    ///
    /// * `id` - 用户ID
    /// * `email` - 用户邮箱
    /// * `rol` - 用户角色
    ///
    /// # 返回值
    ///
    /// * `Ok(String)` - 编码后的令牌
    /// * `Err(ServiceError)` - 编码失败
    pub fn generate_token(&self, id: Uuid, email: &str, rol: UserRole) -> Result<String, ServiceError> {
        let now = Utc::now();
        let claims = Claims {
            id,
            email: email.to_string(),
            rol,
            iat: now.timestamp(),
            exp: (now + self.token_ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::Internal(format!("Token encoding failed: {}", e)))
    }

    /// 校验令牌并返回声明，失败时返回 401 `Invalid token`
    pub fn verify_token(&self, token: &str) -> Result<Claims, ServiceError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Token rejected: {}", e);
                ServiceError::Unauthorized("Invalid token".to_string())
            })
    }
}
