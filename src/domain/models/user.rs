// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// 用户角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Asistente,
    ClienteMinorista,
    ClienteMayorista,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::Asistente => "ASISTENTE",
            UserRole::ClienteMinorista => "CLIENTE_MINORISTA",
            UserRole::ClienteMayorista => "CLIENTE_MAYORISTA",
        }
    }

    /// 是否为内部员工（管理员或助理）
    pub fn is_staff(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Asistente)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(UserRole::Admin),
            "ASISTENTE" => Ok(UserRole::Asistente),
            "CLIENTE_MINORISTA" => Ok(UserRole::ClienteMinorista),
            "CLIENTE_MAYORISTA" => Ok(UserRole::ClienteMayorista),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// 折扣
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Discount {
    pub id: i32,
    #[schema(value_type = String)]
    pub porcentaje: Decimal,
}

/// 用户
///
/// `password` 保存哈希值，序列化时总是省略
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub nombre: String,
    pub apellido: String,
    pub direccion: Option<String>,
    pub telefono: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub rol: UserRole,
    #[serde(default)]
    pub descuentos_aplicados: Vec<Discount>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.nombre, self.apellido)
    }
}

/// 注册请求
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateUserDto {
    pub email: String,
    pub password: String,
    pub nombre: String,
    pub apellido: String,
    pub direccion: Option<String>,
    #[serde(default)]
    pub telefono: String,
    pub rol: Option<UserRole>,
}

/// 更新请求，所有字段可选
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateUserDto {
    pub email: Option<String>,
    pub password: Option<String>,
    pub nombre: Option<String>,
    pub apellido: Option<String>,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
    pub rol: Option<UserRole>,
}

/// 登录请求
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginDto {
    pub email: String,
    pub password: String,
}

/// 登录响应
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// 新用户（已规范化、已哈希）
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub nombre: String,
    pub apellido: String,
    pub direccion: Option<String>,
    pub telefono: String,
    pub rol: UserRole,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_strings() {
        for role in [
            UserRole::Admin,
            UserRole::Asistente,
            UserRole::ClienteMinorista,
            UserRole::ClienteMayorista,
        ] {
            assert_eq!(role.to_string().parse::<UserRole>().unwrap(), role);
        }
        assert!("ROOT".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_password_is_never_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            email: "ana@example.com".to_string(),
            nombre: "Ana".to_string(),
            apellido: "Gómez".to_string(),
            direccion: None,
            telefono: "1122334455".to_string(),
            password: "hash".to_string(),
            rol: UserRole::ClienteMayorista,
            descuentos_aplicados: vec![],
        };

        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("password").is_none());
        assert_eq!(value["rol"], "CLIENTE_MAYORISTA");
        assert_eq!(value["descuentosAplicados"], serde_json::json!([]));
    }
}
