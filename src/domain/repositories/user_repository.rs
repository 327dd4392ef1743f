// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use uuid::Uuid;

use super::RepositoryError;
use crate::domain::models::user::{NewUser, User, UserRole};

/// 用户字段更新；`None` 表示保持不变
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub nombre: Option<String>,
    pub apellido: Option<String>,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
    pub rol: Option<UserRole>,
}

/// 用户仓库特质
///
/// 查询结果均带有已应用的折扣
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 创建用户
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError>;
    /// 根据ID查找用户
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError>;
    /// 根据邮箱查找用户（邮箱已规范化为小写）
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
    /// 列出全部用户
    async fn find_all(&self) -> Result<Vec<User>, RepositoryError>;
    /// 更新用户
    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<User, RepositoryError>;
    /// 删除用户
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}
