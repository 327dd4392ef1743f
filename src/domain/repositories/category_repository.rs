// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::models::category::Category;

/// 分类仓库特质
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// 全部分类，按名称排序
    async fn find_all(&self) -> Result<Vec<Category>, RepositoryError>;
    /// 根据ID查找
    async fn find_by_id(&self, id: i32) -> Result<Option<Category>, RepositoryError>;
    /// 根据名称精确查找
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepositoryError>;
    /// 批量按名称查找
    async fn find_by_names(&self, names: &[String]) -> Result<Vec<Category>, RepositoryError>;
    /// 创建分类
    async fn create(&self, name: &str) -> Result<Category, RepositoryError>;
    /// 重命名分类
    async fn rename(&self, id: i32, name: &str) -> Result<Category, RepositoryError>;
    /// 删除分类
    async fn delete(&self, id: i32) -> Result<(), RepositoryError>;
    /// 使用该分类的产品数量
    async fn count_products(&self, id: i32) -> Result<u64, RepositoryError>;
}
