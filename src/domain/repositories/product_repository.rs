// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::RepositoryError;
use crate::domain::models::product::{NewProduct, Product, ProductChanges, ProductFilters};

/// 产品仓库特质
///
/// 返回的产品带有分类与排序后的图片
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// 按过滤条件分页查询，按 id 升序
    ///
    /// # 参数
    ///
    /// * `filters` - 过滤条件
    /// * `page` - 页码（从 1 开始）
    /// * `limit` - 每页数量
    ///
    /// # 返回值
    ///
    /// 当前页的产品与匹配总数
    async fn find_paginated(
        &self,
        filters: &ProductFilters,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<Product>, u64), RepositoryError>;
    /// 按过滤条件查询全部匹配产品
    async fn find_filtered(&self, filters: &ProductFilters) -> Result<Vec<Product>, RepositoryError>;
    /// 根据ID查找产品
    async fn find_by_id(&self, id: i32) -> Result<Option<Product>, RepositoryError>;
    /// 批量查找产品
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Product>, RepositoryError>;
    /// 创建产品并关联分类
    async fn create(&self, product: NewProduct, category_ids: &[i32]) -> Result<Product, RepositoryError>;
    /// 部分更新产品
    async fn update(&self, id: i32, changes: ProductChanges) -> Result<Product, RepositoryError>;
    /// 删除产品
    async fn delete(&self, id: i32) -> Result<(), RepositoryError>;
    /// 全部产品的 id、名称与价格，按 id 升序
    async fn price_list(&self) -> Result<Vec<(i32, String, Decimal)>, RepositoryError>;
    /// 批量写入价格
    async fn update_prices(&self, prices: &[(i32, Decimal)]) -> Result<(), RepositoryError>;
}
