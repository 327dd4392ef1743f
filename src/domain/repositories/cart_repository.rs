// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use uuid::Uuid;

use super::RepositoryError;
use crate::domain::models::cart::Cart;

/// 购物车仓库特质
///
/// 数量增减均为单条 SQL 语句（`quantity = quantity ± n`），返回受影响行数
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// 根据ID查找购物车（含条目，不含产品详情）
    async fn find_by_id(&self, id: i32) -> Result<Option<Cart>, RepositoryError>;
    /// 查找用户的购物车
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Cart>, RepositoryError>;
    /// 为用户创建空购物车
    async fn create(&self, user_id: Uuid) -> Result<Cart, RepositoryError>;
    /// 增加匹配条目的数量，条目不存在时插入
    ///
    /// 单条 upsert 语句完成，并发请求不会产生重复条目
    async fn add_item(
        &self,
        cart_id: i32,
        product_id: i32,
        presentation: Option<&str>,
        quantity: i32,
    ) -> Result<(), RepositoryError>;
    /// 减少匹配条目的数量，并删除数量不大于零的条目
    async fn decrement_item(
        &self,
        cart_id: i32,
        product_id: i32,
        presentation: Option<&str>,
        quantity: i32,
    ) -> Result<u64, RepositoryError>;
    /// 清空购物车
    async fn clear(&self, cart_id: i32) -> Result<(), RepositoryError>;
}
