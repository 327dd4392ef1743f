// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use uuid::Uuid;

use super::RepositoryError;
use crate::domain::models::order::{NewOrder, Order, OrderStatus};

/// 订单仓库特质
///
/// 列表均按创建时间倒序
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError>;
    async fn find_all(&self) -> Result<Vec<Order>, RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, RepositoryError>;
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, RepositoryError>;
    /// 分页查询；`user_id` 为 `None` 时查询全部订单
    async fn find_paginated(
        &self,
        user_id: Option<Uuid>,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<Order>, u64), RepositoryError>;
    async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order, RepositoryError>;
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}
