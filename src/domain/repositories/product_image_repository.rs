// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::models::product::{NewProductImage, ProductImage};

/// 产品图片仓库特质
#[async_trait]
pub trait ProductImageRepository: Send + Sync {
    /// 产品的图片，主图优先，其次按顺序
    async fn find_by_product(&self, product_id: i32) -> Result<Vec<ProductImage>, RepositoryError>;
    /// 查找属于该产品的图片
    async fn find_one(&self, product_id: i32, image_id: i32) -> Result<Option<ProductImage>, RepositoryError>;
    /// 追加图片，顺序为当前最大值加一；设为主图时清除其他主图
    async fn add(&self, image: NewProductImage) -> Result<ProductImage, RepositoryError>;
    /// 删除图片记录
    async fn delete(&self, image_id: i32) -> Result<(), RepositoryError>;
    /// 设置主图
    async fn set_primary(&self, product_id: i32, image_id: i32) -> Result<ProductImage, RepositoryError>;
    /// 按给定顺序重排，下标即新顺序
    async fn reorder(&self, product_id: i32, image_ids: &[i32]) -> Result<(), RepositoryError>;
}
