// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::DbErr;
use thiserror::Error;

/// 仓库接口模块
///
/// 该模块定义了领域层的仓库接口，遵循依赖倒置原则。
/// 仓库接口定义了数据持久化的抽象契约，具体实现由基础设施层提供。
///
/// 包含的仓库接口：
/// - 用户仓库（user_repository）：用户账户与折扣
/// - 产品仓库（product_repository）：产品目录、过滤与价格
/// - 产品图片仓库（product_image_repository）：图片记录、主图与排序
/// - 分类仓库（category_repository）：分类及其与产品的关联
/// - 购物车仓库（cart_repository）：购物车与原子数量更新
/// - 订单仓库（order_repository）：订单持久化与分页
/// - 存储仓库（storage_repository）：对象存储
pub mod cart_repository;
pub mod category_repository;
pub mod order_repository;
pub mod product_image_repository;
pub mod product_repository;
pub mod storage_repository;
pub mod user_repository;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
    /// 存储的数据无法映射为领域模型
    #[error("Corrupted record: {0}")]
    Corrupted(String),
}
