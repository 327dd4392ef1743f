// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 数据库实体模块
///
/// 定义数据库表对应的实体结构
/// 使用SeaORM框架进行对象关系映射
pub mod cart;
pub mod cart_item;
pub mod category;
pub mod discount;
pub mod order;
pub mod product;
pub mod product_category;
pub mod product_discount;
pub mod product_image;
pub mod user;
pub mod user_discount;
