// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 用户（user）：账户、角色与折扣
/// - 产品（product）：目录、图片与过滤条件
/// - 分类（category）：产品分类
/// - 购物车（cart）：每个用户的购物车及其条目
/// - 订单（order）：网页订单及其明细
/// - 邮件（email）：发往内网后端的邮件消息
/// - 分页（pagination）：分页响应
/// - 报价单（presupuesto）：报价单 PDF 与邮件数据
pub mod cart;
pub mod category;
pub mod email;
pub mod order;
pub mod pagination;
pub mod presupuesto;
pub mod product;
pub mod user;
