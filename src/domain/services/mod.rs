// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

use crate::domain::repositories::storage_repository::StorageError;
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::pdf::PdfError;

/// 领域服务模块
///
/// 该模块包含系统的核心业务逻辑服务，这些服务封装了
/// 业务规则和领域逻辑，协调多个仓库来完成业务操作。
///
/// 包含的服务：
/// - 认证服务（auth_service）：密码哈希与 JWT 签发、校验
/// - 用户服务（user_service）：注册、登录与用户维护
/// - 分类服务（category_service）：分类维护与按名称查找或创建
/// - 产品服务（product_service）：目录、过滤分页与价格表导入导出
/// - 图片服务（image_service）：产品图片上传、关联、主图与排序
/// - 购物车服务（cart_service）：按包装规格合并的原子数量更新
/// - 订单服务（order_service）：订单持久化、查询与状态
/// - 邮件服务（email_service）：网页下单流程与邮件内容
/// - 报价单服务（presupuesto_service）：报价单 PDF 与队列消息处理
pub mod auth_service;
pub mod cart_service;
pub mod category_service;
pub mod email_service;
pub mod image_service;
pub mod order_service;
pub mod presupuesto_service;
pub mod product_service;
pub mod user_service;

#[cfg(test)]
pub(crate) mod test_support;

#[cfg(test)]
mod cart_service_test;
#[cfg(test)]
mod user_service_test;

/// 服务错误类型
///
/// 前五种变体直接对应 HTTP 状态，消息原样返回给客户端
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Pdf(#[from] PdfError),
    #[error("{0}")]
    Internal(String),
}

/// 将 validator 的校验错误拼接为一条消息
pub(crate) fn validation_message(errors: &validator::ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect();
    messages.sort();
    messages.join(", ")
}
