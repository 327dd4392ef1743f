// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use thiserror::Error;

/// 存储错误类型
#[derive(Error, Debug)]
pub enum StorageError {
    /// IO错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// 非法的对象键
    #[error("Invalid key: {0}")]
    InvalidKey(String),
    /// 存储错误
    #[error("Storage error: {0}")]
    Other(String),
}

/// 存储仓库特质
///
/// 定义对象存储访问接口，键为桶内相对路径（如 `products/a.webp`）
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageRepository: Send + Sync {
    /// 使用指定键保存数据，`content_type` 为空时由实现决定
    async fn save(
        &self,
        key: &str,
        data: &[u8],
        content_type: Option<String>,
    ) -> Result<(), StorageError>;

    /// 根据键从存储中删除数据
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// 检查存储中是否存在指定键
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;
}
