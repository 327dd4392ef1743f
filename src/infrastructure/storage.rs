// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use url::Url;

use crate::config::settings::StorageSettings;
use crate::domain::repositories::storage_repository::{StorageError, StorageRepository};

/// S3 兼容对象存储实现（DigitalOcean Spaces、MinIO 等）
///
/// 上传的对象设置为公共可读
pub struct S3Storage {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Storage {
    pub fn new(
        region: String,
        bucket: String,
        access_key: String,
        secret_key: String,
        endpoint: Option<String>,
    ) -> Result<Self, StorageError> {
        let credentials =
            aws_sdk_s3::config::Credentials::new(access_key, secret_key, None, None, "static");

        let mut config_builder = aws_sdk_s3::config::Builder::new()
            .behavior_version(aws_config::BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new(region))
            .credentials_provider(credentials);

        if let Some(ep) = endpoint {
            let ep = normalize_endpoint(&ep, &bucket)?;
            config_builder = config_builder.endpoint_url(ep).force_path_style(true);
        }

        let config = config_builder.build();
        let client = aws_sdk_s3::Client::from_conf(config);

        Ok(Self { client, bucket })
    }
}

/// 规范化端点 URL
///
/// 补全缺省的 `https://`，并去掉虚拟主机风格中的 `<bucket>.` 前缀与路径
pub fn normalize_endpoint(endpoint: &str, bucket: &str) -> Result<String, StorageError> {
    let raw = if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("https://{}", endpoint)
    };
    let url = Url::parse(&raw).map_err(|e| StorageError::Other(format!("Invalid endpoint: {}", e)))?;
    let host = url
        .host_str()
        .ok_or_else(|| StorageError::Other(format!("Endpoint without host: {}", endpoint)))?;
    let bucket_prefix = format!("{}.", bucket);
    let host = host.strip_prefix(&bucket_prefix).unwrap_or(host);

    Ok(match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    })
}

#[async_trait]
impl StorageRepository for S3Storage {
    async fn save(
        &self,
        key: &str,
        data: &[u8],
        content_type: Option<String>,
    ) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .acl(ObjectCannedAcl::PublicRead)
            .set_content_type(content_type)
            .body(ByteStream::from(data.to_vec()))
            .send()
            .await
            .map_err(|e| StorageError::Other(e.to_string()))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Other(e.to_string()))?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_not_found() {
                    Ok(false)
                } else {
                    Err(StorageError::Other(service_error.to_string()))
                }
            }
        }
    }
}

/// 本地文件系统存储实现
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// 键只能是基础目录下的相对路径
    fn full_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.base_path.join(relative))
    }
}

#[async_trait]
impl StorageRepository for LocalStorage {
    async fn save(
        &self,
        key: &str,
        data: &[u8],
        _content_type: Option<String>,
    ) -> Result<(), StorageError> {
        let full_path = self.full_path(key)?;

        // 确保目录存在
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&full_path).await?;
        file.write_all(data).await?;
        file.flush().await?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let full_path = self.full_path(key)?;

        match fs::remove_file(&full_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let full_path = self.full_path(key)?;
        Ok(fs::try_exists(&full_path).await?)
    }
}

/// 存储工厂函数
///
/// 根据 `storage_type`（local、s3、memory）创建存储实现
pub fn create_storage_repository(
    settings: &StorageSettings,
) -> Result<Arc<dyn StorageRepository>, StorageError> {
    match settings.storage_type.as_str() {
        "local" => {
            let base_path = settings
                .local_path
                .clone()
                .unwrap_or_else(|| "./storage".to_string());
            Ok(Arc::new(LocalStorage::new(base_path)))
        }
        "s3" => {
            let required = |value: &Option<String>, name: &str| {
                value
                    .clone()
                    .ok_or_else(|| StorageError::Other(format!("storage.{} is required for s3", name)))
            };
            let storage = S3Storage::new(
                settings
                    .region
                    .clone()
                    .unwrap_or_else(|| "us-east-1".to_string()),
                required(&settings.bucket, "bucket")?,
                required(&settings.access_key, "access_key")?,
                required(&settings.secret_key, "secret_key")?,
                settings.endpoint.clone(),
            )?;
            Ok(Arc::new(storage))
        }
        "memory" => Ok(Arc::new(InMemoryStorage::new())),
        other => Err(StorageError::Other(format!(
            "Unsupported storage type: {}",
            other
        ))),
    }
}

/// 内存存储实现（用于测试与本地开发）
#[derive(Default)]
pub struct InMemoryStorage {
    data: RwLock<HashMap<String, (Vec<u8>, Option<String>)>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 对象的 MIME 类型
    pub async fn content_type(&self, key: &str) -> Option<String> {
        let map = self.data.read().await;
        map.get(key).and_then(|(_, content_type)| content_type.clone())
    }
}

#[async_trait]
impl StorageRepository for InMemoryStorage {
    async fn save(
        &self,
        key: &str,
        data: &[u8],
        content_type: Option<String>,
    ) -> Result<(), StorageError> {
        let mut map = self.data.write().await;
        map.insert(key.to_string(), (data.to_vec(), content_type));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let mut map = self.data.write().await;
        map.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let map = self.data.read().await;
        Ok(map.contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_endpoint_strips_bucket_subdomain() {
        assert_eq!(
            normalize_endpoint("https://kansaco.nyc3.digitaloceanspaces.com/", "kansaco").unwrap(),
            "https://nyc3.digitaloceanspaces.com"
        );
        assert_eq!(
            normalize_endpoint("nyc3.digitaloceanspaces.com", "kansaco").unwrap(),
            "https://nyc3.digitaloceanspaces.com"
        );
        assert_eq!(
            normalize_endpoint("http://localhost:9000", "kansaco").unwrap(),
            "http://localhost:9000"
        );
    }

    #[tokio::test]
    async fn test_local_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        storage
            .save("products/a.webp", b"img", Some("image/webp".to_string()))
            .await
            .unwrap();
        assert!(storage.exists("products/a.webp").await.unwrap());
        assert_eq!(
            std::fs::read(dir.path().join("products/a.webp")).unwrap(),
            b"img".to_vec()
        );

        storage.delete("products/a.webp").await.unwrap();
        assert!(!storage.exists("products/a.webp").await.unwrap());
        // deleting twice is not an error
        storage.delete("products/a.webp").await.unwrap();
    }

    #[tokio::test]
    async fn test_local_storage_rejects_parent_components() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        let err = storage.save("../escape.txt", b"x", None).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }

    #[tokio::test]
    async fn test_in_memory_storage_keeps_content_type() {
        let storage = InMemoryStorage::new();
        storage
            .save("products/b.png", b"png", Some("image/png".to_string()))
            .await
            .unwrap();

        assert_eq!(
            storage.content_type("products/b.png").await.as_deref(),
            Some("image/png")
        );
        assert!(!storage.exists("products/c.png").await.unwrap());
    }
}
