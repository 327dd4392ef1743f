// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use tracing::{info, warn};

use super::ServiceError;
use crate::domain::models::product::{NewProductImage, ProductImage};
use crate::domain::repositories::product_image_repository::ProductImageRepository;
use crate::domain::repositories::product_repository::ProductRepository;
use crate::domain::repositories::storage_repository::StorageRepository;
use crate::utils::image_name::{candidate_keys, clean_image_name, product_image_key, public_url};

/// 上传图片的大小上限（10 MB）
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

const ALLOWED_CONTENT_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// 清理图片 URL 与键中的重复扩展名
pub fn present_image(mut image: ProductImage) -> ProductImage {
    image.image_url = clean_image_name(&image.image_url);
    image.image_key = clean_image_name(&image.image_key);
    image
}

/// 上传的图片文件
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// 产品图片服务
pub struct ImageService {
    products: Arc<dyn ProductRepository>,
    images: Arc<dyn ProductImageRepository>,
    storage: Arc<dyn StorageRepository>,
    public_base_url: String,
}

impl ImageService {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        images: Arc<dyn ProductImageRepository>,
        storage: Arc<dyn StorageRepository>,
        public_base_url: String,
    ) -> Self {
        Self {
            products,
            images,
            storage,
            public_base_url,
        }
    }

    async fn ensure_product(&self, product_id: i32) -> Result<(), ServiceError> {
        if self.products.find_by_id(product_id).await?.is_none() {
            return Err(ServiceError::NotFound(format!(
                "Product with id: {} not found",
                product_id
            )));
        }
        Ok(())
    }

    async fn require_image(&self, product_id: i32, image_id: i32) -> Result<ProductImage, ServiceError> {
        self.images
            .find_one(product_id, image_id)
            .await?
            .ok_or_else(|| {
                ServiceError::BadRequest(format!(
                    "Image with id: {} not found for product {}",
                    image_id, product_id
                ))
            })
    }

    /// 上传图片到对象存储并登记到产品
    pub async fn upload(
        &self,
        product_id: i32,
        file: UploadedImage,
        is_primary: bool,
    ) -> Result<ProductImage, ServiceError> {
        let content_type = file.content_type.to_ascii_lowercase();
        if !ALLOWED_CONTENT_TYPES.contains(&content_type.as_str()) {
            return Err(ServiceError::BadRequest(
                "Invalid file type. Only images (JPEG, PNG, GIF, WEBP) are allowed.".to_string(),
            ));
        }
        if file.bytes.len() > MAX_IMAGE_BYTES {
            return Err(ServiceError::BadRequest(
                "File exceeds the 10 MB limit".to_string(),
            ));
        }
        self.ensure_product(product_id).await?;

        let key = product_image_key(&file.file_name);
        self.storage
            .save(&key, &file.bytes, Some(content_type))
            .await?;
        info!("Stored image {} for product {}", key, product_id);

        let url = public_url(&self.public_base_url, &key);
        self.add_image(product_id, url, key, is_primary).await
    }

    /// 登记已存储的图片；设为主图时清除其他主图
    pub async fn add_image(
        &self,
        product_id: i32,
        image_url: String,
        image_key: String,
        is_primary: bool,
    ) -> Result<ProductImage, ServiceError> {
        self.ensure_product(product_id).await?;
        let image = self
            .images
            .add(NewProductImage {
                product_id,
                image_url,
                image_key,
                is_primary,
            })
            .await?;
        Ok(present_image(image))
    }

    /// 关联存储桶中已有的对象
    ///
    /// 依次尝试原键与其带或不带 `products/` 前缀的孪生键，使用第一个存在的键
    pub async fn associate(
        &self,
        product_id: i32,
        image_key: &str,
        is_primary: bool,
    ) -> Result<ProductImage, ServiceError> {
        if image_key.trim().trim_start_matches('/').is_empty() {
            return Err(ServiceError::BadRequest("imageKey is required".to_string()));
        }
        self.ensure_product(product_id).await?;

        let candidates = candidate_keys(image_key);
        for key in &candidates {
            if self.storage.exists(key).await? {
                let url = public_url(&self.public_base_url, key);
                return self.add_image(product_id, url, key.clone(), is_primary).await;
            }
        }

        Err(ServiceError::BadRequest(format!(
            "Image not found in storage. Tried keys: {}",
            candidates.join(", ")
        )))
    }

    pub async fn list(&self, product_id: i32) -> Result<Vec<ProductImage>, ServiceError> {
        let images = self.images.find_by_product(product_id).await?;
        Ok(images.into_iter().map(present_image).collect())
    }

    /// 删除图片记录；存储中的对象删除失败只记录警告
    pub async fn delete(&self, product_id: i32, image_id: i32) -> Result<(), ServiceError> {
        let image = self.require_image(product_id, image_id).await?;

        if let Err(e) = self.storage.delete(&image.image_key).await {
            warn!("Failed to delete stored image {}: {}", image.image_key, e);
        }

        self.images.delete(image_id).await?;
        info!("Deleted image {} of product {}", image_id, product_id);
        Ok(())
    }

    pub async fn set_primary(&self, product_id: i32, image_id: i32) -> Result<ProductImage, ServiceError> {
        self.require_image(product_id, image_id).await?;
        let image = self.images.set_primary(product_id, image_id).await?;
        Ok(present_image(image))
    }

    /// 按给定顺序重排图片，下标即新顺序
    pub async fn reorder(&self, product_id: i32, image_ids: &[i32]) -> Result<(), ServiceError> {
        if image_ids.is_empty() {
            return Err(ServiceError::BadRequest(
                "imageIds must be a non-empty array".to_string(),
            ));
        }
        self.ensure_product(product_id).await?;
        self.images.reorder(product_id, image_ids).await?;
        Ok(())
    }
}

/// 解析重排请求中的图片ID；每个元素都必须是整数
pub fn parse_image_ids(value: &serde_json::Value) -> Result<Vec<i32>, ServiceError> {
    let items = value
        .as_array()
        .filter(|items| !items.is_empty())
        .ok_or_else(|| ServiceError::BadRequest("imageIds must be a non-empty array".to_string()))?;

    items
        .iter()
        .map(|item| {
            let parsed = match item {
                serde_json::Value::Number(n) => n.as_i64(),
                serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            };
            parsed
                .and_then(|id| i32::try_from(id).ok())
                .ok_or_else(|| {
                    let shown = match item {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    ServiceError::BadRequest(format!(
                        "Invalid image ID: {}. All IDs must be numbers.",
                        shown
                    ))
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::storage_repository::{MockStorageRepository, StorageError};
    use crate::domain::services::test_support::TestContext;
    use crate::infrastructure::repositories::product_image_repo_impl::ProductImageRepositoryImpl;
    use serde_json::json;

    fn service_with(ctx: &TestContext, storage: MockStorageRepository) -> ImageService {
        ImageService::new(
            ctx.product_repo.clone(),
            Arc::new(ProductImageRepositoryImpl::new(ctx.db.clone())),
            Arc::new(storage),
            "http://cdn.test".to_string(),
        )
    }

    fn png(name: &str) -> UploadedImage {
        UploadedImage {
            file_name: name.to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![0x89, b'P', b'N', b'G'],
        }
    }

    #[test]
    fn test_parse_image_ids() {
        assert_eq!(parse_image_ids(&json!([3, "1", 2])).unwrap(), vec![3, 1, 2]);

        let err = parse_image_ids(&json!([])).unwrap_err();
        assert_eq!(err.to_string(), "imageIds must be a non-empty array");

        let err = parse_image_ids(&json!([1, "abc"])).unwrap_err();
        assert_eq!(err.to_string(), "Invalid image ID: abc. All IDs must be numbers.");
    }

    #[tokio::test]
    async fn test_upload_rejects_non_images() {
        let ctx = TestContext::new().await;
        let product = ctx.product("Aceite", "Balde 20 Litros").await;

        let file = UploadedImage {
            content_type: "application/pdf".to_string(),
            ..png("doc.pdf")
        };
        let err = ctx.images.upload(product.id, file, false).await.unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_upload_orders_images_and_moves_primary() {
        let ctx = TestContext::new().await;
        let product = ctx.product("Aceite", "Balde 20 Litros").await;

        let first = ctx.images.upload(product.id, png("Foto Uno.PNG"), true).await.unwrap();
        assert_eq!(first.image_key, "products/foto_uno.png");
        assert_eq!(first.order, 0);
        assert!(ctx.storage.exists("products/foto_uno.png").await.unwrap());

        let second = ctx.images.upload(product.id, png("dos.png"), true).await.unwrap();
        assert_eq!(second.order, 1);

        let images = ctx.images.list(product.id).await.unwrap();
        assert_eq!(images[0].id, second.id);
        assert!(!images[1].is_primary);

        ctx.images.reorder(product.id, &[second.id, first.id]).await.unwrap();
        ctx.images.set_primary(product.id, first.id).await.unwrap();
        let images = ctx.images.list(product.id).await.unwrap();
        assert_eq!(images[0].id, first.id);
        assert_eq!(images[0].order, 1);
        assert_eq!(images[1].order, 0);
    }

    #[tokio::test]
    async fn test_associate_tries_prefixed_twin() {
        let ctx = TestContext::new().await;
        let product = ctx.product("Aceite", "").await;
        ctx.storage
            .save("products/existing.jpg.webp", b"img", None)
            .await
            .unwrap();

        let image = ctx
            .images
            .associate(product.id, "/existing.jpg.webp", false)
            .await
            .unwrap();
        assert_eq!(image.image_key, "products/existing.webp");

        let err = ctx.images.associate(product.id, "  ", false).await.unwrap_err();
        assert_eq!(err.to_string(), "imageKey is required");

        let err = ctx.images.associate(product.id, "missing.png", false).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Image not found in storage. Tried keys: missing.png, products/missing.png"
        );
    }

    #[tokio::test]
    async fn test_delete_checks_ownership() {
        let ctx = TestContext::new().await;
        let product = ctx.product("Aceite", "").await;
        let other = ctx.product("Grasa", "").await;
        let image = ctx.images.upload(product.id, png("a.png"), false).await.unwrap();

        let err = ctx.images.delete(other.id, image.id).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Image with id: {} not found for product {}", image.id, other.id)
        );

        ctx.images.delete(product.id, image.id).await.unwrap();
        assert!(ctx.images.list(product.id).await.unwrap().is_empty());
        assert!(!ctx.storage.exists("products/a.png").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_ignores_bucket_failures() {
        let ctx = TestContext::new().await;
        let product = ctx.product("Aceite", "").await;

        let mut storage = MockStorageRepository::new();
        storage.expect_save().times(1).returning(|_, _, _| Ok(()));
        storage
            .expect_delete()
            .withf(|key: &str| key == "products/a.png")
            .times(1)
            .returning(|_| Err(StorageError::Other("bucket unavailable".to_string())));
        let images = service_with(&ctx, storage);

        let image = images.upload(product.id, png("a.png"), false).await.unwrap();
        images.delete(product.id, image.id).await.unwrap();

        assert!(images.list(product.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_failure_registers_nothing() {
        let ctx = TestContext::new().await;
        let product = ctx.product("Aceite", "").await;

        let mut storage = MockStorageRepository::new();
        storage
            .expect_save()
            .times(1)
            .returning(|_, _, _| Err(StorageError::Other("quota exceeded".to_string())));
        let images = service_with(&ctx, storage);

        let err = images.upload(product.id, png("a.png"), false).await.unwrap_err();
        assert!(matches!(err, ServiceError::Storage(_)));
        assert!(images.list(product.id).await.unwrap().is_empty());
    }
}
