// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use rust_decimal::Decimal;
use sea_orm::SqlErr;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

use super::category_service::CategoryService;
use super::image_service::present_image;
use super::{validation_message, ServiceError};
use crate::domain::models::pagination::PaginatedResponse;
use crate::domain::models::product::{
    CreateProductDto, NewProduct, Product, ProductChanges, ProductFilters, UpdateProductDto,
};
use crate::domain::repositories::product_repository::ProductRepository;
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::metrics::PRICE_UPDATES;
use crate::utils::date::{now_argentina, spanish_long_date};
use crate::utils::price_list::{self, ExportedFile, PriceFormat, PriceListError, PriceRow};
use crate::utils::slug::slugify;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 20;
pub const MAX_LIMIT: u64 = 100;

/// 上传价格表的大小上限（6 MB）
pub const MAX_PRICE_FILE_BYTES: usize = 6 * 1024 * 1024;

fn parse_bool(key: &str, value: &str) -> Result<bool, ServiceError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ServiceError::BadRequest(format!("{} must be a boolean", key))),
    }
}

/// 由查询参数解析过滤条件
///
/// 可重复的 `category` 累加；空值忽略；未知键返回 400
pub fn parse_filters(params: &[(String, String)]) -> Result<ProductFilters, ServiceError> {
    let mut filters = ProductFilters::default();

    for (key, value) in params {
        let value = value.trim();
        match key.as_str() {
            "category" | "category[]" => {
                if !value.is_empty() {
                    filters.category.push(value.to_string());
                }
                continue;
            }
            "name" | "slug" | "sku" | "wholeSaler" | "stock" | "isVisible" | "isFeatured" => {}
            other => {
                return Err(ServiceError::BadRequest(format!(
                    "El nombre de la columna no existe: {}",
                    other
                )))
            }
        }

        if value.is_empty() {
            continue;
        }

        match key.as_str() {
            "name" => filters.name = Some(value.to_string()),
            "slug" => filters.slug = Some(value.to_string()),
            "sku" => filters.sku = Some(value.to_string()),
            "wholeSaler" => filters.whole_saler = Some(value.to_string()),
            "stock" => {
                filters.stock = Some(value.parse().map_err(|_| {
                    ServiceError::BadRequest("stock must be an integer".to_string())
                })?)
            }
            "isVisible" => filters.is_visible = Some(parse_bool(key, value)?),
            "isFeatured" => filters.is_featured = Some(parse_bool(key, value)?),
            _ => {}
        }
    }

    Ok(filters)
}

/// 校验分页参数，缺省时使用默认值
pub fn validate_pagination(page: Option<u64>, limit: Option<u64>) -> Result<(u64, u64), ServiceError> {
    let page = page.unwrap_or(DEFAULT_PAGE);
    let limit = limit.unwrap_or(DEFAULT_LIMIT);
    if page < 1 {
        return Err(ServiceError::BadRequest(
            "page must be greater than or equal to 1".to_string(),
        ));
    }
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(ServiceError::BadRequest(format!(
            "limit must be between 1 and {}",
            MAX_LIMIT
        )));
    }
    Ok((page, limit))
}

fn price_list_error(e: PriceListError) -> ServiceError {
    if e.is_client_error() {
        ServiceError::BadRequest(e.to_string())
    } else {
        ServiceError::Internal(e.to_string())
    }
}

/// 对外返回前清理图片名称
fn present(mut product: Product) -> Product {
    product.images = product.images.into_iter().map(present_image).collect();
    product
}

/// 产品服务
pub struct ProductService {
    products: Arc<dyn ProductRepository>,
    categories: Arc<CategoryService>,
}

impl ProductService {
    pub fn new(products: Arc<dyn ProductRepository>, categories: Arc<CategoryService>) -> Self {
        Self {
            products,
            categories,
        }
    }

    /// 分页查询产品
    ///
    /// # 参数
    ///
    /// * `page` - 页码，缺省为 1
    /// * `limit` - 每页数量，缺省为 20，取值 1..=100
    /// * `filters` - 过滤条件
    pub async fn list_paginated(
        &self,
        page: Option<u64>,
        limit: Option<u64>,
        filters: &ProductFilters,
    ) -> Result<PaginatedResponse<Product>, ServiceError> {
        let (page, limit) = validate_pagination(page, limit)?;
        let (products, total) = self.products.find_paginated(filters, page, limit).await?;
        let products = products.into_iter().map(present).collect();
        Ok(PaginatedResponse::new(products, total, page, limit))
    }

    pub async fn list_filtered(&self, filters: &ProductFilters) -> Result<Vec<Product>, ServiceError> {
        let products = self.products.find_filtered(filters).await?;
        Ok(products.into_iter().map(present).collect())
    }

    pub async fn get(&self, id: i32) -> Result<Product, ServiceError> {
        self.products
            .find_by_id(id)
            .await?
            .map(present)
            .ok_or_else(|| ServiceError::NotFound(format!("Product with id: {} not found", id)))
    }

    async fn require(&self, id: i32) -> Result<Product, ServiceError> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::BadRequest(format!("Product with id: {} not found", id)))
    }

    pub async fn create(&self, dto: CreateProductDto) -> Result<Product, ServiceError> {
        dto.validate()
            .map_err(|e| ServiceError::BadRequest(validation_message(&e)))?;

        let categories = self.categories.find_or_create_by_names(&dto.category).await?;
        let category_ids: Vec<i32> = categories.iter().map(|c| c.id).collect();

        let product = self
            .products
            .create(
                NewProduct {
                    slug: slugify(&dto.name),
                    name: dto.name,
                    sku: dto.sku.unwrap_or_default(),
                    description: dto.description,
                    presentation: dto.presentation,
                    aplication: dto.aplication,
                    image_url: dto.image_url,
                    whole_saler: dto.whole_saler,
                    stock: dto.stock.unwrap_or(0),
                    is_visible: dto.is_visible.unwrap_or(true),
                    is_featured: dto.is_featured.unwrap_or(false),
                    price: dto.price.unwrap_or(Decimal::ZERO),
                },
                &category_ids,
            )
            .await?;

        info!("Created product {} ({})", product.name, product.id);
        Ok(present(product))
    }

    /// 部分更新产品；名称变化时重新生成 slug，提供 `category` 时替换分类集合
    pub async fn edit(&self, id: i32, dto: UpdateProductDto) -> Result<Product, ServiceError> {
        dto.validate()
            .map_err(|e| ServiceError::BadRequest(validation_message(&e)))?;
        let current = self.require(id).await?;

        let category_ids = match &dto.category {
            Some(names) => Some(
                self.categories
                    .find_or_create_by_names(names)
                    .await?
                    .iter()
                    .map(|c| c.id)
                    .collect(),
            ),
            None => None,
        };

        let slug = dto
            .name
            .as_deref()
            .filter(|name| *name != current.name)
            .map(slugify);

        let changes = ProductChanges {
            name: dto.name,
            slug,
            sku: dto.sku,
            description: dto.description,
            presentation: dto.presentation,
            aplication: dto.aplication,
            image_url: dto.image_url,
            whole_saler: dto.whole_saler,
            stock: dto.stock,
            is_visible: dto.is_visible,
            is_featured: dto.is_featured,
            price: dto.price,
            category_ids,
        };

        Ok(present(self.products.update(id, changes).await?))
    }

    /// 删除产品并返回被删除的产品
    pub async fn delete(&self, id: i32) -> Result<Product, ServiceError> {
        let product = self.require(id).await?;
        match self.products.delete(id).await {
            Ok(()) => {}
            Err(RepositoryError::Database(e))
                if matches!(e.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_))) =>
            {
                warn!("Product {} is still referenced: {}", id, e);
                return Err(ServiceError::Conflict(format!(
                    "Product with id: {} cannot be deleted because it is in use",
                    id
                )));
            }
            Err(e) => return Err(e.into()),
        }
        info!("Deleted product {}", id);
        Ok(present(product))
    }

    /// 导出价格表，文件名为 `productos-al-<日期>`
    pub async fn export_prices(&self, format: &str) -> Result<ExportedFile, ServiceError> {
        let format: PriceFormat = format.parse().map_err(price_list_error)?;
        let rows: Vec<PriceRow> = self
            .products
            .price_list()
            .await?
            .into_iter()
            .map(|(id, name, price)| PriceRow { id, name, price })
            .collect();

        let date_label = spanish_long_date(&now_argentina());
        price_list::export(format, &rows, &date_label).map_err(price_list_error)
    }

    /// 导入价格表，只写入与当前价格不同的行，返回更新后的产品
    pub async fn import_prices(&self, file_name: &str, bytes: &[u8]) -> Result<Vec<Product>, ServiceError> {
        if bytes.len() > MAX_PRICE_FILE_BYTES {
            return Err(ServiceError::BadRequest(
                "File exceeds the 6 MB limit".to_string(),
            ));
        }

        let updates = price_list::parse(file_name, bytes).map_err(price_list_error)?;
        let current: HashMap<i32, Decimal> = self
            .products
            .price_list()
            .await?
            .into_iter()
            .map(|(id, _, price)| (id, price))
            .collect();

        let mut changed: Vec<(i32, Decimal)> = Vec::new();
        for update in updates {
            match current.get(&update.id) {
                Some(price) if *price != update.price => {
                    changed.retain(|(id, _)| *id != update.id);
                    changed.push((update.id, update.price));
                }
                Some(_) => {}
                None => warn!("Ignoring price for unknown product {}", update.id),
            }
        }

        if changed.is_empty() {
            return Err(ServiceError::BadRequest("No changes to apply".to_string()));
        }

        self.products.update_prices(&changed).await?;
        metrics::counter!(PRICE_UPDATES).increment(changed.len() as u64);
        info!("Updated prices for {} products", changed.len());

        let ids: Vec<i32> = changed.iter().map(|(id, _)| *id).collect();
        let products = self.products.find_by_ids(&ids).await?;
        Ok(products.into_iter().map(present).collect())
    }
}
