// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::category::Category;

/// 产品
///
/// `presentation` 保存逗号分隔的包装规格；`category` 为分类名称列表，
/// `categories` 为完整的分类对象
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub sku: String,
    pub description: String,
    pub presentation: String,
    pub aplication: String,
    pub image_url: Option<String>,
    pub whole_saler: Option<String>,
    pub stock: i32,
    pub is_visible: bool,
    pub is_featured: bool,
    #[schema(value_type = String)]
    pub price: Decimal,
    #[serde(default)]
    pub category: Vec<String>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
}

impl Product {
    /// 拆分后的包装规格列表
    pub fn presentations(&self) -> Vec<&str> {
        self.presentation
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect()
    }

    /// 按不区分大小写的方式匹配包装规格，返回产品中的标准写法
    pub fn match_presentation(&self, wanted: &str) -> Option<String> {
        let wanted = wanted.trim().to_lowercase();
        self.presentations()
            .into_iter()
            .find(|p| p.to_lowercase() == wanted)
            .map(str::to_string)
    }

    /// 设置分类，同时刷新名称列表
    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.category = categories.iter().map(|c| c.name.clone()).collect();
        self.categories = categories;
        self
    }
}

/// 产品图片
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub id: i32,
    pub product_id: i32,
    pub image_url: String,
    pub image_key: String,
    pub order: i32,
    pub is_primary: bool,
    pub created_at: DateTime<FixedOffset>,
}

/// 图片排序：主图优先，其次按 `order` 升序
pub fn sort_images(images: &mut [ProductImage]) {
    images.sort_by(|a, b| {
        b.is_primary
            .cmp(&a.is_primary)
            .then(a.order.cmp(&b.order))
            .then(a.id.cmp(&b.id))
    });
}

/// 创建产品请求
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductDto {
    #[validate(length(min = 1, max = 120, message = "name must be between 1 and 120 characters"))]
    pub name: String,
    #[validate(length(max = 120, message = "sku must be at most 120 characters"))]
    pub sku: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    #[validate(length(max = 10000, message = "presentation must be at most 10000 characters"))]
    pub presentation: String,
    #[serde(default)]
    #[validate(length(max = 120, message = "aplication must be at most 120 characters"))]
    pub aplication: String,
    #[validate(length(max = 250, message = "imageUrl must be at most 250 characters"))]
    pub image_url: Option<String>,
    pub whole_saler: Option<String>,
    #[validate(range(min = 0, message = "stock must not be negative"))]
    pub stock: Option<i32>,
    pub is_visible: Option<bool>,
    pub is_featured: Option<bool>,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub category: Vec<String>,
}

/// 更新产品请求，所有字段可选
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductDto {
    #[validate(length(min = 1, max = 120, message = "name must be between 1 and 120 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 120, message = "sku must be at most 120 characters"))]
    pub sku: Option<String>,
    pub description: Option<String>,
    #[validate(length(max = 10000, message = "presentation must be at most 10000 characters"))]
    pub presentation: Option<String>,
    #[validate(length(max = 120, message = "aplication must be at most 120 characters"))]
    pub aplication: Option<String>,
    #[validate(length(max = 250, message = "imageUrl must be at most 250 characters"))]
    pub image_url: Option<String>,
    pub whole_saler: Option<String>,
    #[validate(range(min = 0, message = "stock must not be negative"))]
    pub stock: Option<i32>,
    pub is_visible: Option<bool>,
    pub is_featured: Option<bool>,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    pub category: Option<Vec<String>>,
}

/// 产品过滤条件
///
/// 字符串字段为子串匹配，`category` 为任一名称匹配，其余为精确匹配
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilters {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub sku: Option<String>,
    pub whole_saler: Option<String>,
    pub category: Vec<String>,
    pub stock: Option<i32>,
    pub is_visible: Option<bool>,
    pub is_featured: Option<bool>,
}

/// 待插入的产品
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub slug: String,
    pub sku: String,
    pub description: String,
    pub presentation: String,
    pub aplication: String,
    pub image_url: Option<String>,
    pub whole_saler: Option<String>,
    pub stock: i32,
    pub is_visible: bool,
    pub is_featured: bool,
    pub price: Decimal,
}

/// 产品的部分更新；`category_ids` 为 `Some` 时替换分类集合
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub presentation: Option<String>,
    pub aplication: Option<String>,
    pub image_url: Option<String>,
    pub whole_saler: Option<String>,
    pub stock: Option<i32>,
    pub is_visible: Option<bool>,
    pub is_featured: Option<bool>,
    pub price: Option<Decimal>,
    pub category_ids: Option<Vec<i32>>,
}

/// 待插入的产品图片
#[derive(Debug, Clone)]
pub struct NewProductImage {
    pub product_id: i32,
    pub image_url: String,
    pub image_key: String,
    pub is_primary: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(presentation: &str) -> Product {
        Product {
            id: 1,
            name: "Aceite".to_string(),
            slug: "aceite".to_string(),
            sku: String::new(),
            description: String::new(),
            presentation: presentation.to_string(),
            aplication: String::new(),
            image_url: None,
            whole_saler: None,
            stock: 0,
            is_visible: true,
            is_featured: false,
            price: Decimal::ZERO,
            category: vec![],
            categories: vec![],
            images: vec![],
        }
    }

    #[test]
    fn test_match_presentation_returns_canonical_spelling() {
        let p = product("Balde 20 Litros, Tambor 205 Litros,");
        assert_eq!(p.presentations(), vec!["Balde 20 Litros", "Tambor 205 Litros"]);
        assert_eq!(
            p.match_presentation("  tambor 205 LITROS "),
            Some("Tambor 205 Litros".to_string())
        );
        assert_eq!(p.match_presentation("Bidón 5 Litros"), None);
    }

    #[test]
    fn test_sort_images_primary_first_then_order() {
        let at = Utc::now().fixed_offset();
        let image = |id, order, is_primary| ProductImage {
            id,
            product_id: 1,
            image_url: String::new(),
            image_key: String::new(),
            order,
            is_primary,
            created_at: at,
        };
        let mut images = vec![image(1, 0, false), image(2, 2, true), image(3, 1, false)];
        sort_images(&mut images);

        let ids: Vec<i32> = images.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }
}
