// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

use super::ServiceError;
use crate::domain::models::category::{Category, CreateCategoryDto, UpdateCategoryDto};
use crate::domain::repositories::category_repository::CategoryRepository;

const MAX_NAME_LEN: usize = 120;

fn clean_name(name: &str) -> Result<String, ServiceError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        return Err(ServiceError::BadRequest(format!(
            "Category name must be between 1 and {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(name.to_string())
}

/// 分类服务
pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>) -> Self {
        Self { categories }
    }

    pub async fn find_all(&self) -> Result<Vec<Category>, ServiceError> {
        Ok(self.categories.find_all().await?)
    }

    pub async fn find_one(&self, id: i32) -> Result<Category, ServiceError> {
        self.categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Category with id {} not found", id)))
    }

    pub async fn create(&self, dto: CreateCategoryDto) -> Result<Category, ServiceError> {
        let name = clean_name(&dto.name)?;
        if self.categories.find_by_name(&name).await?.is_some() {
            return Err(ServiceError::BadRequest(format!(
                "Category with name \"{}\" already exists",
                name
            )));
        }

        let category = self.categories.create(&name).await?;
        info!("Created category {} ({})", category.name, category.id);
        Ok(category)
    }

    pub async fn update(&self, id: i32, dto: UpdateCategoryDto) -> Result<Category, ServiceError> {
        let current = self.find_one(id).await?;
        let Some(raw) = dto.name else {
            return Ok(current);
        };

        let name = clean_name(&raw)?;
        if name == current.name {
            return Ok(current);
        }
        if let Some(existing) = self.categories.find_by_name(&name).await? {
            if existing.id != id {
                return Err(ServiceError::BadRequest(format!(
                    "Category with name \"{}\" already exists",
                    name
                )));
            }
        }

        Ok(self.categories.rename(id, &name).await?)
    }

    /// 删除分类；仍被产品使用时拒绝
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let category = self.find_one(id).await?;
        let in_use = self.categories.count_products(id).await?;
        if in_use > 0 {
            return Err(ServiceError::BadRequest(format!(
                "Cannot delete category \"{}\" because it is being used by {} product(s)",
                category.name, in_use
            )));
        }

        self.categories.delete(id).await?;
        info!("Deleted category {}", category.name);
        Ok(())
    }

    /// 按名称查找分类，缺失的自动创建
    ///
    /// 名称去除首尾空白，丢弃空名称与重复名称，返回顺序与输入一致
    pub async fn find_or_create_by_names(&self, names: &[String]) -> Result<Vec<Category>, ServiceError> {
        let mut seen = HashSet::new();
        let wanted: Vec<String> = names
            .iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty() && seen.insert(n.clone()))
            .collect();
        if wanted.is_empty() {
            return Ok(Vec::new());
        }

        let existing = self.categories.find_by_names(&wanted).await?;
        let mut result = Vec::with_capacity(wanted.len());
        for name in &wanted {
            match existing.iter().find(|c| &c.name == name) {
                Some(category) => result.push(category.clone()),
                None => {
                    let category = self.categories.create(&clean_name(name)?).await?;
                    info!("Created category {} on demand", category.name);
                    result.push(category);
                }
            }
        }
        Ok(result)
    }
}
