// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;

use crate::domain::models::category::Category;
use crate::domain::repositories::category_repository::CategoryRepository;
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::{category, product_category};
use crate::utils::date::now_argentina;

pub struct CategoryRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl CategoryRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

pub(crate) fn to_domain(model: category::Model) -> Category {
    Category {
        id: model.id,
        name: model.name,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

#[async_trait]
impl CategoryRepository for CategoryRepositoryImpl {
    async fn find_all(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories = category::Entity::find()
            .order_by_asc(category::Column::Name)
            .all(self.db.as_ref())
            .await?;
        Ok(categories.into_iter().map(to_domain).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Category>, RepositoryError> {
        Ok(category::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .map(to_domain))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepositoryError> {
        Ok(category::Entity::find()
            .filter(category::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await?
            .map(to_domain))
    }

    async fn find_by_names(&self, names: &[String]) -> Result<Vec<Category>, RepositoryError> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let categories = category::Entity::find()
            .filter(category::Column::Name.is_in(names.iter().cloned()))
            .all(self.db.as_ref())
            .await?;
        Ok(categories.into_iter().map(to_domain).collect())
    }

    async fn create(&self, name: &str) -> Result<Category, RepositoryError> {
        let now = now_argentina();
        let model = category::ActiveModel {
            name: Set(name.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;
        Ok(to_domain(model))
    }

    async fn rename(&self, id: i32, name: &str) -> Result<Category, RepositoryError> {
        let model = category::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let mut active = model.into_active_model();
        active.name = Set(name.to_string());
        active.updated_at = Set(now_argentina());
        Ok(to_domain(active.update(self.db.as_ref()).await?))
    }

    async fn delete(&self, id: i32) -> Result<(), RepositoryError> {
        let result = category::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn count_products(&self, id: i32) -> Result<u64, RepositoryError> {
        Ok(product_category::Entity::find()
            .filter(product_category::Column::CategoryId.eq(id))
            .count(self.db.as_ref())
            .await?)
    }
}
