// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use std::sync::Arc;

use crate::domain::models::product::{sort_images, NewProductImage, ProductImage};
use crate::domain::repositories::product_image_repository::ProductImageRepository;
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::product_image;
use crate::utils::date::now_argentina;

pub struct ProductImageRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl ProductImageRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

pub(crate) fn to_domain(model: product_image::Model) -> ProductImage {
    ProductImage {
        id: model.id,
        product_id: model.product_id,
        image_url: model.image_url,
        image_key: model.image_key,
        order: model.order,
        is_primary: model.is_primary,
        created_at: model.created_at,
    }
}

#[async_trait]
impl ProductImageRepository for ProductImageRepositoryImpl {
    async fn find_by_product(&self, product_id: i32) -> Result<Vec<ProductImage>, RepositoryError> {
        let mut images: Vec<ProductImage> = product_image::Entity::find()
            .filter(product_image::Column::ProductId.eq(product_id))
            .order_by_asc(product_image::Column::Order)
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(to_domain)
            .collect();
        sort_images(&mut images);
        Ok(images)
    }

    async fn find_one(&self, product_id: i32, image_id: i32) -> Result<Option<ProductImage>, RepositoryError> {
        Ok(product_image::Entity::find_by_id(image_id)
            .filter(product_image::Column::ProductId.eq(product_id))
            .one(self.db.as_ref())
            .await?
            .map(to_domain))
    }

    async fn add(&self, image: NewProductImage) -> Result<ProductImage, RepositoryError> {
        let txn = self.db.begin().await?;

        let last = product_image::Entity::find()
            .filter(product_image::Column::ProductId.eq(image.product_id))
            .order_by_desc(product_image::Column::Order)
            .one(&txn)
            .await?;
        let order = last.map(|m| m.order + 1).unwrap_or(0);

        if image.is_primary {
            product_image::Entity::update_many()
                .col_expr(product_image::Column::IsPrimary, Expr::value(false))
                .filter(product_image::Column::ProductId.eq(image.product_id))
                .exec(&txn)
                .await?;
        }

        let model = product_image::ActiveModel {
            product_id: Set(image.product_id),
            image_url: Set(image.image_url),
            image_key: Set(image.image_key),
            order: Set(order),
            is_primary: Set(image.is_primary),
            created_at: Set(now_argentina()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(to_domain(model))
    }

    async fn delete(&self, image_id: i32) -> Result<(), RepositoryError> {
        let result = product_image::Entity::delete_by_id(image_id)
            .exec(self.db.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn set_primary(&self, product_id: i32, image_id: i32) -> Result<ProductImage, RepositoryError> {
        let txn = self.db.begin().await?;

        product_image::Entity::update_many()
            .col_expr(product_image::Column::IsPrimary, Expr::value(false))
            .filter(product_image::Column::ProductId.eq(product_id))
            .exec(&txn)
            .await?;

        let updated = product_image::Entity::update_many()
            .col_expr(product_image::Column::IsPrimary, Expr::value(true))
            .filter(product_image::Column::Id.eq(image_id))
            .filter(product_image::Column::ProductId.eq(product_id))
            .exec(&txn)
            .await?;
        if updated.rows_affected == 0 {
            txn.rollback().await?;
            return Err(RepositoryError::NotFound);
        }

        let model = product_image::Entity::find_by_id(image_id)
            .one(&txn)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        txn.commit().await?;
        Ok(to_domain(model))
    }

    async fn reorder(&self, product_id: i32, image_ids: &[i32]) -> Result<(), RepositoryError> {
        let txn = self.db.begin().await?;
        for (index, image_id) in image_ids.iter().enumerate() {
            product_image::Entity::update_many()
                .col_expr(product_image::Column::Order, Expr::value(index as i32))
                .filter(product_image::Column::Id.eq(*image_id))
                .filter(product_image::Column::ProductId.eq(product_id))
                .exec(&txn)
                .await?;
        }
        txn.commit().await?;
        Ok(())
    }
}
