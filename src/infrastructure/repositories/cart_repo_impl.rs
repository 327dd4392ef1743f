// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, OnConflict, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::models::cart::{Cart, CartItem};
use crate::domain::repositories::cart_repository::CartRepository;
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::{cart, cart_item};
use crate::utils::date::now_argentina;

pub struct CartRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl CartRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn with_items(&self, model: cart::Model) -> Result<Cart, RepositoryError> {
        let items = model
            .find_related(cart_item::Entity)
            .order_by_asc(cart_item::Column::Id)
            .all(self.db.as_ref())
            .await?;

        Ok(Cart {
            id: model.id,
            user_id: model.user_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
            items: items
                .into_iter()
                .map(|item| CartItem {
                    id: item.id,
                    product_id: item.product_id,
                    quantity: item.quantity,
                    presentation: Some(item.presentation).filter(|p| !p.is_empty()),
                    product: None,
                })
                .collect(),
        })
    }

    async fn touch(&self, cart_id: i32) -> Result<(), RepositoryError> {
        cart::Entity::update_many()
            .col_expr(cart::Column::UpdatedAt, Expr::value(now_argentina()))
            .filter(cart::Column::Id.eq(cart_id))
            .exec(self.db.as_ref())
            .await?;
        Ok(())
    }
}

/// 条目匹配条件：同一购物车、同一产品、同一包装规格（无规格存为空字符串）
fn item_matches(cart_id: i32, product_id: i32, presentation: Option<&str>) -> Vec<SimpleExpr> {
    vec![
        cart_item::Column::CartId.eq(cart_id),
        cart_item::Column::ProductId.eq(product_id),
        cart_item::Column::Presentation.eq(presentation.unwrap_or_default()),
    ]
}

#[async_trait]
impl CartRepository for CartRepositoryImpl {
    async fn find_by_id(&self, id: i32) -> Result<Option<Cart>, RepositoryError> {
        match cart::Entity::find_by_id(id).one(self.db.as_ref()).await? {
            Some(model) => Ok(Some(self.with_items(model).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Cart>, RepositoryError> {
        let found = cart::Entity::find()
            .filter(cart::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await?;
        match found {
            Some(model) => Ok(Some(self.with_items(model).await?)),
            None => Ok(None),
        }
    }

    async fn create(&self, user_id: Uuid) -> Result<Cart, RepositoryError> {
        let now = now_argentina();
        let model = cart::ActiveModel {
            user_id: Set(user_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;

        Ok(Cart {
            id: model.id,
            user_id: model.user_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
            items: Vec::new(),
        })
    }

    async fn add_item(
        &self,
        cart_id: i32,
        product_id: i32,
        presentation: Option<&str>,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        let line = cart_item::ActiveModel {
            cart_id: Set(cart_id),
            product_id: Set(product_id),
            quantity: Set(quantity),
            presentation: Set(presentation.unwrap_or_default().to_string()),
            ..Default::default()
        };

        // 冲突时在现有数量上累加（idx_cart_items_line）
        let on_conflict = OnConflict::columns([
            cart_item::Column::CartId,
            cart_item::Column::ProductId,
            cart_item::Column::Presentation,
        ])
        .value(
            cart_item::Column::Quantity,
            Expr::col((cart_item::Entity, cart_item::Column::Quantity)).add(quantity),
        )
        .to_owned();

        cart_item::Entity::insert(line)
            .on_conflict(on_conflict)
            .exec_without_returning(self.db.as_ref())
            .await?;

        self.touch(cart_id).await
    }

    async fn decrement_item(
        &self,
        cart_id: i32,
        product_id: i32,
        presentation: Option<&str>,
        quantity: i32,
    ) -> Result<u64, RepositoryError> {
        let mut update = cart_item::Entity::update_many().col_expr(
            cart_item::Column::Quantity,
            Expr::col(cart_item::Column::Quantity).sub(quantity),
        );
        for condition in item_matches(cart_id, product_id, presentation) {
            update = update.filter(condition);
        }
        let result = update.exec(self.db.as_ref()).await?;

        if result.rows_affected > 0 {
            let mut cleanup = cart_item::Entity::delete_many()
                .filter(cart_item::Column::Quantity.lte(0));
            for condition in item_matches(cart_id, product_id, presentation) {
                cleanup = cleanup.filter(condition);
            }
            cleanup.exec(self.db.as_ref()).await?;
            self.touch(cart_id).await?;
        }
        Ok(result.rows_affected)
    }

    async fn clear(&self, cart_id: i32) -> Result<(), RepositoryError> {
        cart_item::Entity::delete_many()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .exec(self.db.as_ref())
            .await?;
        self.touch(cart_id).await
    }
}
