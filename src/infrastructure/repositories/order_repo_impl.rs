// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::models::order::{NewOrder, Order, OrderStatus};
use crate::domain::repositories::order_repository::OrderRepository;
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::order;
use crate::utils::date::now_argentina;

pub struct OrderRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl OrderRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

fn from_json<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, RepositoryError> {
    serde_json::from_value(value).map_err(|e| RepositoryError::Corrupted(e.to_string()))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, RepositoryError> {
    serde_json::to_value(value).map_err(|e| RepositoryError::Corrupted(e.to_string()))
}

fn to_domain(model: order::Model) -> Result<Order, RepositoryError> {
    Ok(Order {
        id: model.id,
        user_id: model.user_id,
        customer_type: model
            .customer_type
            .parse()
            .map_err(RepositoryError::Corrupted)?,
        status: model.status.parse().map_err(RepositoryError::Corrupted)?,
        contact_info: from_json(model.contact_info)?,
        business_info: model.business_info.map(from_json).transpose()?,
        items: from_json(model.items)?,
        total_amount: model.total_amount,
        notes: model.notes,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

fn to_domain_all(models: Vec<order::Model>) -> Result<Vec<Order>, RepositoryError> {
    models.into_iter().map(to_domain).collect()
}

#[async_trait]
impl OrderRepository for OrderRepositoryImpl {
    async fn create(&self, new_order: NewOrder) -> Result<Order, RepositoryError> {
        let now = now_argentina();
        let business_info = match &new_order.business_info {
            Some(info) => Some(to_json(info)?),
            None => None,
        };

        let model = order::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(new_order.user_id),
            customer_type: Set(new_order.customer_type.to_string()),
            status: Set(OrderStatus::default().to_string()),
            contact_info: Set(to_json(&new_order.contact_info)?),
            business_info: Set(business_info),
            items: Set(to_json(&new_order.items)?),
            total_amount: Set(new_order.total_amount),
            notes: Set(new_order.notes),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db.as_ref())
        .await?;

        to_domain(model)
    }

    async fn find_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let models = order::Entity::find()
            .order_by_desc(order::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;
        to_domain_all(models)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, RepositoryError> {
        order::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .map(to_domain)
            .transpose()
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, RepositoryError> {
        let models = order::Entity::find()
            .filter(order::Column::UserId.eq(user_id))
            .order_by_desc(order::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;
        to_domain_all(models)
    }

    async fn find_paginated(
        &self,
        user_id: Option<Uuid>,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<Order>, u64), RepositoryError> {
        let mut select = order::Entity::find();
        if let Some(user_id) = user_id {
            select = select.filter(order::Column::UserId.eq(user_id));
        }

        let paginator = select
            .order_by_desc(order::Column::CreatedAt)
            .paginate(self.db.as_ref(), limit);
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((to_domain_all(models)?, total))
    }

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order, RepositoryError> {
        let model = order::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let mut active = model.into_active_model();
        active.status = Set(status.to_string());
        active.updated_at = Set(now_argentina());

        to_domain(active.update(self.db.as_ref()).await?)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = order::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
