// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, JoinType,
    LoaderTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Set,
    TransactionTrait,
};
use std::sync::Arc;

use crate::domain::models::category::Category;
use crate::domain::models::product::{
    sort_images, NewProduct, Product, ProductChanges, ProductFilters,
};
use crate::domain::repositories::product_repository::ProductRepository;
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::{category, product, product_category, product_image};

use super::category_repo_impl;
use super::product_image_repo_impl;

pub struct ProductRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl ProductRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// 根据过滤条件构建查询
    ///
    /// 分类过滤先解析出匹配的产品ID，再以 `IN` 条件限定
    async fn filtered_select(
        &self,
        filters: &ProductFilters,
    ) -> Result<Select<product::Entity>, RepositoryError> {
        let mut select = product::Entity::find();

        if let Some(name) = non_empty(&filters.name) {
            select = select.filter(product::Column::Name.contains(name));
        }
        if let Some(slug) = non_empty(&filters.slug) {
            select = select.filter(product::Column::Slug.contains(slug));
        }
        if let Some(sku) = non_empty(&filters.sku) {
            select = select.filter(product::Column::Sku.contains(sku));
        }
        if let Some(whole_saler) = non_empty(&filters.whole_saler) {
            select = select.filter(product::Column::WholeSaler.contains(whole_saler));
        }
        if let Some(stock) = filters.stock {
            select = select.filter(product::Column::Stock.eq(stock));
        }
        if let Some(is_visible) = filters.is_visible {
            select = select.filter(product::Column::IsVisible.eq(is_visible));
        }
        if let Some(is_featured) = filters.is_featured {
            select = select.filter(product::Column::IsFeatured.eq(is_featured));
        }

        let names: Vec<String> = filters
            .category
            .iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        if !names.is_empty() {
            let ids: Vec<i32> = product_category::Entity::find()
                .select_only()
                .column(product_category::Column::ProductId)
                .join(JoinType::InnerJoin, product_category::Relation::Category.def())
                .filter(category::Column::Name.is_in(names))
                .distinct()
                .into_tuple()
                .all(self.db.as_ref())
                .await?;
            select = select.filter(product::Column::Id.is_in(ids));
        }

        Ok(select.order_by_asc(product::Column::Id))
    }

    /// 为产品加载分类与图片
    async fn hydrate(&self, models: Vec<product::Model>) -> Result<Vec<Product>, RepositoryError> {
        let db = self.db.as_ref();
        let categories = models
            .load_many_to_many(category::Entity, product_category::Entity, db)
            .await?;
        let images = models.load_many(product_image::Entity, db).await?;

        Ok(models
            .into_iter()
            .zip(categories)
            .zip(images)
            .map(|((model, categories), images)| {
                let mut categories: Vec<Category> = categories
                    .into_iter()
                    .map(category_repo_impl::to_domain)
                    .collect();
                categories.sort_by(|a, b| a.name.cmp(&b.name));

                let mut images: Vec<_> = images
                    .into_iter()
                    .map(product_image_repo_impl::to_domain)
                    .collect();
                sort_images(&mut images);

                let mut product = to_domain(model).with_categories(categories);
                product.images = images;
                product
            })
            .collect())
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn to_domain(model: product::Model) -> Product {
    Product {
        id: model.id,
        name: model.name,
        slug: model.slug,
        sku: model.sku,
        description: model.description,
        presentation: model.presentation,
        aplication: model.aplication,
        image_url: model.image_url,
        whole_saler: model.whole_saler,
        stock: model.stock,
        is_visible: model.is_visible,
        is_featured: model.is_featured,
        price: model.price,
        category: Vec::new(),
        categories: Vec::new(),
        images: Vec::new(),
    }
}

fn category_links(product_id: i32, category_ids: &[i32]) -> Vec<product_category::ActiveModel> {
    category_ids
        .iter()
        .map(|category_id| product_category::ActiveModel {
            product_id: Set(product_id),
            category_id: Set(*category_id),
        })
        .collect()
}

#[async_trait]
impl ProductRepository for ProductRepositoryImpl {
    async fn find_paginated(
        &self,
        filters: &ProductFilters,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<Product>, u64), RepositoryError> {
        let paginator = self
            .filtered_select(filters)
            .await?
            .paginate(self.db.as_ref(), limit);
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((self.hydrate(models).await?, total))
    }

    async fn find_filtered(&self, filters: &ProductFilters) -> Result<Vec<Product>, RepositoryError> {
        let models = self
            .filtered_select(filters)
            .await?
            .all(self.db.as_ref())
            .await?;
        self.hydrate(models).await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Product>, RepositoryError> {
        let Some(model) = product::Entity::find_by_id(id).one(self.db.as_ref()).await? else {
            return Ok(None);
        };
        Ok(self.hydrate(vec![model]).await?.pop())
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Product>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = product::Entity::find()
            .filter(product::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(product::Column::Id)
            .all(self.db.as_ref())
            .await?;
        self.hydrate(models).await
    }

    async fn create(&self, new_product: NewProduct, category_ids: &[i32]) -> Result<Product, RepositoryError> {
        let txn = self.db.begin().await?;

        let model = product::ActiveModel {
            name: Set(new_product.name),
            slug: Set(new_product.slug),
            sku: Set(new_product.sku),
            description: Set(new_product.description),
            presentation: Set(new_product.presentation),
            aplication: Set(new_product.aplication),
            image_url: Set(new_product.image_url),
            whole_saler: Set(new_product.whole_saler),
            stock: Set(new_product.stock),
            is_visible: Set(new_product.is_visible),
            is_featured: Set(new_product.is_featured),
            price: Set(new_product.price),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let links = category_links(model.id, category_ids);
        if !links.is_empty() {
            product_category::Entity::insert_many(links)
                .exec_without_returning(&txn)
                .await?;
        }

        txn.commit().await?;

        self.find_by_id(model.id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn update(&self, id: i32, changes: ProductChanges) -> Result<Product, RepositoryError> {
        let txn = self.db.begin().await?;

        let model = product::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let mut active = model.into_active_model();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(slug) = changes.slug {
            active.slug = Set(slug);
        }
        if let Some(sku) = changes.sku {
            active.sku = Set(sku);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        if let Some(presentation) = changes.presentation {
            active.presentation = Set(presentation);
        }
        if let Some(aplication) = changes.aplication {
            active.aplication = Set(aplication);
        }
        if let Some(image_url) = changes.image_url {
            active.image_url = Set(Some(image_url));
        }
        if let Some(whole_saler) = changes.whole_saler {
            active.whole_saler = Set(Some(whole_saler));
        }
        if let Some(stock) = changes.stock {
            active.stock = Set(stock);
        }
        if let Some(is_visible) = changes.is_visible {
            active.is_visible = Set(is_visible);
        }
        if let Some(is_featured) = changes.is_featured {
            active.is_featured = Set(is_featured);
        }
        if let Some(price) = changes.price {
            active.price = Set(price);
        }

        if active.is_changed() {
            active.update(&txn).await?;
        }

        if let Some(category_ids) = changes.category_ids {
            product_category::Entity::delete_many()
                .filter(product_category::Column::ProductId.eq(id))
                .exec(&txn)
                .await?;

            let links = category_links(id, &category_ids);
            if !links.is_empty() {
                product_category::Entity::insert_many(links)
                    .exec_without_returning(&txn)
                    .await?;
            }
        }

        txn.commit().await?;

        self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn delete(&self, id: i32) -> Result<(), RepositoryError> {
        let result = product::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn price_list(&self) -> Result<Vec<(i32, String, Decimal)>, RepositoryError> {
        Ok(product::Entity::find()
            .select_only()
            .column(product::Column::Id)
            .column(product::Column::Name)
            .column(product::Column::Price)
            .order_by_asc(product::Column::Id)
            .into_tuple()
            .all(self.db.as_ref())
            .await?)
    }

    async fn update_prices(&self, prices: &[(i32, Decimal)]) -> Result<(), RepositoryError> {
        let txn = self.db.begin().await?;
        for (id, price) in prices {
            product::Entity::update_many()
                .col_expr(product::Column::Price, Expr::value(*price))
                .filter(product::Column::Id.eq(*id))
                .exec(&txn)
                .await?;
        }
        txn.commit().await?;
        Ok(())
    }
}
