// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use super::ServiceError;
use crate::domain::models::cart::Cart;
use crate::domain::repositories::cart_repository::CartRepository;
use crate::domain::repositories::product_repository::ProductRepository;
use crate::domain::repositories::user_repository::UserRepository;

/// 购物车服务
///
/// 同一购物车中产品与包装规格相同的条目合并为一行，数量由数据库原子增减
pub struct CartService {
    carts: Arc<dyn CartRepository>,
    products: Arc<dyn ProductRepository>,
    users: Arc<dyn UserRepository>,
}

impl CartService {
    pub fn new(
        carts: Arc<dyn CartRepository>,
        products: Arc<dyn ProductRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            carts,
            products,
            users,
        }
    }

    /// 为条目填充产品详情
    async fn with_products(&self, mut cart: Cart) -> Result<Cart, ServiceError> {
        let mut ids: Vec<i32> = cart.items.iter().map(|i| i.product_id).collect();
        ids.sort_unstable();
        ids.dedup();

        let products = self.products.find_by_ids(&ids).await?;
        for item in &mut cart.items {
            item.product = products.iter().find(|p| p.id == item.product_id).cloned();
        }
        Ok(cart)
    }

    async fn require(&self, cart_id: i32) -> Result<Cart, ServiceError> {
        self.carts
            .find_by_id(cart_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Cart {} not found", cart_id)))
    }

    pub async fn get(&self, cart_id: i32) -> Result<Cart, ServiceError> {
        let cart = self.require(cart_id).await?;
        self.with_products(cart).await
    }

    pub async fn get_by_user(&self, user_id: Uuid) -> Result<Cart, ServiceError> {
        let cart = self
            .carts
            .find_by_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Cart for user {} not found", user_id)))?;
        self.with_products(cart).await
    }

    /// 创建购物车；用户已有购物车时直接返回
    pub async fn create(&self, user_id: Uuid) -> Result<Cart, ServiceError> {
        if self.users.find_by_id(user_id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("User {} not found", user_id)));
        }

        if let Some(existing) = self.carts.find_by_user(user_id).await? {
            debug!("User {} already owns cart {}", user_id, existing.id);
            return self.with_products(existing).await;
        }

        let cart = self.carts.create(user_id).await?;
        info!("Created cart {} for user {}", cart.id, user_id);
        Ok(cart)
    }

    /// 加入商品
    ///
    /// # 参数
    ///
    /// * `cart_id` - 购物车ID
    /// * `product_id` - 产品ID
    /// * `quantity` - 数量，至少为 1
    /// * `presentation` - 包装规格，非空时必须是产品的规格之一（不区分大小写）
    ///
    /// # 返回值
    ///
    /// 更新后的购物车
    pub async fn add_item(
        &self,
        cart_id: i32,
        product_id: i32,
        quantity: i32,
        presentation: Option<&str>,
    ) -> Result<Cart, ServiceError> {
        self.require(cart_id).await?;
        let product = self.products.find_by_id(product_id).await?.ok_or_else(|| {
            ServiceError::NotFound(format!("Product with id: {} not found", product_id))
        })?;
        if quantity < 1 {
            return Err(ServiceError::BadRequest(
                "Quantity must be at least 1".to_string(),
            ));
        }

        let presentation = match presentation.map(str::trim).filter(|p| !p.is_empty()) {
            Some(wanted) => Some(product.match_presentation(wanted).ok_or_else(|| {
                ServiceError::BadRequest(format!(
                    "Invalid presentation \"{}\" for product {}",
                    wanted, product_id
                ))
            })?),
            None => None,
        };

        self.carts
            .add_item(cart_id, product_id, presentation.as_deref(), quantity)
            .await?;
        debug!(
            "Added {} x product {} ({:?}) to cart {}",
            quantity, product_id, presentation, cart_id
        );

        self.get(cart_id).await
    }

    /// 减少商品数量，数量不大于零的条目被移除
    pub async fn delete_item(
        &self,
        cart_id: i32,
        product_id: i32,
        quantity: i32,
        presentation: Option<&str>,
    ) -> Result<Cart, ServiceError> {
        let cart = self.require(cart_id).await?;
        if quantity < 1 {
            return Err(ServiceError::BadRequest(
                "Quantity must be at least 1".to_string(),
            ));
        }

        let wanted = presentation.map(str::trim).filter(|p| !p.is_empty());
        // 规格按不区分大小写的方式对应到已存储的写法
        let stored = match wanted {
            Some(wanted) => cart
                .items
                .iter()
                .filter(|i| i.product_id == product_id)
                .filter_map(|i| i.presentation.as_deref())
                .find(|p| p.to_lowercase() == wanted.to_lowercase())
                .map(str::to_string)
                .or_else(|| Some(wanted.to_string())),
            None => None,
        };

        let updated = self
            .carts
            .decrement_item(cart_id, product_id, stored.as_deref(), quantity)
            .await?;
        if updated == 0 {
            return Err(ServiceError::BadRequest(format!(
                "Cart {} does not contain item {}",
                cart_id, product_id
            )));
        }

        self.get(cart_id).await
    }

    /// 清空购物车
    pub async fn empty(&self, cart_id: i32) -> Result<Cart, ServiceError> {
        self.require(cart_id).await?;
        self.carts.clear(cart_id).await?;
        info!("Emptied cart {}", cart_id);
        self.get(cart_id).await
    }
}
