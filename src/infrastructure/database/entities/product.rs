// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 产品数据库实体模型
///
/// 对应数据库中的 products 表；`presentation` 为逗号分隔的包装规格列表
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub sku: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub presentation: String,
    pub aplication: String,
    pub image_url: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub whole_saler: Option<String>,
    pub stock: i32,
    pub is_visible: bool,
    pub is_featured: bool,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub price: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::product_image::Entity")]
    Images,
    #[sea_orm(has_many = "super::cart_item::Entity")]
    CartItems,
}

impl Related<super::product_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Images.def()
    }
}

impl Related<super::cart_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItems.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        super::product_category::Relation::Category.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::product_category::Relation::Product.def().rev())
    }
}

impl Related<super::discount::Entity> for Entity {
    fn to() -> RelationDef {
        super::product_discount::Relation::Discount.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::product_discount::Relation::Product.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
