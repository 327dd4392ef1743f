// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "discounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub porcentaje: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_discount::Relation::User.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::user_discount::Relation::Discount.def().rev())
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        super::product_discount::Relation::Product.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::product_discount::Relation::Discount.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
