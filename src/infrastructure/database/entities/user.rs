// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 用户数据库实体模型
///
/// 对应数据库中的 users 表；`rol` 以字符串保存，由领域层解析
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub nombre: String,
    pub apellido: String,
    pub direccion: Option<String>,
    pub telefono: String,
    pub password: String,
    pub rol: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::cart::Entity")]
    Cart,
}

impl Related<super::cart::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cart.def()
    }
}

impl Related<super::discount::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_discount::Relation::Discount.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::user_discount::Relation::User.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
