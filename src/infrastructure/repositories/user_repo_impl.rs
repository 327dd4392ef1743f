// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, LoaderTrait,
    ModelTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::models::user::{Discount, NewUser, User, UserRole};
use crate::domain::repositories::user_repository::{UserChanges, UserRepository};
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::{discount, user, user_discount};

pub struct UserRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl UserRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn with_discounts(&self, model: user::Model) -> Result<User, RepositoryError> {
        let discounts = model
            .find_related(discount::Entity)
            .all(self.db.as_ref())
            .await?;
        to_domain(model, discounts)
    }
}

fn to_domain(model: user::Model, discounts: Vec<discount::Model>) -> Result<User, RepositoryError> {
    let rol = model
        .rol
        .parse::<UserRole>()
        .map_err(RepositoryError::Corrupted)?;

    Ok(User {
        id: model.id,
        email: model.email,
        nombre: model.nombre,
        apellido: model.apellido,
        direccion: model.direccion,
        telefono: model.telefono,
        password: model.password,
        rol,
        descuentos_aplicados: discounts
            .into_iter()
            .map(|d| Discount {
                id: d.id,
                porcentaje: d.porcentaje,
            })
            .collect(),
    })
}

#[async_trait]
impl UserRepository for UserRepositoryImpl {
    async fn create(&self, new_user: NewUser) -> Result<User, RepositoryError> {
        let model = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(new_user.email),
            nombre: Set(new_user.nombre),
            apellido: Set(new_user.apellido),
            direccion: Set(new_user.direccion),
            telefono: Set(new_user.telefono),
            password: Set(new_user.password_hash),
            rol: Set(new_user.rol.to_string()),
        }
        .insert(self.db.as_ref())
        .await?;

        to_domain(model, Vec::new())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        match user::Entity::find_by_id(id).one(self.db.as_ref()).await? {
            Some(model) => Ok(Some(self.with_discounts(model).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let found = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await?;

        match found {
            Some(model) => Ok(Some(self.with_discounts(model).await?)),
            None => Ok(None),
        }
    }

    async fn find_all(&self) -> Result<Vec<User>, RepositoryError> {
        let users = user::Entity::find()
            .order_by_asc(user::Column::Email)
            .all(self.db.as_ref())
            .await?;
        let discounts = users
            .load_many_to_many(discount::Entity, user_discount::Entity, self.db.as_ref())
            .await?;

        users
            .into_iter()
            .zip(discounts)
            .map(|(model, discounts)| to_domain(model, discounts))
            .collect()
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<User, RepositoryError> {
        let model = user::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let mut active = model.into_active_model();
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(hash) = changes.password_hash {
            active.password = Set(hash);
        }
        if let Some(nombre) = changes.nombre {
            active.nombre = Set(nombre);
        }
        if let Some(apellido) = changes.apellido {
            active.apellido = Set(apellido);
        }
        if let Some(direccion) = changes.direccion {
            active.direccion = Set(Some(direccion));
        }
        if let Some(telefono) = changes.telefono {
            active.telefono = Set(telefono);
        }
        if let Some(rol) = changes.rol {
            active.rol = Set(rol.to_string());
        }

        if active.is_changed() {
            active.update(self.db.as_ref()).await?;
        }

        self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = user::Entity::delete_by_id(id).exec(self.db.as_ref()).await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
