use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Users::Email)
                            .string_len(120)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::Nombre).string_len(120).not_null())
                    .col(ColumnDef::new(Users::Apellido).string_len(120).not_null())
                    .col(ColumnDef::new(Users::Direccion).string_len(255).null())
                    .col(ColumnDef::new(Users::Telefono).string_len(20).not_null())
                    .col(ColumnDef::new(Users::Password).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Users::Rol)
                            .string_len(32)
                            .not_null()
                            .default("CLIENTE_MINORISTA"),
                    )
                    .to_owned(),
            )
            .await?;

        // Create discounts table
        manager
            .create_table(
                Table::create()
                    .table(Discounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Discounts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Discounts::Porcentaje)
                            .decimal_len(5, 2)
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create user_discounts join table
        manager
            .create_table(
                Table::create()
                    .table(UserDiscounts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserDiscounts::UserId).uuid().not_null())
                    .col(ColumnDef::new(UserDiscounts::DiscountId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(UserDiscounts::UserId)
                            .col(UserDiscounts::DiscountId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_discounts_user")
                            .from(UserDiscounts::Table, UserDiscounts::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_discounts_discount")
                            .from(UserDiscounts::Table, UserDiscounts::DiscountId)
                            .to(Discounts::Table, Discounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserDiscounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Discounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Users {
    Table,
    Id,
    Email,
    Nombre,
    Apellido,
    Direccion,
    Telefono,
    Password,
    Rol,
}

#[derive(DeriveIden)]
pub(crate) enum Discounts {
    Table,
    Id,
    Porcentaje,
}

#[derive(DeriveIden)]
enum UserDiscounts {
    Table,
    UserId,
    DiscountId,
}
