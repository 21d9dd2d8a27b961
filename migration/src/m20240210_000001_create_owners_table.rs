use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Owners::Table)
                    .if_not_exists()
                    .col(pk_uuid(Owners::Id))
                    .col(
                        ColumnDef::new(Owners::Email)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Owners::Phone)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(char_len(Owners::Password, 64))
                    .col(
                        timestamp_with_time_zone(Owners::Created)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Owners::Updated)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Owners::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Owners {
    Table,
    Id,
    Email,
    Phone,
    Password,
    Created,
    Updated,
}
