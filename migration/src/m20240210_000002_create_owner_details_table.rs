use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OwnerDetails::Table)
                    .if_not_exists()
                    .col(pk_uuid(OwnerDetails::Id))
                    .col(string(OwnerDetails::Name))
                    .col(timestamp_with_time_zone(OwnerDetails::Dob))
                    .col(string(OwnerDetails::Gender))
                    .col(json(OwnerDetails::Address))
                    .col(
                        timestamp_with_time_zone(OwnerDetails::Created)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(OwnerDetails::Updated)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(OwnerDetails::OwnerId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-owner_details-owner_id")
                            .from(OwnerDetails::Table, OwnerDetails::OwnerId)
                            .to(Owners::Table, Owners::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OwnerDetails::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum OwnerDetails {
    Table,
    Id,
    Name,
    Dob,
    Gender,
    Address,
    Created,
    Updated,
    OwnerId,
}

#[derive(DeriveIden)]
enum Owners {
    Table,
    Id,
}
