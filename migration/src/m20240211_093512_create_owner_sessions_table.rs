use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OwnerSessions::Table)
                    .if_not_exists()
                    .col(pk_uuid(OwnerSessions::SessionId))
                    .col(uuid(OwnerSessions::OwnerId))
                    .col(
                        timestamp_with_time_zone(OwnerSessions::Created)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-owner_sessions-owner_id")
                            .from(OwnerSessions::Table, OwnerSessions::OwnerId)
                            .to(Owners::Table, Owners::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-owner_sessions-owner_id")
                    .table(OwnerSessions::Table)
                    .col(OwnerSessions::OwnerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx-owner_sessions-owner_id")
                    .table(OwnerSessions::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(OwnerSessions::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum OwnerSessions {
    Table,
    SessionId,
    OwnerId,
    Created,
}

#[derive(DeriveIden)]
enum Owners {
    Table,
    Id,
}
