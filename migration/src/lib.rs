pub use sea_orm_migration::prelude::*;
pub use sea_orm_migration::MigrationStatus;

mod m20240210_000001_create_owners_table;
mod m20240210_000002_create_owner_details_table;
mod m20240211_093512_create_owner_sessions_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240210_000001_create_owners_table::Migration),
            Box::new(m20240210_000002_create_owner_details_table::Migration),
            Box::new(m20240211_093512_create_owner_sessions_table::Migration),
        ]
    }
}
