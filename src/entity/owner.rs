use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "owners")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique, column_type = "String(StringLen::N(64))")]
    pub email: String,
    #[sea_orm(unique)]
    pub phone: i64,
    /// SHA-256 hex digest, never the raw password.
    #[serde(skip_serializing)]
    #[sea_orm(column_type = "Char(Some(64))")]
    pub password: String,
    pub created: DateTimeUtc,
    pub updated: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::owner_detail::Entity")]
    OwnerDetail,
    #[sea_orm(has_many = "super::owner_session::Entity")]
    OwnerSession,
}

impl Related<super::owner_detail::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OwnerDetail.def()
    }
}

impl Related<super::owner_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OwnerSession.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
