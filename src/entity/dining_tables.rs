use sea_orm::entity::prelude::*;

use crate::models::TableStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tables")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub floor_id: i64,
    #[sea_orm(unique)]
    pub name: String,
    pub status: TableStatus,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::floors::Entity",
        from = "Column::FloorId",
        to = "super::floors::Column::Id",
        on_delete = "Cascade"
    )]
    Floors,
    #[sea_orm(has_many = "super::orders::Entity")]
    Orders,
}

impl Related<super::floors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Floors.def()
    }
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
