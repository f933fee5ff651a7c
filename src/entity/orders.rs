use sea_orm::entity::prelude::*;

use crate::models::OrderStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub transaction_id: String,
    pub initial_total: f64,
    pub discount_percentage: Option<f64>,
    pub discount_amount: Option<f64>,
    pub final_total: f64,
    pub order_date: String,
    pub floor_id: Option<i64>,
    pub table_id: Option<i64>,
    pub cashier_id: Option<i64>,
    pub waiter_id: Option<i64>,
    pub payment_type: Option<String>,
    pub amount_paid: Option<f64>,
    pub change_due: Option<f64>,
    pub status: OrderStatus,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::dining_tables::Entity",
        from = "Column::TableId",
        to = "super::dining_tables::Column::Id"
    )]
    DiningTables,
    #[sea_orm(has_many = "super::order_items::Entity")]
    OrderItems,
}

impl Related<super::dining_tables::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DiningTables.def()
    }
}

impl Related<super::order_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
