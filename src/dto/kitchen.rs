use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{ItemStatus, OrderStatus};

/// One dish waiting on the pass.
#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct KitchenItem {
    pub item_id: i64,
    pub order_id: i64,
    pub transaction_id: String,
    pub order_date: String,
    pub order_status: OrderStatus,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub item_status: ItemStatus,
    pub table_id: Option<i64>,
    pub table_name: Option<String>,
    pub floor_name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct KitchenItemList {
    #[schema(value_type = Vec<KitchenItem>)]
    pub items: Vec<KitchenItem>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ItemStatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemStatusChanged {
    pub item_id: i64,
    pub new_item_status: ItemStatus,
    /// Set when the change moved the whole order along.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_status: Option<OrderStatus>,
}
