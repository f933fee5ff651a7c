use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{ItemStatus, Order, OrderItem, OrderStatus, TableStatus};

/// Product reference as sent by the till. Only `id` is trusted; name and
/// price are re-read from the catalog.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductRef {
    pub id: i64,
    pub name: Option<String>,
    pub price: Option<f64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderLineRequest {
    pub product: ProductRef,
    pub quantity: i64,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub items: Vec<OrderLineRequest>,
    pub discount_percentage: Option<f64>,
    pub discount_amount: Option<f64>,
    pub order_date: Option<DateTime<Utc>>,
    pub floor_id: Option<i64>,
    pub table_id: Option<i64>,
    pub cashier_id: Option<i64>,
    pub waiter_id: Option<i64>,
    pub payment_type: Option<String>,
    pub amount_paid: Option<f64>,
    pub change_due: Option<f64>,
    /// `pending` (sent to the kitchen) or `completed` (paid at the till). Defaults to `pending`.
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteOrderRequest {
    pub payment_type: Option<String>,
    pub amount_paid: Option<f64>,
    pub discount_percentage: Option<f64>,
    pub discount_amount: Option<f64>,
    pub change_due: Option<f64>,
    pub cashier_id: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderStatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedOrder {
    pub order_id: i64,
    pub transaction_id: String,
    pub status: OrderStatus,
    pub final_total: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusChange {
    pub order_id: i64,
    pub new_status: OrderStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// A completed order as shown in the transaction history.
#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct TransactionView {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub order: Order,
    pub floor_name: Option<String>,
    pub table_name: Option<String>,
    pub cashier_username: Option<String>,
    pub waiter_username: Option<String>,
    #[sqlx(skip)]
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct TransactionList {
    #[schema(value_type = Vec<TransactionView>)]
    pub items: Vec<TransactionView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SoldProduct {
    pub id: i64,
    pub name: String,
    /// Price at the time of sale.
    pub price: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PendingLine {
    pub product: SoldProduct,
    pub quantity: i64,
    pub item_id: i64,
    pub item_status: ItemStatus,
}

impl From<OrderItem> for PendingLine {
    fn from(item: OrderItem) -> Self {
        PendingLine {
            product: SoldProduct {
                id: item.product_id,
                name: item.product_name,
                price: item.price_at_sale,
            },
            quantity: item.quantity,
            item_id: item.id,
            item_status: item.item_status,
        }
    }
}

/// An order still on the floor, with its table and waiter.
#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct PendingOrderView {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub order: Order,
    pub floor_name: Option<String>,
    pub table_name: Option<String>,
    pub table_current_status: Option<TableStatus>,
    pub waiter_username: Option<String>,
    #[sqlx(skip)]
    pub items: Vec<PendingLine>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct PendingOrderList {
    #[schema(value_type = Vec<PendingOrderView>)]
    pub items: Vec<PendingOrderView>,
}
