use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::{
        non_blank,
        orders::{
            CompleteOrderRequest, CreateOrderRequest, CreatedOrder, OrderStatusRequest,
            OrderWithItems, PendingLine, PendingOrderList, PendingOrderView,
            StatusChange, TransactionList, TransactionView,
        },
    },
    entity::{
        dining_tables::{Column as TableCol, Entity as DiningTables},
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_cashier, ensure_order_taker},
    models::{ItemStatus, Order, OrderItem, OrderStatus, Role, TableStatus},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

const ORDER_VIEW_JOINS: &str = r#"
    FROM orders o
    LEFT JOIN floors f ON o.floor_id = f.id
    LEFT JOIN tables t ON o.table_id = t.id
"#;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Totals {
    pub initial_total: f64,
    pub discount_percentage: f64,
    pub discount_amount: f64,
    pub final_total: f64,
}

pub(crate) fn round_money(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// An explicit discount amount wins over the percentage; either way the
/// discount never exceeds the order total.
pub(crate) fn compute_totals(
    initial_total: f64,
    discount_percentage: Option<f64>,
    discount_amount: Option<f64>,
) -> AppResult<Totals> {
    let percentage = discount_percentage.unwrap_or(0.0);
    if !(0.0..=100.0).contains(&percentage) {
        return Err(AppError::BadRequest(
            "Discount percentage must be between 0 and 100.".into(),
        ));
    }
    if discount_amount.is_some_and(|amount| !(amount >= 0.0)) {
        return Err(AppError::BadRequest(
            "Discount amount cannot be negative.".into(),
        ));
    }

    let initial_total = round_money(initial_total);
    let discount = discount_amount
        .unwrap_or(initial_total * percentage / 100.0)
        .clamp(0.0, initial_total);
    let discount = round_money(discount);

    Ok(Totals {
        initial_total,
        discount_percentage: percentage,
        discount_amount: discount,
        final_total: round_money(initial_total - discount),
    })
}

pub(crate) fn change_due(
    amount_paid: Option<f64>,
    change_due: Option<f64>,
    final_total: f64,
) -> AppResult<Option<f64>> {
    if amount_paid.is_some_and(|paid| !(paid >= 0.0)) {
        return Err(AppError::BadRequest("Amount paid cannot be negative.".into()));
    }
    Ok(change_due.or_else(|| amount_paid.map(|paid| round_money((paid - final_total).max(0.0)))))
}

pub(crate) fn new_transaction_id(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("ORD-{}-{}", now.timestamp_millis(), &suffix[..8])
}

pub(crate) fn format_order_date(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<CreatedOrder>> {
    ensure_order_taker(user)?;

    let status = match non_blank(payload.status) {
        Some(raw) => parse_order_status(&raw)?,
        None => OrderStatus::Pending,
    };
    if !matches!(status, OrderStatus::Pending | OrderStatus::Completed) {
        return Err(AppError::BadRequest(
            "New orders must have status pending or completed.".into(),
        ));
    }
    if payload.items.is_empty() {
        return Err(AppError::BadRequest(
            "Order must contain at least one item.".into(),
        ));
    }
    if let Some(line) = payload.items.iter().find(|line| line.quantity <= 0) {
        return Err(AppError::BadRequest(format!(
            "Quantity for product {} must be greater than zero.",
            line.product.id
        )));
    }

    let now = Utc::now();
    let txn = state.orm.begin().await?;

    let mut lines = Vec::with_capacity(payload.items.len());
    let mut initial_total = 0.0;
    for line in &payload.items {
        let product = Products::find_by_id(line.product.id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                AppError::BadRequest(format!("Product with ID {} not found.", line.product.id))
            })?;

        let insufficient = || {
            AppError::BadRequest(format!(
                "Insufficient stock for {}. Available: {}, Requested: {}.",
                product.name, product.stock_quantity, line.quantity
            ))
        };
        if product.stock_quantity < line.quantity {
            return Err(insufficient());
        }

        let updated = Products::update_many()
            .col_expr(
                ProdCol::StockQuantity,
                Expr::col(ProdCol::StockQuantity).sub(line.quantity),
            )
            .filter(ProdCol::Id.eq(product.id))
            .filter(ProdCol::StockQuantity.gte(line.quantity))
            .exec(&txn)
            .await?;
        if updated.rows_affected == 0 {
            return Err(insufficient());
        }

        initial_total += product.price * line.quantity as f64;
        lines.push((product, line.quantity));
    }

    let mut floor_id = payload.floor_id;
    if let Some(table_id) = payload.table_id {
        let table = DiningTables::find_by_id(table_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::BadRequest(format!("Table with ID {table_id} not found.")))?;
        floor_id = floor_id.or(Some(table.floor_id));
    }

    let totals = compute_totals(
        initial_total,
        payload.discount_percentage,
        payload.discount_amount,
    )?;
    let change = change_due(payload.amount_paid, payload.change_due, totals.final_total)?;
    let waiter_id = payload
        .waiter_id
        .or((user.role == Role::Waiter).then_some(user.user_id));

    let order = OrderActive {
        id: NotSet,
        transaction_id: Set(new_transaction_id(now)),
        initial_total: Set(totals.initial_total),
        discount_percentage: Set(Some(totals.discount_percentage)),
        discount_amount: Set(Some(totals.discount_amount)),
        final_total: Set(totals.final_total),
        order_date: Set(format_order_date(payload.order_date.unwrap_or(now))),
        floor_id: Set(floor_id),
        table_id: Set(payload.table_id),
        cashier_id: Set(payload.cashier_id),
        waiter_id: Set(waiter_id),
        payment_type: Set(non_blank(payload.payment_type)),
        amount_paid: Set(payload.amount_paid),
        change_due: Set(change),
        status: Set(status),
    }
    .insert(&txn)
    .await?;

    let items = lines.into_iter().map(|(product, quantity)| OrderItemActive {
        id: NotSet,
        order_id: Set(order.id),
        product_id: Set(product.id),
        product_name: Set(product.name),
        quantity: Set(quantity),
        price_at_sale: Set(product.price),
        item_status: Set(ItemStatus::Pending),
    });
    OrderItems::insert_many(items).exec(&txn).await?;

    if let Some(table_id) = order.table_id {
        if status == OrderStatus::Pending {
            set_table_status(&txn, table_id, TableStatus::Occupied).await?;
        } else {
            release_table_if_idle(&txn, table_id).await?;
        }
    }

    txn.commit().await?;

    tracing::info!(
        order_id = order.id,
        transaction_id = %order.transaction_id,
        status = %status,
        "order placed"
    );
    audit::record(
        &state.pool,
        Some(user.user_id),
        "order_create",
        "orders",
        serde_json::json!({ "order_id": order.id, "transaction_id": order.transaction_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order processed successfully!",
        CreatedOrder {
            order_id: order.id,
            transaction_id: order.transaction_id,
            status,
            final_total: order.final_total,
        },
        Some(Meta::empty()),
    ))
}

pub async fn get_order(
    state: &AppState,
    _user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .order_by_asc(OrderItemCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Order",
        OrderWithItems {
            order: order_from_entity(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

/// Completed orders, newest first.
pub async fn list_transactions(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<TransactionList>> {
    ensure_cashier(user)?;
    let (page, per_page, offset) = pagination.normalize();

    let total = Orders::find()
        .filter(OrderCol::Status.eq(OrderStatus::Completed))
        .count(&state.orm)
        .await? as i64;

    let mut rows = sqlx::query_as::<_, TransactionView>(&format!(
        r#"
        SELECT o.*, f.name AS floor_name, t.name AS table_name,
               c.username AS cashier_username, w.username AS waiter_username
        {ORDER_VIEW_JOINS}
        LEFT JOIN users c ON o.cashier_id = c.id
        LEFT JOIN users w ON o.waiter_id = w.id
        WHERE o.status = 'completed'
        ORDER BY o.order_date DESC, o.id DESC
        LIMIT ? OFFSET ?
        "#
    ))
    .bind(per_page)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let ids = rows.iter().map(|row| row.order.id).collect();
    let mut items = items_by_order(&state.orm, ids).await?;
    for row in &mut rows {
        row.items = items.remove(&row.order.id).unwrap_or_default();
    }

    Ok(ApiResponse::success(
        "Transactions",
        TransactionList { items: rows },
        Some(Meta::new(page, per_page, total)),
    ))
}

/// Orders still being served, oldest first.
pub async fn list_pending_orders(
    state: &AppState,
    _user: &AuthUser,
) -> AppResult<ApiResponse<PendingOrderList>> {
    let mut rows = sqlx::query_as::<_, PendingOrderView>(&format!(
        r#"
        SELECT o.*, f.name AS floor_name, t.name AS table_name,
               t.status AS table_current_status, w.username AS waiter_username
        {ORDER_VIEW_JOINS}
        LEFT JOIN users w ON o.waiter_id = w.id
        WHERE o.status IN ('pending', 'prepared', 'served')
        ORDER BY o.order_date ASC, o.id ASC
        "#
    ))
    .fetch_all(&state.pool)
    .await?;

    let ids = rows.iter().map(|row| row.order.id).collect();
    let mut items = items_by_order(&state.orm, ids).await?;
    for row in &mut rows {
        row.items = items
            .remove(&row.order.id)
            .unwrap_or_default()
            .into_iter()
            .map(PendingLine::from)
            .collect();
    }

    Ok(ApiResponse::success(
        "Pending orders",
        PendingOrderList { items: rows },
        Some(Meta::empty()),
    ))
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: OrderStatusRequest,
) -> AppResult<ApiResponse<StatusChange>> {
    let raw = non_blank(payload.status)
        .ok_or_else(|| AppError::BadRequest("New status is required.".into()))?;
    let status = parse_order_status(&raw)?;
    // Closing an order settles or voids it; floor and kitchen staff only move it along.
    if status.is_terminal() {
        ensure_cashier(user)?;
    }

    let txn = state.orm.begin().await?;
    let order = Orders::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;
    if order.status.is_terminal() {
        return Err(AppError::Conflict(format!(
            "Order {id} is already {} and can no longer change status.",
            order.status
        )));
    }

    if status == OrderStatus::Cancelled {
        restore_stock(&txn, order.id).await?;
    }

    let table_id = order.table_id;
    let mut active: OrderActive = order.into();
    active.status = Set(status);
    active.update(&txn).await?;

    if let Some(table_id) = table_id.filter(|_| status.is_terminal()) {
        release_table_if_idle(&txn, table_id).await?;
    }

    txn.commit().await?;

    tracing::info!(order_id = id, status = %status, "order status changed");
    audit::record(
        &state.pool,
        Some(user.user_id),
        "order_status",
        "orders",
        serde_json::json!({ "order_id": id, "status": status }),
    )
    .await;

    Ok(ApiResponse::success(
        format!("Order {id} status updated to {status}."),
        StatusChange {
            order_id: id,
            new_status: status,
        },
        Some(Meta::empty()),
    ))
}

/// Takes payment for an active order and frees its table.
pub async fn complete_order(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: CompleteOrderRequest,
) -> AppResult<ApiResponse<StatusChange>> {
    ensure_cashier(user)?;

    let txn = state.orm.begin().await?;
    let order = Orders::find_by_id(id)
        .filter(OrderCol::Status.is_in(OrderStatus::ACTIVE))
        .one(&txn)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("Active order not found or already completed/cancelled.".into())
        })?;

    let totals = if payload.discount_percentage.is_some() || payload.discount_amount.is_some() {
        compute_totals(
            order.initial_total,
            payload.discount_percentage,
            payload.discount_amount,
        )?
    } else {
        Totals {
            initial_total: order.initial_total,
            discount_percentage: order.discount_percentage.unwrap_or(0.0),
            discount_amount: order.discount_amount.unwrap_or(0.0),
            final_total: order.final_total,
        }
    };
    let change = change_due(payload.amount_paid, payload.change_due, totals.final_total)?;

    let table_id = order.table_id;
    let cashier_id = payload.cashier_id.or(Some(user.user_id));
    let mut active: OrderActive = order.into();
    active.discount_percentage = Set(Some(totals.discount_percentage));
    active.discount_amount = Set(Some(totals.discount_amount));
    active.final_total = Set(totals.final_total);
    active.payment_type = Set(non_blank(payload.payment_type));
    active.amount_paid = Set(payload.amount_paid);
    active.change_due = Set(change);
    active.cashier_id = Set(cashier_id);
    active.status = Set(OrderStatus::Completed);
    active.update(&txn).await?;

    if let Some(table_id) = table_id {
        release_table_if_idle(&txn, table_id).await?;
    }

    txn.commit().await?;

    tracing::info!(order_id = id, final_total = totals.final_total, "order completed");
    audit::record(
        &state.pool,
        Some(user.user_id),
        "order_complete",
        "orders",
        serde_json::json!({ "order_id": id, "final_total": totals.final_total }),
    )
    .await;

    Ok(ApiResponse::success(
        format!("Order {id} completed successfully."),
        StatusChange {
            order_id: id,
            new_status: OrderStatus::Completed,
        },
        Some(Meta::empty()),
    ))
}

async fn restore_stock<C: ConnectionTrait>(conn: &C, order_id: i64) -> AppResult<()> {
    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order_id))
        .all(conn)
        .await?;
    for item in items {
        Products::update_many()
            .col_expr(
                ProdCol::StockQuantity,
                Expr::col(ProdCol::StockQuantity).add(item.quantity),
            )
            .filter(ProdCol::Id.eq(item.product_id))
            .exec(conn)
            .await?;
    }
    Ok(())
}

async fn set_table_status<C: ConnectionTrait>(
    conn: &C,
    table_id: i64,
    status: TableStatus,
) -> AppResult<()> {
    DiningTables::update_many()
        .col_expr(TableCol::Status, Expr::value(status))
        .filter(TableCol::Id.eq(table_id))
        .exec(conn)
        .await?;
    Ok(())
}

/// A table goes back to `available` only once no active order remains on it.
pub(crate) async fn release_table_if_idle<C: ConnectionTrait>(
    conn: &C,
    table_id: i64,
) -> AppResult<()> {
    let active = Orders::find()
        .filter(OrderCol::TableId.eq(table_id))
        .filter(OrderCol::Status.is_in(OrderStatus::ACTIVE))
        .count(conn)
        .await?;
    if active == 0 {
        set_table_status(conn, table_id, TableStatus::Available).await?;
    }
    Ok(())
}

async fn items_by_order<C: ConnectionTrait>(
    conn: &C,
    order_ids: Vec<i64>,
) -> AppResult<HashMap<i64, Vec<OrderItem>>> {
    let mut grouped: HashMap<i64, Vec<OrderItem>> = HashMap::new();
    if order_ids.is_empty() {
        return Ok(grouped);
    }

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(order_ids))
        .order_by_asc(OrderItemCol::Id)
        .all(conn)
        .await?;
    for item in items {
        grouped
            .entry(item.order_id)
            .or_default()
            .push(order_item_from_entity(item));
    }
    Ok(grouped)
}

fn parse_order_status(raw: &str) -> AppResult<OrderStatus> {
    raw.parse::<OrderStatus>().map_err(AppError::BadRequest)
}

fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        transaction_id: model.transaction_id,
        initial_total: model.initial_total,
        discount_percentage: model.discount_percentage,
        discount_amount: model.discount_amount,
        final_total: model.final_total,
        order_date: model.order_date,
        floor_id: model.floor_id,
        table_id: model.table_id,
        cashier_id: model.cashier_id,
        waiter_id: model.waiter_id,
        payment_type: model.payment_type,
        amount_paid: model.amount_paid,
        change_due: model.change_due,
        status: model.status,
    }
}

pub(crate) fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        product_name: model.product_name,
        quantity: model.quantity,
        price_at_sale: model.price_at_sale,
        item_status: model.item_status,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn percentage_discount_applies_to_initial_total() {
        let totals = compute_totals(40.0, Some(10.0), None).unwrap();
        assert_eq!(totals.discount_amount, 4.0);
        assert_eq!(totals.final_total, 36.0);
        assert_eq!(totals.discount_percentage, 10.0);
    }

    #[test]
    fn explicit_amount_wins_and_is_clamped() {
        let totals = compute_totals(12.5, Some(50.0), Some(2.5)).unwrap();
        assert_eq!(totals.discount_amount, 2.5);
        assert_eq!(totals.final_total, 10.0);

        let totals = compute_totals(12.5, None, Some(99.0)).unwrap();
        assert_eq!(totals.discount_amount, 12.5);
        assert_eq!(totals.final_total, 0.0);
    }

    #[test]
    fn invalid_discounts_are_rejected() {
        assert!(compute_totals(10.0, Some(120.0), None).is_err());
        assert!(compute_totals(10.0, Some(-1.0), None).is_err());
        assert!(compute_totals(10.0, None, Some(-0.5)).is_err());
    }

    #[test]
    fn change_is_derived_from_amount_paid() {
        assert_eq!(change_due(Some(20.0), None, 13.75).unwrap(), Some(6.25));
        assert_eq!(change_due(Some(5.0), None, 13.75).unwrap(), Some(0.0));
        assert_eq!(change_due(Some(20.0), Some(1.0), 13.75).unwrap(), Some(1.0));
        assert_eq!(change_due(None, None, 13.75).unwrap(), None);
        assert!(change_due(Some(-1.0), None, 1.0).is_err());
    }

    #[test]
    fn transaction_id_carries_millis_and_short_suffix() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let id = new_transaction_id(at);
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ORD");
        assert_eq!(parts[1], at.timestamp_millis().to_string());
        assert_eq!(parts[2].len(), 8);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn order_dates_sort_lexically() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 5, 7).unwrap();
        assert_eq!(format_order_date(at), "2025-03-01T09:05:07.000Z");
    }
}
