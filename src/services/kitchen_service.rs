use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
    TransactionTrait,
};

use crate::{
    audit,
    dto::{
        kitchen::{ItemStatusChanged, ItemStatusRequest, KitchenItem, KitchenItemList},
        non_blank,
    },
    entity::{
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Entity as Orders},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{ItemStatus, OrderStatus},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Items still to be cooked for orders the kitchen is working on.
pub async fn list_pending_items(
    state: &AppState,
    _user: &AuthUser,
) -> AppResult<ApiResponse<KitchenItemList>> {
    let items = sqlx::query_as::<_, KitchenItem>(
        r#"
        SELECT oi.id AS item_id, oi.order_id, o.transaction_id, o.order_date,
               o.status AS order_status, oi.product_id, oi.product_name, oi.quantity,
               oi.item_status, o.table_id, t.name AS table_name, f.name AS floor_name
        FROM order_items oi
        JOIN orders o ON oi.order_id = o.id
        LEFT JOIN floors f ON o.floor_id = f.id
        LEFT JOIN tables t ON o.table_id = t.id
        WHERE o.status IN ('pending', 'prepared') AND oi.item_status != 'ready'
        ORDER BY o.order_date ASC, o.table_id ASC, oi.id ASC
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Kitchen items",
        KitchenItemList { items },
        Some(Meta::empty()),
    ))
}

/// Once the last item of a pending order is ready the order itself becomes `prepared`.
pub async fn update_item_status(
    state: &AppState,
    user: &AuthUser,
    item_id: i64,
    payload: ItemStatusRequest,
) -> AppResult<ApiResponse<ItemStatusChanged>> {
    let raw = non_blank(payload.status)
        .ok_or_else(|| AppError::BadRequest("New item status is required.".into()))?;
    let status = raw.parse::<ItemStatus>().map_err(AppError::BadRequest)?;

    let txn = state.orm.begin().await?;
    let item = OrderItems::find_by_id(item_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Order item"))?;
    let order_id = item.order_id;

    let mut active: OrderItemActive = item.into();
    active.item_status = Set(status);
    active.update(&txn).await?;

    let mut order_status = None;
    if status == ItemStatus::Ready {
        let waiting = OrderItems::find()
            .filter(OrderItemCol::OrderId.eq(order_id))
            .filter(OrderItemCol::ItemStatus.ne(ItemStatus::Ready))
            .count(&txn)
            .await?;
        if waiting == 0 {
            if let Some(order) = Orders::find_by_id(order_id).one(&txn).await? {
                if order.status == OrderStatus::Pending {
                    let mut order: OrderActive = order.into();
                    order.status = Set(OrderStatus::Prepared);
                    order.update(&txn).await?;
                    order_status = Some(OrderStatus::Prepared);
                }
            }
        }
    }

    txn.commit().await?;

    tracing::debug!(item_id, status = %status, "kitchen item updated");
    audit::record(
        &state.pool,
        Some(user.user_id),
        "order_item_status",
        "order_items",
        serde_json::json!({ "item_id": item_id, "status": status }),
    )
    .await;

    Ok(ApiResponse::success(
        format!("Order item {item_id} status updated to {status}."),
        ItemStatusChanged {
            item_id,
            new_item_status: status,
            order_status,
        },
        Some(Meta::empty()),
    ))
}
