#![allow(dead_code)]

use restaurant_pos_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    dto::orders::{CreateOrderRequest, OrderLineRequest, ProductRef},
    entity::{
        dining_tables::ActiveModel as TableActive, floors::ActiveModel as FloorActive,
        products::ActiveModel as ProductActive, users::ActiveModel as UserActive,
    },
    middleware::auth::AuthUser,
    models::{Role, TableStatus},
    state::AppState,
};
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, Set};

pub const TEST_SECRET: &str = "integration-test-secret";

/// Fresh, fully migrated in-memory database.
pub async fn setup_state() -> anyhow::Result<AppState> {
    let config = AppConfig::in_memory(TEST_SECRET);
    let pool = create_pool(&config.database_url, config.db_max_connections).await?;
    run_migrations(&pool).await?;
    Ok(AppState::new(pool, config))
}

/// Staff account that cannot sign in; enough for calling services directly.
pub async fn staff(state: &AppState, username: &str, role: Role) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: NotSet,
        username: Set(username.into()),
        password: Set("not-a-phc-hash".into()),
        role: Set(role),
        email: Set(None),
        full_name: Set(None),
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        username: user.username,
        role,
    })
}

pub async fn product(
    state: &AppState,
    name: &str,
    price: f64,
    stock_quantity: i64,
) -> anyhow::Result<i64> {
    let product = ProductActive {
        id: NotSet,
        name: Set(name.into()),
        price: Set(price),
        stock_quantity: Set(stock_quantity),
        category: Set(Some("Food".into())),
        description: Set(Some(String::new())),
    }
    .insert(&state.orm)
    .await?;
    Ok(product.id)
}

/// A floor with one table on it; returns `(floor_id, table_id)`.
pub async fn floor_with_table(
    state: &AppState,
    floor: &str,
    table: &str,
) -> anyhow::Result<(i64, i64)> {
    let floor = FloorActive {
        id: NotSet,
        name: Set(floor.into()),
    }
    .insert(&state.orm)
    .await?;

    let table = TableActive {
        id: NotSet,
        floor_id: Set(floor.id),
        name: Set(table.into()),
        status: Set(TableStatus::Available),
    }
    .insert(&state.orm)
    .await?;

    Ok((floor.id, table.id))
}

pub fn line(product_id: i64, quantity: i64) -> OrderLineRequest {
    OrderLineRequest {
        product: ProductRef {
            id: product_id,
            name: None,
            price: None,
        },
        quantity,
    }
}

pub fn order(items: Vec<OrderLineRequest>, status: &str) -> CreateOrderRequest {
    CreateOrderRequest {
        items,
        status: Some(status.into()),
        ..Default::default()
    }
}

pub async fn stock_of(state: &AppState, product_id: i64) -> anyhow::Result<i64> {
    let stock = sqlx::query_scalar("SELECT stock_quantity FROM products WHERE id = ?")
        .bind(product_id)
        .fetch_one(&state.pool)
        .await?;
    Ok(stock)
}

pub async fn table_status(state: &AppState, table_id: i64) -> anyhow::Result<TableStatus> {
    let status = sqlx::query_scalar("SELECT status FROM tables WHERE id = ?")
        .bind(table_id)
        .fetch_one(&state.pool)
        .await?;
    Ok(status)
}

pub async fn count_rows(state: &AppState, table: &str) -> anyhow::Result<i64> {
    let count = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(&state.pool)
        .await?;
    Ok(count)
}
