use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
    ActiveValue::NotSet,
};

use crate::{
    audit,
    dto::{
        floor_plan::{CreateTableRequest, StatusRequest, TableList, UpdateTableRequest},
        non_blank,
    },
    entity::{
        dining_tables::{ActiveModel, Entity as DiningTables},
        floors::Entity as Floors,
        orders::{Column as OrderCol, Entity as Orders},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_manager},
    models::{DiningTable, TableStatus},
    response::{Ack, ApiResponse, Meta},
    state::AppState,
};

const TABLE_VIEW_SQL: &str = r#"
    SELECT t.id, t.name, t.status, t.floor_id, f.name AS floor_name
    FROM tables t
    JOIN floors f ON t.floor_id = f.id
"#;

pub async fn list_tables(state: &AppState) -> AppResult<ApiResponse<TableList>> {
    let items = sqlx::query_as::<_, DiningTable>(&format!(
        "{TABLE_VIEW_SQL} ORDER BY f.name ASC, t.name ASC"
    ))
    .fetch_all(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Tables",
        TableList { items },
        Some(Meta::empty()),
    ))
}

pub async fn get_table(state: &AppState, id: i64) -> AppResult<DiningTable> {
    sqlx::query_as::<_, DiningTable>(&format!("{TABLE_VIEW_SQL} WHERE t.id = ?"))
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::not_found("Table"))
}

pub async fn create_table(
    state: &AppState,
    user: &AuthUser,
    payload: CreateTableRequest,
) -> AppResult<ApiResponse<DiningTable>> {
    ensure_manager(user)?;
    let (Some(name), Some(floor_id)) = (non_blank(payload.name), payload.floor_id) else {
        return Err(AppError::BadRequest(
            "Table name and a valid numeric floor ID are required.".into(),
        ));
    };
    ensure_floor_exists(state, floor_id).await?;
    let conflict = format!("Table with name \"{name}\" already exists.");

    let table = ActiveModel {
        id: NotSet,
        floor_id: Set(floor_id),
        name: Set(name),
        status: Set(TableStatus::Available),
    }
    .insert(&state.orm)
    .await
    .map_err(|e| AppError::unique_or(e, conflict))?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "table_create",
        "tables",
        serde_json::json!({ "table_id": table.id }),
    )
    .await;

    let view = get_table(state, table.id).await?;
    Ok(ApiResponse::success(
        "Table added successfully!",
        view,
        Some(Meta::empty()),
    ))
}

pub async fn update_table(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: UpdateTableRequest,
) -> AppResult<ApiResponse<DiningTable>> {
    ensure_manager(user)?;
    let (Some(name), Some(floor_id), Some(status)) = (
        non_blank(payload.name),
        payload.floor_id,
        non_blank(payload.status),
    ) else {
        return Err(AppError::BadRequest(
            "Table name, valid numeric floor ID, and status are required for update.".into(),
        ));
    };
    let status = parse_table_status(&status)?;
    let conflict = format!("Table with name \"{name}\" already exists.");

    let existing = DiningTables::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Table"))?;
    ensure_floor_exists(state, floor_id).await?;

    let mut active: ActiveModel = existing.into();
    active.name = Set(name);
    active.floor_id = Set(floor_id);
    active.status = Set(status);
    active
        .update(&state.orm)
        .await
        .map_err(|e| AppError::unique_or(e, conflict))?;

    let view = get_table(state, id).await?;
    Ok(ApiResponse::success(
        "Table updated successfully!",
        view,
        Some(Meta::empty()),
    ))
}

pub async fn delete_table(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<Ack>> {
    ensure_manager(user)?;
    let orders = Orders::find()
        .filter(OrderCol::TableId.eq(id))
        .count(&state.orm)
        .await?;
    if orders > 0 {
        return Err(AppError::Conflict(format!(
            "Cannot delete table. There are {orders} associated orders."
        )));
    }

    let result = DiningTables::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("Table"));
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "table_delete",
        "tables",
        serde_json::json!({ "table_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Table deleted successfully!",
        Ack { deleted_id: id },
        Some(Meta::empty()),
    ))
}

/// Any signed-in staff member may flip a table between available and occupied.
pub async fn set_table_status(
    state: &AppState,
    _user: &AuthUser,
    id: i64,
    payload: StatusRequest,
) -> AppResult<ApiResponse<DiningTable>> {
    let status = non_blank(payload.status)
        .ok_or_else(|| AppError::BadRequest("New status is required.".into()))?;
    let status = parse_table_status(&status)?;

    let existing = DiningTables::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Table"))?;

    let mut active: ActiveModel = existing.into();
    active.status = Set(status);
    active.update(&state.orm).await?;

    let view = get_table(state, id).await?;
    Ok(ApiResponse::success(
        format!("Table {id} status updated to {status}."),
        view,
        Some(Meta::empty()),
    ))
}

async fn ensure_floor_exists(state: &AppState, floor_id: i64) -> AppResult<()> {
    if Floors::find_by_id(floor_id).one(&state.orm).await?.is_none() {
        return Err(AppError::BadRequest(format!(
            "Floor with ID {floor_id} not found."
        )));
    }
    Ok(())
}

fn parse_table_status(raw: &str) -> AppResult<TableStatus> {
    raw.parse::<TableStatus>().map_err(AppError::BadRequest)
}
