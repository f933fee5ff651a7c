use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, put},
};

use crate::{
    dto::floor_plan::{CreateTableRequest, StatusRequest, TableList, UpdateTableRequest},
    error::AppResult,
    extract::AppJson,
    middleware::auth::AuthUser,
    models::DiningTable,
    response::{Ack, ApiResponse},
    services::table_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tables).post(create_table))
        .route("/{id}", put(update_table).delete(delete_table))
        .route("/{id}/status", patch(set_table_status))
}

#[utoipa::path(
    get,
    path = "/api/tables",
    responses((status = 200, description = "Tables with their floor", body = ApiResponse<TableList>)),
    security(("bearer_auth" = [])),
    tag = "Floor plan"
)]
pub async fn list_tables(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<ApiResponse<TableList>>> {
    let resp = table_service::list_tables(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/tables",
    request_body = CreateTableRequest,
    responses(
        (status = 201, description = "Table created", body = ApiResponse<DiningTable>),
        (status = 400, description = "Missing field or unknown floor"),
        (status = 409, description = "Duplicate name")
    ),
    security(("bearer_auth" = [])),
    tag = "Floor plan"
)]
pub async fn create_table(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<CreateTableRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<DiningTable>>)> {
    let resp = table_service::create_table(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/tables/{id}",
    params(("id" = i64, Path, description = "Table ID")),
    request_body = UpdateTableRequest,
    responses(
        (status = 200, description = "Updated table", body = ApiResponse<DiningTable>),
        (status = 400, description = "Missing field or invalid status"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Duplicate name")
    ),
    security(("bearer_auth" = [])),
    tag = "Floor plan"
)]
pub async fn update_table(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    AppJson(payload): AppJson<UpdateTableRequest>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    let resp = table_service::update_table(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/tables/{id}",
    params(("id" = i64, Path, description = "Table ID")),
    responses(
        (status = 200, description = "Deleted", body = ApiResponse<Ack>),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Table has orders")
    ),
    security(("bearer_auth" = [])),
    tag = "Floor plan"
)]
pub async fn delete_table(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Ack>>> {
    let resp = table_service::delete_table(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/tables/{id}/status",
    params(("id" = i64, Path, description = "Table ID")),
    request_body = StatusRequest,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<DiningTable>),
        (status = 400, description = "Invalid status"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Floor plan"
)]
pub async fn set_table_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    AppJson(payload): AppJson<StatusRequest>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    let resp = table_service::set_table_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
