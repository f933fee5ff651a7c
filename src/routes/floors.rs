use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};

use crate::{
    dto::floor_plan::{FloorList, FloorRequest},
    error::AppResult,
    extract::AppJson,
    middleware::auth::AuthUser,
    models::Floor,
    response::{Ack, ApiResponse},
    services::floor_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_floors).post(create_floor))
        .route("/{id}", put(update_floor).delete(delete_floor))
}

#[utoipa::path(
    get,
    path = "/api/floors",
    responses((status = 200, description = "Floors", body = ApiResponse<FloorList>)),
    security(("bearer_auth" = [])),
    tag = "Floor plan"
)]
pub async fn list_floors(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<ApiResponse<FloorList>>> {
    let resp = floor_service::list_floors(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/floors",
    request_body = FloorRequest,
    responses(
        (status = 201, description = "Floor created", body = ApiResponse<Floor>),
        (status = 400, description = "Name missing"),
        (status = 409, description = "Duplicate name")
    ),
    security(("bearer_auth" = [])),
    tag = "Floor plan"
)]
pub async fn create_floor(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<FloorRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Floor>>)> {
    let resp = floor_service::create_floor(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/floors/{id}",
    params(("id" = i64, Path, description = "Floor ID")),
    request_body = FloorRequest,
    responses(
        (status = 200, description = "Updated floor", body = ApiResponse<Floor>),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Duplicate name")
    ),
    security(("bearer_auth" = [])),
    tag = "Floor plan"
)]
pub async fn update_floor(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    AppJson(payload): AppJson<FloorRequest>,
) -> AppResult<Json<ApiResponse<Floor>>> {
    let resp = floor_service::update_floor(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/floors/{id}",
    params(("id" = i64, Path, description = "Floor ID")),
    responses(
        (status = 200, description = "Deleted with its tables", body = ApiResponse<Ack>),
        (status = 404, description = "Not Found"),
        (status = 409, description = "A table on this floor has orders")
    ),
    security(("bearer_auth" = [])),
    tag = "Floor plan"
)]
pub async fn delete_floor(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Ack>>> {
    let resp = floor_service::delete_floor(&state, &user, id).await?;
    Ok(Json(resp))
}
