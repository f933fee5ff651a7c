use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set, ActiveValue::NotSet};

use crate::{
    audit,
    dto::{
        floor_plan::{FloorList, FloorRequest},
        non_blank,
    },
    entity::floors::{ActiveModel, Column, Entity as Floors, Model as FloorModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_manager},
    models::Floor,
    response::{Ack, ApiResponse, Meta},
    state::AppState,
};

pub async fn list_floors(state: &AppState) -> AppResult<ApiResponse<FloorList>> {
    let items = Floors::find()
        .order_by_asc(Column::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(floor_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Floors",
        FloorList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_floor(
    state: &AppState,
    user: &AuthUser,
    payload: FloorRequest,
) -> AppResult<ApiResponse<Floor>> {
    ensure_manager(user)?;
    let name = non_blank(payload.name)
        .ok_or_else(|| AppError::BadRequest("Floor name is required.".into()))?;
    let conflict = format!("Floor with name \"{name}\" already exists.");

    let floor = ActiveModel {
        id: NotSet,
        name: Set(name),
    }
    .insert(&state.orm)
    .await
    .map_err(|e| AppError::unique_or(e, conflict))?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "floor_create",
        "floors",
        serde_json::json!({ "floor_id": floor.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Floor added successfully!",
        floor_from_entity(floor),
        Some(Meta::empty()),
    ))
}

pub async fn update_floor(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: FloorRequest,
) -> AppResult<ApiResponse<Floor>> {
    ensure_manager(user)?;
    let name = non_blank(payload.name)
        .ok_or_else(|| AppError::BadRequest("Floor name is required.".into()))?;
    let conflict = format!("Floor with name \"{name}\" already exists.");

    let existing = Floors::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Floor"))?;

    let mut active: ActiveModel = existing.into();
    active.name = Set(name);
    let floor = active
        .update(&state.orm)
        .await
        .map_err(|e| AppError::unique_or(e, conflict))?;

    Ok(ApiResponse::success(
        "Floor updated successfully!",
        floor_from_entity(floor),
        Some(Meta::empty()),
    ))
}

/// Deleting a floor cascades to its tables, which fails while any of them
/// is still referenced by an order.
pub async fn delete_floor(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<Ack>> {
    ensure_manager(user)?;
    let result = Floors::delete_by_id(id)
        .exec(&state.orm)
        .await
        .map_err(|e| {
            AppError::foreign_key_or(
                e,
                "Cannot delete floor. Some of its tables have associated orders.",
            )
        })?;

    if result.rows_affected == 0 {
        return Err(AppError::not_found("Floor"));
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "floor_delete",
        "floors",
        serde_json::json!({ "floor_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Floor deleted successfully!",
        Ack { deleted_id: id },
        Some(Meta::empty()),
    ))
}

fn floor_from_entity(model: FloorModel) -> Floor {
    Floor {
        id: model.id,
        name: model.name,
    }
}
