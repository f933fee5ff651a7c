use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    ActiveValue::NotSet,
};

use crate::{
    audit,
    dto::{
        non_blank,
        users::{RegisterRequest, UpdateUserRequest, UserList},
    },
    entity::users::{ActiveModel, Column, Entity as Users, Model as UserModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin, ensure_manager},
    models::{Role, User},
    response::{Ack, ApiResponse, Meta},
    services::auth_service::hash_pin,
    state::AppState,
};

pub async fn list_users(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<UserList>> {
    ensure_manager(user)?;
    let items = Users::find()
        .order_by_asc(Column::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(user_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Users",
        UserList { items },
        Some(Meta::empty()),
    ))
}

pub async fn get_user(state: &AppState, user: &AuthUser, id: i64) -> AppResult<ApiResponse<User>> {
    ensure_manager(user)?;
    let found = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    Ok(ApiResponse::success("User", user_from_entity(found), None))
}

pub async fn register_user(
    state: &AppState,
    user: &AuthUser,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;
    let (Some(username), Some(pin), Some(role)) = (
        non_blank(payload.username),
        non_blank(payload.pin),
        non_blank(payload.role),
    ) else {
        return Err(AppError::BadRequest(
            "Username, PIN, and Role are required.".into(),
        ));
    };
    let role = parse_role(&role)?;

    let exists = Users::find()
        .filter(Column::Username.eq(username.as_str()))
        .one(&state.orm)
        .await?;
    if exists.is_some() {
        return Err(AppError::Conflict("Username already exists.".into()));
    }

    let active = ActiveModel {
        id: NotSet,
        username: Set(username),
        password: Set(hash_pin(&pin)?),
        role: Set(role),
        email: Set(non_blank(payload.email)),
        full_name: Set(non_blank(payload.full_name)),
    };
    let created = active
        .insert(&state.orm)
        .await
        .map_err(|e| AppError::unique_or(e, "Username already exists."))?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "user_register",
        "users",
        serde_json::json!({ "user_id": created.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "User registered successfully!",
        user_from_entity(created),
        Some(Meta::empty()),
    ))
}

pub async fn update_user(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;
    let (Some(username), Some(role)) = (non_blank(payload.username), non_blank(payload.role))
    else {
        return Err(AppError::BadRequest(
            "Username and Role are required for update.".into(),
        ));
    };
    let role = parse_role(&role)?;

    let taken = Users::find()
        .filter(Column::Username.eq(username.as_str()))
        .filter(Column::Id.ne(id))
        .one(&state.orm)
        .await?;
    if taken.is_some() {
        return Err(AppError::Conflict(
            "Username already taken by another user.".into(),
        ));
    }

    let existing = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    let mut active: ActiveModel = existing.into();
    active.username = Set(username);
    active.role = Set(role);
    active.email = Set(non_blank(payload.email));
    active.full_name = Set(non_blank(payload.full_name));
    if let Some(pin) = non_blank(payload.new_pin) {
        active.password = Set(hash_pin(&pin)?);
    }

    let updated = active
        .update(&state.orm)
        .await
        .map_err(|e| AppError::unique_or(e, "Username already taken by another user."))?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "user_update",
        "users",
        serde_json::json!({ "user_id": updated.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "User updated successfully!",
        user_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub async fn delete_user(state: &AppState, user: &AuthUser, id: i64) -> AppResult<ApiResponse<Ack>> {
    ensure_admin(user)?;
    if user.user_id == id {
        return Err(AppError::Conflict("You cannot delete your own account.".into()));
    }

    let result = Users::delete_by_id(id)
        .exec(&state.orm)
        .await
        .map_err(|e| {
            AppError::foreign_key_or(e, "Cannot delete user. Orders reference this user.")
        })?;

    if result.rows_affected == 0 {
        return Err(AppError::not_found("User"));
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "user_delete",
        "users",
        serde_json::json!({ "user_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "User deleted successfully.",
        Ack { deleted_id: id },
        Some(Meta::empty()),
    ))
}

fn parse_role(raw: &str) -> AppResult<Role> {
    raw.parse::<Role>().map_err(AppError::BadRequest)
}

pub(crate) fn user_from_entity(model: UserModel) -> User {
    User {
        id: model.id,
        username: model.username,
        role: model.role,
        email: model.email,
        full_name: model.full_name,
    }
}
