use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set, ActiveValue::NotSet};

use crate::{
    audit,
    dto::{
        catalog::{CategoryList, CategoryRequest},
        non_blank,
    },
    entity::categories::{ActiveModel, Column, Entity as Categories, Model as CategoryModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_manager},
    models::Category,
    response::{Ack, ApiResponse, Meta},
    state::AppState,
};

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let items = Categories::find()
        .order_by_asc(Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(category_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_manager(user)?;
    let name = non_blank(payload.name)
        .ok_or_else(|| AppError::BadRequest("Category name is required.".into()))?;
    let conflict = format!("Category with name \"{name}\" already exists.");

    let category = ActiveModel {
        id: NotSet,
        name: Set(name),
        description: Set(Some(payload.description.unwrap_or_default())),
    }
    .insert(&state.orm)
    .await
    .map_err(|e| AppError::unique_or(e, conflict))?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "category_create",
        "categories",
        serde_json::json!({ "category_id": category.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Category added successfully!",
        category_from_entity(category),
        Some(Meta::empty()),
    ))
}

pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: CategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_manager(user)?;
    let name = non_blank(payload.name)
        .ok_or_else(|| AppError::BadRequest("Category name is required.".into()))?;
    let conflict = format!("Category with name \"{name}\" already exists.");

    let existing = Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Category"))?;

    let mut active: ActiveModel = existing.into();
    active.name = Set(name);
    active.description = Set(Some(payload.description.unwrap_or_default()));
    let category = active
        .update(&state.orm)
        .await
        .map_err(|e| AppError::unique_or(e, conflict))?;

    Ok(ApiResponse::success(
        "Category updated successfully!",
        category_from_entity(category),
        Some(Meta::empty()),
    ))
}

pub async fn delete_category(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<Ack>> {
    ensure_manager(user)?;
    let result = Categories::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("Category"));
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "category_delete",
        "categories",
        serde_json::json!({ "category_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Category deleted successfully!",
        Ack { deleted_id: id },
        Some(Meta::empty()),
    ))
}

fn category_from_entity(model: CategoryModel) -> Category {
    Category {
        id: model.id,
        name: model.name,
        description: model.description,
    }
}
