use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
    ActiveValue::NotSet,
};

use crate::{
    audit,
    dto::{
        catalog::{LowStockQuery, ProductList, ProductQuery, ProductRequest},
        non_blank,
    },
    entity::products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_manager},
    models::Product,
    response::{Ack, ApiResponse, Meta},
    state::AppState,
};

const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;

/// A product body that passed validation.
struct ValidProduct {
    name: String,
    description: String,
    price: f64,
    stock_quantity: i64,
    category: String,
}

fn validate(payload: ProductRequest) -> AppResult<ValidProduct> {
    let (Some(name), Some(price), Some(stock_quantity), Some(category)) = (
        non_blank(payload.name),
        payload.price,
        payload.stock_quantity,
        non_blank(payload.category),
    ) else {
        return Err(AppError::BadRequest(
            "Name, price, stock quantity, and category are required.".into(),
        ));
    };

    if !price.is_finite() || price < 0.0 {
        return Err(AppError::BadRequest(
            "Price must be a non-negative number.".into(),
        ));
    }
    if stock_quantity < 0 {
        return Err(AppError::BadRequest(
            "Stock quantity must be a non-negative integer.".into(),
        ));
    }

    Ok(ValidProduct {
        name,
        description: payload.description.unwrap_or_default(),
        price,
        stock_quantity,
        category,
    })
}

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let mut condition = Condition::all();
    if let Some(category) = non_blank(query.category) {
        condition = condition.add(Column::Category.eq(category));
    }

    let items = Products::find()
        .filter(condition)
        .order_by_asc(Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(Meta::empty()),
    ))
}

pub async fn get_product(state: &AppState, id: i64) -> AppResult<ApiResponse<Product>> {
    let result = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(product_from_entity)
        .ok_or_else(|| AppError::not_found("Product"))?;
    Ok(ApiResponse::success("Product", result, None))
}

pub async fn list_low_stock(
    state: &AppState,
    user: &AuthUser,
    query: LowStockQuery,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_manager(user)?;
    let threshold = query
        .threshold
        .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD)
        .max(0);

    let items = Products::find()
        .filter(Column::StockQuantity.lte(threshold))
        .order_by_asc(Column::StockQuantity)
        .order_by_asc(Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Low stock products",
        ProductList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: ProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_manager(user)?;
    let valid = validate(payload)?;
    let conflict = format!("Product with name \"{}\" already exists.", valid.name);

    let active = ActiveModel {
        id: NotSet,
        name: Set(valid.name),
        price: Set(valid.price),
        stock_quantity: Set(valid.stock_quantity),
        category: Set(Some(valid.category)),
        description: Set(Some(valid.description)),
    };
    let product = active
        .insert(&state.orm)
        .await
        .map_err(|e| AppError::unique_or(e, conflict))?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product added successfully!",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: ProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_manager(user)?;
    let valid = validate(payload)?;
    let conflict = format!("Product with name \"{}\" already exists.", valid.name);

    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;

    let mut active: ActiveModel = existing.into();
    active.name = Set(valid.name);
    active.description = Set(Some(valid.description));
    active.price = Set(valid.price);
    active.stock_quantity = Set(valid.stock_quantity);
    active.category = Set(Some(valid.category));

    let product = active
        .update(&state.orm)
        .await
        .map_err(|e| AppError::unique_or(e, conflict))?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product updated successfully!",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<Ack>> {
    ensure_manager(user)?;
    let result = Products::delete_by_id(id)
        .exec(&state.orm)
        .await
        .map_err(|e| {
            AppError::foreign_key_or(e, "Cannot delete product. It appears on existing orders.")
        })?;

    if result.rows_affected == 0 {
        return Err(AppError::not_found("Product"));
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product deleted successfully!",
        Ack { deleted_id: id },
        Some(Meta::empty()),
    ))
}

pub(crate) fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        description: model.description,
        price: model.price,
        stock_quantity: model.stock_quantity,
        category: model.category,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(price: Option<f64>, stock: Option<i64>) -> ProductRequest {
        ProductRequest {
            name: Some("Latte".into()),
            description: None,
            price,
            stock_quantity: stock,
            category: Some("Beverages".into()),
        }
    }

    #[test]
    fn missing_fields_are_rejected() {
        let err = validate(request(None, Some(1))).err().unwrap();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn negative_values_are_rejected() {
        assert!(matches!(
            validate(request(Some(-1.0), Some(1))),
            Err(AppError::BadRequest(m)) if m.starts_with("Price")
        ));
        assert!(matches!(
            validate(request(Some(1.0), Some(-1))),
            Err(AppError::BadRequest(m)) if m.starts_with("Stock")
        ));
    }

    #[test]
    fn description_defaults_to_empty() {
        let valid = validate(request(Some(4.0), Some(0))).unwrap();
        assert_eq!(valid.description, "");
        assert_eq!(valid.stock_quantity, 0);
    }
}
