use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::{Category, Product};

/// Body for both creating and replacing a product.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub stock_quantity: Option<i64>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct ProductQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct LowStockQuery {
    /// Products at or below this stock level, default 5.
    pub threshold: Option<i64>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct CategoryList {
    #[schema(value_type = Vec<Category>)]
    pub items: Vec<Category>,
}
