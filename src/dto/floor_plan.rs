use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{DiningTable, Floor};

#[derive(Debug, Deserialize, ToSchema)]
pub struct FloorRequest {
    pub name: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct FloorList {
    #[schema(value_type = Vec<Floor>)]
    pub items: Vec<Floor>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTableRequest {
    pub name: Option<String>,
    #[serde(rename = "floorId", alias = "floor_id")]
    pub floor_id: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTableRequest {
    pub name: Option<String>,
    #[serde(rename = "floorId", alias = "floor_id")]
    pub floor_id: Option<i64>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusRequest {
    pub status: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct TableList {
    #[schema(value_type = Vec<DiningTable>)]
    pub items: Vec<DiningTable>,
}
