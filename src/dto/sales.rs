use serde::Serialize;
use utoipa::ToSchema;

use crate::models::Role;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SalesMetrics {
    pub today_sales: f64,
    pub today_sales_change: f64,
    pub this_month_sales: f64,
    pub this_month_sales_change: f64,
    pub total_sales_ytd: f64,
    pub total_sales_ytd_change: f64,
    /// Absolute difference between this year and last year to date.
    pub sales_change_overall: f64,
    pub sales_change_overall_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DailyPoint {
    /// `MM-DD`
    pub name: String,
    pub sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MonthlyPoint {
    /// Short month name, e.g. `Jan`.
    pub name: String,
    pub current: f64,
    pub previous: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UserSales {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role: Role,
    pub total_sales: f64,
    pub orders: i64,
    pub change: f64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct DailyTrend {
    #[schema(value_type = Vec<DailyPoint>)]
    pub items: Vec<DailyPoint>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct MonthlyComparison {
    #[schema(value_type = Vec<MonthlyPoint>)]
    pub items: Vec<MonthlyPoint>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct UserReport {
    #[schema(value_type = Vec<UserSales>)]
    pub items: Vec<UserSales>,
}
