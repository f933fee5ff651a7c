use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::sales::{DailyTrend, MonthlyComparison, SalesMetrics, UserReport},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::sales_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/metrics", get(sales_metrics))
        .route("/daily-trend", get(daily_trend))
        .route("/monthly-comparison", get(monthly_comparison))
        .route("/user-report", get(user_report))
}

#[utoipa::path(
    get,
    path = "/api/sales/metrics",
    responses(
        (status = 200, description = "Today, month and year-to-date sales with change", body = ApiResponse<SalesMetrics>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Sales"
)]
pub async fn sales_metrics(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<SalesMetrics>>> {
    let resp = sales_service::sales_metrics(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/sales/daily-trend",
    responses(
        (status = 200, description = "Sales for the last seven days", body = ApiResponse<DailyTrend>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Sales"
)]
pub async fn daily_trend(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<DailyTrend>>> {
    let resp = sales_service::daily_trend(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/sales/monthly-comparison",
    responses(
        (status = 200, description = "Last six months against the year before", body = ApiResponse<MonthlyComparison>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Sales"
)]
pub async fn monthly_comparison(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<MonthlyComparison>>> {
    let resp = sales_service::monthly_comparison(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/sales/user-report",
    responses(
        (status = 200, description = "Completed sales per staff member", body = ApiResponse<UserReport>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Sales"
)]
pub async fn user_report(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<UserReport>>> {
    let resp = sales_service::user_report(&state, &user).await?;
    Ok(Json(resp))
}
