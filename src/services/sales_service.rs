use std::collections::HashMap;

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};

use crate::{
    db::DbPool,
    dto::sales::{
        DailyPoint, DailyTrend, MonthlyComparison, MonthlyPoint, SalesMetrics, UserReport,
        UserSales,
    },
    error::AppResult,
    middleware::auth::{AuthUser, ensure_manager},
    models::Role,
    response::{ApiResponse, Meta},
    services::order_service::round_money,
    state::AppState,
};

/// Half-open `[start, end)` range of order dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Period {
    pub start: String,
    pub end: String,
}

impl Period {
    fn between(from: NaiveDate, until: NaiveDate) -> Self {
        Period {
            start: day_start(from),
            end: day_start(until),
        }
    }
}

fn day_start(date: NaiveDate) -> String {
    format!("{}T00:00:00.000Z", date.format("%Y-%m-%d"))
}

fn next_day(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(date)
}

fn prev_day(date: NaiveDate) -> NaiveDate {
    date.pred_opt().unwrap_or(date)
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

/// First day of the month `delta` months away from `date`'s month.
fn shift_months(date: NaiveDate, delta: i32) -> NaiveDate {
    let index = date.year() * 12 + date.month0() as i32 + delta;
    let (year, month0) = (index.div_euclid(12), index.rem_euclid(12));
    NaiveDate::from_ymd_opt(year, month0 as u32 + 1, 1).unwrap_or_else(|| month_start(date))
}

/// Same calendar day one year earlier; 29 February falls back to the 28th.
fn year_earlier(date: NaiveDate) -> NaiveDate {
    date.with_year(date.year() - 1)
        .or_else(|| prev_day(date).with_year(date.year() - 1))
        .unwrap_or(date)
}

pub(crate) fn today_periods(now: DateTime<Utc>) -> (Period, Period) {
    let today = now.date_naive();
    (
        Period::between(today, next_day(today)),
        Period::between(prev_day(today), today),
    )
}

pub(crate) fn month_periods(now: DateTime<Utc>) -> (Period, Period) {
    let first = month_start(now.date_naive());
    (
        Period::between(first, shift_months(first, 1)),
        Period::between(shift_months(first, -1), first),
    )
}

/// This year up to and including today, against the same stretch last year.
pub(crate) fn year_to_date_periods(now: DateTime<Utc>) -> (Period, Period) {
    let today = now.date_naive();
    let jan_first = shift_months(today, -(today.month0() as i32));
    let last_year_today = year_earlier(today);
    (
        Period::between(jan_first, next_day(today)),
        Period::between(shift_months(jan_first, -12), next_day(last_year_today)),
    )
}

pub(crate) fn percentage_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return if current > 0.0 { 100.0 } else { 0.0 };
    }
    ((current - previous) / previous * 1000.0).round() / 10.0
}

async fn completed_sales(pool: &DbPool, period: &Period) -> AppResult<f64> {
    let total: f64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(final_total), 0.0)
        FROM orders
        WHERE status = 'completed' AND order_date >= ? AND order_date < ?
        "#,
    )
    .bind(&period.start)
    .bind(&period.end)
    .fetch_one(pool)
    .await?;
    Ok(round_money(total))
}

async fn sales_by_prefix(
    pool: &DbPool,
    prefix_len: i64,
    period: &Period,
) -> AppResult<HashMap<String, f64>> {
    let rows: Vec<(String, f64)> = sqlx::query_as(
        r#"
        SELECT SUBSTR(order_date, 1, ?) AS bucket, COALESCE(SUM(final_total), 0.0) AS sales
        FROM orders
        WHERE status = 'completed' AND order_date >= ? AND order_date < ?
        GROUP BY bucket
        "#,
    )
    .bind(prefix_len)
    .bind(&period.start)
    .bind(&period.end)
    .fetch_all(pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(|(bucket, sales)| (bucket, round_money(sales)))
        .collect())
}

pub async fn metrics_at(pool: &DbPool, now: DateTime<Utc>) -> AppResult<SalesMetrics> {
    let (today, yesterday) = today_periods(now);
    let (this_month, last_month) = month_periods(now);
    let (this_year, last_year) = year_to_date_periods(now);

    let today_sales = completed_sales(pool, &today).await?;
    let yesterday_sales = completed_sales(pool, &yesterday).await?;
    let this_month_sales = completed_sales(pool, &this_month).await?;
    let last_month_sales = completed_sales(pool, &last_month).await?;
    let total_sales_ytd = completed_sales(pool, &this_year).await?;
    let last_year_sales = completed_sales(pool, &last_year).await?;

    Ok(SalesMetrics {
        today_sales,
        today_sales_change: percentage_change(today_sales, yesterday_sales),
        this_month_sales,
        this_month_sales_change: percentage_change(this_month_sales, last_month_sales),
        total_sales_ytd,
        total_sales_ytd_change: percentage_change(total_sales_ytd, last_year_sales),
        sales_change_overall: round_money(total_sales_ytd - last_year_sales),
        sales_change_overall_percent: percentage_change(total_sales_ytd, last_year_sales),
    })
}

/// Seven points ending today, zero-filled.
pub async fn daily_trend_at(pool: &DbPool, now: DateTime<Utc>) -> AppResult<Vec<DailyPoint>> {
    let today = now.date_naive();
    let first = today - Days::new(6);
    let sales = sales_by_prefix(pool, 10, &Period::between(first, next_day(today))).await?;

    Ok(first
        .iter_days()
        .take(7)
        .map(|day| DailyPoint {
            name: day.format("%m-%d").to_string(),
            sales: sales
                .get(&day.format("%Y-%m-%d").to_string())
                .copied()
                .unwrap_or(0.0),
        })
        .collect())
}

/// The last six months against the same months one year earlier.
pub async fn monthly_comparison_at(
    pool: &DbPool,
    now: DateTime<Utc>,
) -> AppResult<Vec<MonthlyPoint>> {
    let this_month = month_start(now.date_naive());
    let first = shift_months(this_month, -5);
    let range = Period::between(shift_months(first, -12), shift_months(this_month, 1));
    let sales = sales_by_prefix(pool, 7, &range).await?;
    let lookup = |month: NaiveDate| {
        sales
            .get(&month.format("%Y-%m").to_string())
            .copied()
            .unwrap_or(0.0)
    };

    Ok((0..6)
        .map(|offset| {
            let month = shift_months(first, offset);
            MonthlyPoint {
                name: month.format("%b").to_string(),
                current: lookup(month),
                previous: lookup(shift_months(month, -12)),
            }
        })
        .collect())
}

#[derive(sqlx::FromRow)]
struct UserSalesRow {
    id: i64,
    username: String,
    email: Option<String>,
    full_name: Option<String>,
    role: Role,
    total_sales: f64,
    orders: i64,
    this_month: f64,
    last_month: f64,
}

/// Completed sales per user, counting orders taken as waiter and rung up as cashier.
pub async fn user_report_at(pool: &DbPool, now: DateTime<Utc>) -> AppResult<Vec<UserSales>> {
    let (this_month, last_month) = month_periods(now);
    let rows = sqlx::query_as::<_, UserSalesRow>(
        r#"
        SELECT u.id, u.username, u.email, u.full_name, u.role,
               COALESCE(SUM(s.final_total), 0.0) AS total_sales,
               COUNT(s.order_id) AS orders,
               COALESCE(SUM(CASE WHEN s.order_date >= ? AND s.order_date < ?
                                 THEN s.final_total END), 0.0) AS this_month,
               COALESCE(SUM(CASE WHEN s.order_date >= ? AND s.order_date < ?
                                 THEN s.final_total END), 0.0) AS last_month
        FROM users u
        JOIN (
            SELECT cashier_id AS user_id, id AS order_id, final_total, order_date
            FROM orders WHERE status = 'completed' AND cashier_id IS NOT NULL
            UNION ALL
            SELECT waiter_id AS user_id, id AS order_id, final_total, order_date
            FROM orders WHERE status = 'completed' AND waiter_id IS NOT NULL
        ) s ON s.user_id = u.id
        GROUP BY u.id, u.username, u.email, u.full_name, u.role
        ORDER BY total_sales DESC, u.id ASC
        "#,
    )
    .bind(&this_month.start)
    .bind(&this_month.end)
    .bind(&last_month.start)
    .bind(&last_month.end)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| UserSales {
            id: row.id,
            username: row.username,
            email: row.email,
            full_name: row.full_name,
            role: row.role,
            total_sales: round_money(row.total_sales),
            orders: row.orders,
            change: percentage_change(round_money(row.this_month), round_money(row.last_month)),
        })
        .collect())
}

pub async fn sales_metrics(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<SalesMetrics>> {
    ensure_manager(user)?;
    let metrics = metrics_at(&state.pool, Utc::now()).await?;
    Ok(ApiResponse::success("Sales metrics", metrics, Some(Meta::empty())))
}

pub async fn daily_trend(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<DailyTrend>> {
    ensure_manager(user)?;
    let items = daily_trend_at(&state.pool, Utc::now()).await?;
    Ok(ApiResponse::success(
        "Daily sales trend",
        DailyTrend { items },
        Some(Meta::empty()),
    ))
}

pub async fn monthly_comparison(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<MonthlyComparison>> {
    ensure_manager(user)?;
    let items = monthly_comparison_at(&state.pool, Utc::now()).await?;
    Ok(ApiResponse::success(
        "Monthly sales comparison",
        MonthlyComparison { items },
        Some(Meta::empty()),
    ))
}

pub async fn user_report(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<UserReport>> {
    ensure_manager(user)?;
    let items = user_report_at(&state.pool, Utc::now()).await?;
    Ok(ApiResponse::success(
        "User sales report",
        UserReport { items },
        Some(Meta::empty()),
    ))
}
