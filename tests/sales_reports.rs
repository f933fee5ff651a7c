mod common;

use chrono::{DateTime, TimeZone, Utc};
use common::{line, order, product, setup_state, staff};
use restaurant_pos_api::{
    error::AppError,
    models::Role,
    services::{order_service, sales_service},
    state::AppState,
};

fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

struct Ledger {
    cashier: i64,
    waiter: i64,
}

/// Completed sales spread over this year and last, plus one open order.
async fn ledger(state: &AppState) -> anyhow::Result<Ledger> {
    let manager = staff(state, "manager", Role::Manager).await?;
    let cashier = staff(state, "cashier", Role::Cashier).await?;
    let waiter = staff(state, "waiter", Role::Waiter).await?;
    let latte = product(state, "Latte", 4.0, 50).await?;
    let cookie = product(state, "Cookie", 2.5, 50).await?;

    let sales = [
        (at(2025, 3, 15, 9), latte, 2, None),
        (at(2025, 3, 14, 10), latte, 1, Some(waiter.user_id)),
        (at(2025, 2, 10, 12), cookie, 2, None),
        (at(2024, 3, 10, 12), latte, 5, None),
    ];
    for (date, product_id, quantity, waiter_id) in sales {
        let mut request = order(vec![line(product_id, quantity)], "completed");
        request.order_date = Some(date);
        request.cashier_id = Some(cashier.user_id);
        request.waiter_id = waiter_id;
        order_service::create_order(state, &manager, request).await?;
    }

    let mut open = order(vec![line(latte, 1)], "pending");
    open.order_date = Some(at(2025, 3, 15, 11));
    order_service::create_order(state, &manager, open).await?;

    Ok(Ledger {
        cashier: cashier.user_id,
        waiter: waiter.user_id,
    })
}

#[tokio::test]
async fn headline_metrics_compare_periods() -> anyhow::Result<()> {
    let state = setup_state().await?;
    ledger(&state).await?;

    let metrics = sales_service::metrics_at(&state.pool, at(2025, 3, 15, 18)).await?;
    assert_eq!(metrics.today_sales, 8.0);
    assert_eq!(metrics.today_sales_change, 100.0);
    assert_eq!(metrics.this_month_sales, 12.0);
    assert_eq!(metrics.this_month_sales_change, 140.0);
    assert_eq!(metrics.total_sales_ytd, 17.0);
    assert_eq!(metrics.total_sales_ytd_change, -15.0);
    assert_eq!(metrics.sales_change_overall, -3.0);
    assert_eq!(metrics.sales_change_overall_percent, -15.0);
    Ok(())
}

#[tokio::test]
async fn empty_database_reports_zeroes() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let now = at(2025, 3, 15, 18);

    let metrics = sales_service::metrics_at(&state.pool, now).await?;
    assert_eq!(metrics.today_sales, 0.0);
    assert_eq!(metrics.today_sales_change, 0.0);
    assert_eq!(metrics.total_sales_ytd_change, 0.0);

    let trend = sales_service::daily_trend_at(&state.pool, now).await?;
    assert_eq!(trend.len(), 7);
    assert!(trend.iter().all(|point| point.sales == 0.0));

    assert!(sales_service::user_report_at(&state.pool, now).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn daily_trend_covers_the_last_week() -> anyhow::Result<()> {
    let state = setup_state().await?;
    ledger(&state).await?;

    let trend = sales_service::daily_trend_at(&state.pool, at(2025, 3, 15, 18)).await?;
    let names: Vec<_> = trend.iter().map(|point| point.name.as_str()).collect();
    assert_eq!(
        names,
        ["03-09", "03-10", "03-11", "03-12", "03-13", "03-14", "03-15"]
    );
    let sales: Vec<_> = trend.iter().map(|point| point.sales).collect();
    assert_eq!(sales, [0.0, 0.0, 0.0, 0.0, 0.0, 4.0, 8.0]);
    Ok(())
}

#[tokio::test]
async fn monthly_comparison_lines_up_with_last_year() -> anyhow::Result<()> {
    let state = setup_state().await?;
    ledger(&state).await?;

    let months = sales_service::monthly_comparison_at(&state.pool, at(2025, 3, 15, 18)).await?;
    let names: Vec<_> = months.iter().map(|point| point.name.as_str()).collect();
    assert_eq!(names, ["Oct", "Nov", "Dec", "Jan", "Feb", "Mar"]);

    assert_eq!(months[4].current, 5.0);
    assert_eq!(months[4].previous, 0.0);
    assert_eq!(months[5].current, 12.0);
    assert_eq!(months[5].previous, 20.0);
    assert!(months[..4].iter().all(|point| point.current == 0.0));
    Ok(())
}

#[tokio::test]
async fn user_report_credits_cashiers_and_waiters() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let ids = ledger(&state).await?;

    let report = sales_service::user_report_at(&state.pool, at(2025, 3, 15, 18)).await?;
    assert_eq!(report.len(), 2);

    let cashier = &report[0];
    assert_eq!(cashier.id, ids.cashier);
    assert_eq!(cashier.role, Role::Cashier);
    assert_eq!(cashier.total_sales, 37.0);
    assert_eq!(cashier.orders, 4);
    assert_eq!(cashier.change, 140.0);

    let waiter = &report[1];
    assert_eq!(waiter.id, ids.waiter);
    assert_eq!(waiter.total_sales, 4.0);
    assert_eq!(waiter.orders, 1);
    assert_eq!(waiter.change, 100.0);
    Ok(())
}

#[tokio::test]
async fn reports_are_for_managers() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let cashier = staff(&state, "cashier", Role::Cashier).await?;
    let manager = staff(&state, "manager", Role::Manager).await?;

    let denied = sales_service::sales_metrics(&state, &cashier).await;
    assert!(matches!(denied, Err(AppError::Forbidden)));
    let denied = sales_service::user_report(&state, &cashier).await;
    assert!(matches!(denied, Err(AppError::Forbidden)));

    let trend = sales_service::daily_trend(&state, &manager)
        .await?
        .data
        .expect("trend");
    assert_eq!(trend.items.len(), 7);
    Ok(())
}
