mod common;

use common::{floor_with_table, line, order, product, setup_state, staff};
use restaurant_pos_api::{
    dto::{
        catalog::{CategoryRequest, LowStockQuery, ProductQuery, ProductRequest},
        floor_plan::{CreateTableRequest, FloorRequest, StatusRequest, UpdateTableRequest},
    },
    error::AppError,
    models::{Role, TableStatus},
    services::{category_service, floor_service, order_service, product_service, table_service},
};

fn product_body(name: &str, price: f64, stock: i64, category: &str) -> ProductRequest {
    ProductRequest {
        name: Some(name.into()),
        description: None,
        price: Some(price),
        stock_quantity: Some(stock),
        category: Some(category.into()),
    }
}

#[tokio::test]
async fn manager_maintains_products() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let manager = staff(&state, "manager", Role::Manager).await?;

    let latte = product_service::create_product(
        &state,
        &manager,
        product_body("Latte", 4.0, 80, "Beverages"),
    )
    .await?
    .data
    .expect("product");
    assert_eq!(latte.description.as_deref(), Some(""));

    product_service::create_product(&state, &manager, product_body("Croissant", 2.75, 3, "Food"))
        .await?;

    let duplicate = product_service::create_product(
        &state,
        &manager,
        product_body("Latte", 5.0, 1, "Beverages"),
    )
    .await;
    match duplicate {
        Err(AppError::Conflict(message)) => {
            assert_eq!(message, "Product with name \"Latte\" already exists.")
        }
        other => panic!("expected conflict, got {other:?}"),
    }

    let drinks = product_service::list_products(
        &state,
        ProductQuery {
            category: Some("Beverages".into()),
        },
    )
    .await?
    .data
    .expect("products");
    assert_eq!(drinks.items.len(), 1);
    assert_eq!(drinks.items[0].name, "Latte");

    let low = product_service::list_low_stock(&state, &manager, LowStockQuery { threshold: None })
        .await?
        .data
        .expect("low stock");
    assert_eq!(low.items.len(), 1);
    assert_eq!(low.items[0].name, "Croissant");

    let updated = product_service::update_product(
        &state,
        &manager,
        latte.id,
        product_body("Flat White", 4.5, 60, "Beverages"),
    )
    .await?
    .data
    .expect("product");
    assert_eq!(updated.name, "Flat White");
    assert_eq!(updated.stock_quantity, 60);

    let deleted = product_service::delete_product(&state, &manager, latte.id)
        .await?
        .data
        .expect("ack");
    assert_eq!(deleted.deleted_id, latte.id);

    let gone = product_service::get_product(&state, latte.id).await;
    assert!(matches!(gone, Err(AppError::NotFound(_))));
    let gone = product_service::delete_product(&state, &manager, latte.id).await;
    assert!(matches!(gone, Err(AppError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn catalog_writes_need_a_manager() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let waiter = staff(&state, "waiter", Role::Waiter).await?;

    let result =
        product_service::create_product(&state, &waiter, product_body("Latte", 4.0, 1, "Food"))
            .await;
    assert!(matches!(result, Err(AppError::Forbidden)));

    let result = category_service::create_category(
        &state,
        &waiter,
        CategoryRequest {
            name: Some("Food".into()),
            description: None,
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::Forbidden)));
    Ok(())
}

#[tokio::test]
async fn sold_product_cannot_be_deleted() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let manager = staff(&state, "manager", Role::Manager).await?;
    let latte = product(&state, "Latte", 4.0, 10).await?;
    order_service::create_order(&state, &manager, order(vec![line(latte, 1)], "completed"))
        .await?;

    let result = product_service::delete_product(&state, &manager, latte).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
    assert!(product_service::get_product(&state, latte).await.is_ok());
    Ok(())
}

#[tokio::test]
async fn categories_are_unique_and_sorted() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let manager = staff(&state, "manager", Role::Manager).await?;

    for name in ["Snacks", "Beverages"] {
        category_service::create_category(
            &state,
            &manager,
            CategoryRequest {
                name: Some(name.into()),
                description: None,
            },
        )
        .await?;
    }

    let blank = category_service::create_category(
        &state,
        &manager,
        CategoryRequest {
            name: Some("   ".into()),
            description: None,
        },
    )
    .await;
    assert!(matches!(blank, Err(AppError::BadRequest(_))));

    let duplicate = category_service::create_category(
        &state,
        &manager,
        CategoryRequest {
            name: Some("Snacks".into()),
            description: None,
        },
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    let list = category_service::list_categories(&state)
        .await?
        .data
        .expect("categories");
    let names: Vec<_> = list.items.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Beverages", "Snacks"]);

    let renamed = category_service::update_category(
        &state,
        &manager,
        list.items[0].id,
        CategoryRequest {
            name: Some("Drinks".into()),
            description: Some("Hot and cold".into()),
        },
    )
    .await?
    .data
    .expect("category");
    assert_eq!(renamed.name, "Drinks");
    assert_eq!(renamed.description.as_deref(), Some("Hot and cold"));

    category_service::delete_category(&state, &manager, renamed.id).await?;
    let missing = category_service::delete_category(&state, &manager, renamed.id).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn floor_plan_lifecycle() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let manager = staff(&state, "manager", Role::Manager).await?;
    let chef = staff(&state, "chef", Role::Chef).await?;

    let ground = floor_service::create_floor(
        &state,
        &manager,
        FloorRequest {
            name: Some("Ground Floor".into()),
        },
    )
    .await?
    .data
    .expect("floor");

    let duplicate = floor_service::create_floor(
        &state,
        &manager,
        FloorRequest {
            name: Some("Ground Floor".into()),
        },
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    let table = table_service::create_table(
        &state,
        &manager,
        CreateTableRequest {
            name: Some("Table 1".into()),
            floor_id: Some(ground.id),
        },
    )
    .await?
    .data
    .expect("table");
    assert_eq!(table.floor_name, "Ground Floor");
    assert_eq!(table.status, TableStatus::Available);

    let orphan = table_service::create_table(
        &state,
        &manager,
        CreateTableRequest {
            name: Some("Table 9".into()),
            floor_id: Some(999),
        },
    )
    .await;
    assert!(matches!(orphan, Err(AppError::BadRequest(_))));

    let flipped = table_service::set_table_status(
        &state,
        &chef,
        table.id,
        StatusRequest {
            status: Some("occupied".into()),
        },
    )
    .await?
    .data
    .expect("table");
    assert_eq!(flipped.status, TableStatus::Occupied);

    let bad_status = table_service::set_table_status(
        &state,
        &chef,
        table.id,
        StatusRequest {
            status: Some("reserved".into()),
        },
    )
    .await;
    assert!(matches!(bad_status, Err(AppError::BadRequest(_))));

    let updated = table_service::update_table(
        &state,
        &manager,
        table.id,
        UpdateTableRequest {
            name: Some("Window Table".into()),
            floor_id: Some(ground.id),
            status: Some("available".into()),
        },
    )
    .await?
    .data
    .expect("table");
    assert_eq!(updated.name, "Window Table");
    assert_eq!(updated.status, TableStatus::Available);

    let tables = table_service::list_tables(&state).await?.data.expect("tables");
    assert_eq!(tables.items.len(), 1);

    floor_service::delete_floor(&state, &manager, ground.id).await?;
    let tables = table_service::list_tables(&state).await?.data.expect("tables");
    assert!(tables.items.is_empty());
    Ok(())
}

#[tokio::test]
async fn table_with_orders_is_kept() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let manager = staff(&state, "manager", Role::Manager).await?;
    let latte = product(&state, "Latte", 4.0, 10).await?;
    let (_, table_id) = floor_with_table(&state, "Ground Floor", "Table 1").await?;

    let mut request = order(vec![line(latte, 1)], "pending");
    request.table_id = Some(table_id);
    order_service::create_order(&state, &manager, request).await?;

    match table_service::delete_table(&state, &manager, table_id).await {
        Err(AppError::Conflict(message)) => {
            assert_eq!(message, "Cannot delete table. There are 1 associated orders.")
        }
        other => panic!("expected conflict, got {other:?}"),
    }
    assert!(table_service::get_table(&state, table_id).await.is_ok());

    let missing = table_service::delete_table(&state, &manager, 999).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
    Ok(())
}
