use anyhow::Result;
use sqlx::SqliteConnection;

use crate::{db::DbPool, models::Role, services::auth_service::hash_pin};

pub const DEFAULT_PIN: &str = "12345";

const CATEGORIES: &[(&str, &str)] = &[
    ("Beverages", "All types of drinks including coffee, tea, and juices."),
    ("Food", "Savory items like sandwiches and pastries."),
    ("Desserts", "Sweet treats and baked goods."),
    ("Snacks", "Light bites and quick eats."),
];

const PRODUCTS: &[(&str, f64, i64, &str, &str)] = &[
    ("Espresso", 3.50, 100, "Beverages", "Rich and intense espresso shot."),
    ("Latte", 4.00, 80, "Beverages", "Smooth latte with steamed milk."),
    ("Cappuccino", 4.25, 75, "Beverages", "Classic cappuccino with foamed milk."),
    ("Croissant", 2.75, 50, "Food", "Flaky, buttery pastry."),
    ("Blueberry Muffin", 3.20, 40, "Food", "Sweet muffin with real blueberries."),
    ("Cheesecake", 5.50, 30, "Desserts", "Creamy New York style cheesecake."),
    ("Sandwich", 7.80, 25, "Food", "Assorted fresh deli sandwich."),
    ("Orange Juice", 3.00, 60, "Beverages", "Freshly squeezed orange juice."),
    ("Chocolate Chip Cookie", 2.00, 70, "Snacks", "Classic chocolate chip cookie."),
    ("Brownie", 4.10, 35, "Desserts", "Fudgy chocolate brownie."),
];

const FLOORS: &[&str] = &["Ground Floor", "First Floor"];

const TABLES: &[(&str, &str)] = &[
    ("Ground Floor", "Table 1"),
    ("Ground Floor", "Table 2"),
    ("First Floor", "Table 3"),
    ("First Floor", "Table 4"),
];

const USERS: &[(&str, Role, &str, &str)] = &[
    ("admin", Role::Admin, "admin@example.com", "Admin User"),
    ("manager", Role::Manager, "manager@example.com", "Manager User"),
    ("cashier", Role::Cashier, "cashier@example.com", "Cashier User"),
    ("waiter", Role::Waiter, "waiter@example.com", "Waiter User"),
    ("chef", Role::Chef, "chef@example.com", "Chef User"),
];

/// Rows inserted per table; zero means the table already had data.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub categories: usize,
    pub products: usize,
    pub floors: usize,
    pub tables: usize,
    pub users: usize,
}

async fn is_empty(conn: &mut SqliteConnection, table: &str) -> Result<bool> {
    // Table names come from this module only.
    let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(conn)
        .await?;
    Ok(count == 0)
}

/// Insert the starter catalog, floor plan and one account per staff role.
/// Tables that already hold rows are left alone.
pub async fn seed_defaults(pool: &DbPool) -> Result<SeedReport> {
    let mut report = SeedReport::default();
    let mut tx = pool.begin().await?;

    if is_empty(&mut tx, "categories").await? {
        for (name, description) in CATEGORIES {
            sqlx::query("INSERT INTO categories (name, description) VALUES (?, ?)")
                .bind(name)
                .bind(description)
                .execute(&mut *tx)
                .await?;
        }
        report.categories = CATEGORIES.len();
    }

    if is_empty(&mut tx, "products").await? {
        for (name, price, stock, category, description) in PRODUCTS {
            sqlx::query(
                r#"
                INSERT INTO products (name, price, stock_quantity, category, description)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(name)
            .bind(price)
            .bind(stock)
            .bind(category)
            .bind(description)
            .execute(&mut *tx)
            .await?;
        }
        report.products = PRODUCTS.len();
    }

    if is_empty(&mut tx, "floors").await? {
        for name in FLOORS {
            sqlx::query("INSERT INTO floors (name) VALUES (?)")
                .bind(name)
                .execute(&mut *tx)
                .await?;
        }
        report.floors = FLOORS.len();
    }

    if is_empty(&mut tx, "tables").await? {
        for (floor, name) in TABLES {
            sqlx::query(
                r#"
                INSERT INTO tables (floor_id, name, status)
                SELECT id, ?, 'available' FROM floors WHERE name = ?
                "#,
            )
            .bind(name)
            .bind(floor)
            .execute(&mut *tx)
            .await?;
        }
        report.tables = TABLES.len();
    }

    if is_empty(&mut tx, "users").await? {
        for (username, role, email, full_name) in USERS {
            sqlx::query(
                r#"
                INSERT INTO users (username, password, role, email, full_name)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(username)
            .bind(hash_pin(DEFAULT_PIN)?)
            .bind(role.as_str())
            .bind(email)
            .bind(full_name)
            .execute(&mut *tx)
            .await?;
        }
        report.users = USERS.len();
    }

    tx.commit().await?;
    tracing::info!(?report, "default data seeded");
    Ok(report)
}
