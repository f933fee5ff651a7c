use anyhow::Result;
use sea_orm::{DatabaseConnection, SqlxSqliteConnector};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::{str::FromStr, time::Duration};

pub type DbPool = sqlx::SqlitePool;
pub type OrmConn = DatabaseConnection;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Columns added after the first schema shipped. Older database files get
/// them through `ALTER TABLE` on startup.
const LEGACY_COLUMNS: &[(&str, &str, &str)] = &[
    ("products", "description", "TEXT"),
    ("users", "email", "TEXT"),
    ("users", "full_name", "TEXT"),
];

/// Open the SQLite pool. The file is created when missing.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool> {
    let in_memory = is_in_memory(database_url);
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let options = if in_memory {
        options
    } else {
        options.journal_mode(SqliteJournalMode::Wal)
    };

    // Every in-memory connection is its own database, so the pool must never
    // open a second one or recycle the first.
    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(Duration::from_secs(30))
    };

    let pool = pool_options.connect_with(options).await?;
    tracing::info!(in_memory, "database pool created");
    Ok(pool)
}

/// Create a SeaORM connection sharing the sqlx pool.
pub fn create_orm_conn(pool: &DbPool) -> OrmConn {
    SqlxSqliteConnector::from_sqlx_sqlite_pool(pool.clone())
}

/// Apply embedded migrations, then add any columns a legacy file is missing.
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    MIGRATOR.run(pool).await?;

    for (table, column, sql_type) in LEGACY_COLUMNS {
        ensure_column(pool, table, column, sql_type).await?;
    }

    Ok(())
}

async fn ensure_column(pool: &DbPool, table: &str, column: &str, sql_type: &str) -> Result<()> {
    let (present,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM pragma_table_info(?) WHERE name = ?")
            .bind(table)
            .bind(column)
            .fetch_one(pool)
            .await?;

    if present == 0 {
        // Identifiers come from LEGACY_COLUMNS only.
        sqlx::query(&format!("ALTER TABLE {table} ADD COLUMN {column} {sql_type}"))
            .execute(pool)
            .await?;
        tracing::info!(table, column, "added missing column");
    }

    Ok(())
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_in_memory_urls() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://file?mode=memory&cache=shared"));
        assert!(!is_in_memory("sqlite://pos_system.db"));
    }

    #[tokio::test]
    async fn migrations_are_idempotent() -> Result<()> {
        let pool = create_pool("sqlite::memory:", 1).await?;
        run_migrations(&pool).await?;
        run_migrations(&pool).await?;

        let (tables,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN \
             ('products','categories','users','floors','tables','orders','order_items','audit_logs')",
        )
        .fetch_one(&pool)
        .await?;
        assert_eq!(tables, 8);
        Ok(())
    }

    #[tokio::test]
    async fn legacy_products_table_gains_description() -> Result<()> {
        let pool = create_pool("sqlite::memory:", 1).await?;
        sqlx::query(
            "CREATE TABLE products (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL UNIQUE, \
             price REAL NOT NULL, stock_quantity INTEGER NOT NULL, category TEXT)",
        )
        .execute(&pool)
        .await?;

        run_migrations(&pool).await?;

        let (present,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM pragma_table_info('products') WHERE name = 'description'",
        )
        .fetch_one(&pool)
        .await?;
        assert_eq!(present, 1);
        Ok(())
    }
}
