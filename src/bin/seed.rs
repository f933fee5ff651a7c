use restaurant_pos_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    seed::{DEFAULT_PIN, seed_defaults},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, config.db_max_connections).await?;
    // Ensure migrations are applied.
    run_migrations(&pool).await?;

    let report = seed_defaults(&pool).await?;
    println!(
        "Seed completed: {} categories, {} products, {} floors, {} tables, {} users",
        report.categories, report.products, report.floors, report.tables, report.users
    );
    if report.users > 0 {
        println!("Default accounts use PIN {DEFAULT_PIN}");
    }
    Ok(())
}
