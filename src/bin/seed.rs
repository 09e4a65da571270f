use sqlx::PgPool;
use uuid::Uuid;

use storefront_db::{
    config::AppConfig,
    db::{create_pool, run_migrations},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = AppConfig::from_env()?;
    let pool = create_pool(&config).await?;
    run_migrations(&pool).await?;

    let electronics = ensure_category(&pool, "Electronics").await?;
    let apparel = ensure_category(&pool, "Apparel").await?;

    seed_product(&pool, "Mechanical Keyboard", "Tenkeyless, hot-swappable", 899_00, 40, "KeyWorks", Some(electronics)).await?;
    seed_product(&pool, "USB-C Dock", "Dual display, 100W passthrough", 1299_00, 25, "Portify", Some(electronics)).await?;
    seed_product(&pool, "Logo Hoodie", "Heavyweight cotton hoodie", 549_00, 80, "Stitchcraft", Some(apparel)).await?;
    seed_product(&pool, "Sticker Pack", "Assorted vinyl stickers", 49_00, 500, "Stitchcraft", None).await?;

    tracing::info!("seed completed");
    Ok(())
}

async fn ensure_category(pool: &PgPool, name: &str) -> anyhow::Result<Uuid> {
    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM categories WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    if let Some((id,)) = existing {
        return Ok(id);
    }

    let (id,): (Uuid,) =
        sqlx::query_as("INSERT INTO categories (name) VALUES ($1) RETURNING id")
            .bind(name)
            .fetch_one(pool)
            .await?;
    tracing::info!(name, "seeded category");
    Ok(id)
}

async fn seed_product(
    pool: &PgPool,
    name: &str,
    description: &str,
    price: i64,
    stock: i32,
    manufacturer: &str,
    category_id: Option<Uuid>,
) -> anyhow::Result<()> {
    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    if existing.is_some() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO products (name, description, price, stock, manufacturer, category_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(name)
    .bind(description)
    .bind(price)
    .bind(stock)
    .bind(manufacturer)
    .bind(category_id)
    .execute(pool)
    .await?;

    tracing::info!(name, "seeded product");
    Ok(())
}
