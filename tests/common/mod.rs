use uuid::Uuid;

use storefront_db::{
    config::AppConfig,
    db::{DbPool, create_pool, run_migrations},
    models::Product,
    services::{product_service, product_service::NewProduct, user_service},
};

/// Connect to the test database, or return None so the caller can skip when no
/// database is configured in the environment.
pub async fn test_pool() -> anyhow::Result<Option<DbPool>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests."
            );
            return Ok(None);
        }
    };

    let config = AppConfig {
        database_url,
        max_connections: 5,
        acquire_timeout_secs: 5,
    };
    let pool = create_pool(&config).await?;
    run_migrations(&pool).await?;
    Ok(Some(pool))
}

/// Each test works against its own user and products so tests can run
/// concurrently against a shared database.
pub async fn create_test_user(pool: &DbPool) -> anyhow::Result<Uuid> {
    let suffix = Uuid::new_v4().simple().to_string();
    let user_id = user_service::create_user(
        pool,
        &format!("tester-{suffix}"),
        "not-a-real-hash",
        &format!("tester-{suffix}@example.com"),
    )
    .await?;
    Ok(user_id)
}

pub async fn create_test_product(
    pool: &DbPool,
    price: i64,
    stock: i32,
) -> anyhow::Result<Product> {
    let product = product_service::add_product(
        pool,
        &NewProduct {
            name: format!("Test Widget {}", Uuid::new_v4().simple()),
            description: Some("integration test product".into()),
            price,
            stock,
            manufacturer: Some("TestCo".into()),
            category_id: None,
        },
    )
    .await?;
    Ok(product)
}
