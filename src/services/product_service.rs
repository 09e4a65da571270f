use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::{StoreError, StoreResult},
    models::{Product, ProductWithCategory},
    query::{Pagination, ProductFilter},
};

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub stock: i32,
    pub manufacturer: Option<String>,
    pub category_id: Option<Uuid>,
}

const PRODUCT_WITH_CATEGORY: &str = r#"
    SELECT p.id, p.name, p.description, p.price, p.stock, p.manufacturer,
           p.category_id, p.created_at, c.name AS category_name
    FROM products p
    LEFT JOIN categories c ON c.id = p.category_id
"#;

pub async fn list_products(
    pool: &DbPool,
    pagination: &Pagination,
) -> StoreResult<Vec<ProductWithCategory>> {
    let (_, limit, offset) = pagination.normalize();
    let sql = format!("{PRODUCT_WITH_CATEGORY} ORDER BY p.name LIMIT $1 OFFSET $2");
    let products = sqlx::query_as::<_, ProductWithCategory>(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
    Ok(products)
}

pub async fn get_product(pool: &DbPool, product_id: Uuid) -> StoreResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_optional(pool)
        .await?;

    if product.is_none() {
        tracing::debug!(%product_id, "product not found");
    }
    Ok(product)
}

pub async fn add_product(pool: &DbPool, new: &NewProduct) -> StoreResult<Product> {
    let product = sqlx::query_as::<_, Product>(
        r#"
        INSERT INTO products (name, description, price, stock, manufacturer, category_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(&new.name)
    .bind(&new.description)
    .bind(new.price)
    .bind(new.stock)
    .bind(&new.manufacturer)
    .bind(new.category_id)
    .fetch_one(pool)
    .await?;

    Ok(product)
}

pub async fn update_product(
    pool: &DbPool,
    product_id: Uuid,
    new: &NewProduct,
) -> StoreResult<Product> {
    let product = sqlx::query_as::<_, Product>(
        r#"
        UPDATE products
        SET name = $1, description = $2, price = $3, stock = $4,
            manufacturer = $5, category_id = $6
        WHERE id = $7
        RETURNING *
        "#,
    )
    .bind(&new.name)
    .bind(&new.description)
    .bind(new.price)
    .bind(new.stock)
    .bind(&new.manufacturer)
    .bind(new.category_id)
    .bind(product_id)
    .fetch_optional(pool)
    .await?;

    product.ok_or(StoreError::NotFound)
}

pub async fn delete_product(pool: &DbPool, product_id: Uuid) -> StoreResult<()> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(product_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(())
}

/// Search the catalog by name/description text, category, and manufacturer.
pub async fn search_products(
    pool: &DbPool,
    filter: &ProductFilter,
) -> StoreResult<Vec<ProductWithCategory>> {
    let mut builder =
        QueryBuilder::<Postgres>::new(format!("{PRODUCT_WITH_CATEGORY} WHERE TRUE"));
    filter.apply(&mut builder);
    builder.push(" ORDER BY p.name");

    let products = builder
        .build_query_as::<ProductWithCategory>()
        .fetch_all(pool)
        .await?;
    Ok(products)
}

pub async fn list_manufacturers(pool: &DbPool) -> StoreResult<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        r#"
        SELECT DISTINCT manufacturer
        FROM products
        WHERE manufacturer IS NOT NULL AND manufacturer != ''
        ORDER BY manufacturer
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|(name,)| name).collect())
}
