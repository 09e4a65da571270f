use uuid::Uuid;

use crate::{
    db::DbPool,
    error::{StoreError, StoreResult},
    models::Category,
};

pub async fn list_categories(pool: &DbPool) -> StoreResult<Vec<Category>> {
    let categories =
        sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY name")
            .fetch_all(pool)
            .await?;
    Ok(categories)
}

pub async fn add_category(pool: &DbPool, name: &str) -> StoreResult<Category> {
    let category =
        sqlx::query_as::<_, Category>("INSERT INTO categories (name) VALUES ($1) RETURNING *")
            .bind(name)
            .fetch_one(pool)
            .await?;
    Ok(category)
}

pub async fn update_category(pool: &DbPool, category_id: Uuid, name: &str) -> StoreResult<Category> {
    let category = sqlx::query_as::<_, Category>(
        "UPDATE categories SET name = $1 WHERE id = $2 RETURNING *",
    )
    .bind(name)
    .bind(category_id)
    .fetch_optional(pool)
    .await?;

    category.ok_or(StoreError::NotFound)
}

/// Products referencing the category keep their rows; the foreign key is set
/// to NULL by the schema.
pub async fn delete_category(pool: &DbPool, category_id: Uuid) -> StoreResult<()> {
    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(category_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(())
}
