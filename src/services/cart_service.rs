use std::collections::HashMap;

use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::{StoreError, StoreResult},
    models::CartItem,
};

/// Cart row joined with the current product data, as shown to the user.
#[derive(Debug, Clone, FromRow)]
pub struct CartLine {
    pub product_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub stock: i32,
    pub quantity: i32,
    pub line_total: i64,
}

pub async fn get_cart_items(pool: &DbPool, user_id: Uuid) -> StoreResult<Vec<CartLine>> {
    let lines = sqlx::query_as::<_, CartLine>(
        r#"
        SELECT c.product_id, p.name, p.description, p.price, p.stock, c.quantity,
               (p.price * c.quantity) AS line_total
        FROM cart_items c
        JOIN products p ON p.id = c.product_id
        WHERE c.user_id = $1
        ORDER BY p.name
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(lines)
}

/// Add `quantity` of a product to the user's cart, incrementing the existing
/// row if one exists. Stock is not checked here; checkout validates it.
pub async fn add_to_cart(
    pool: &DbPool,
    user_id: Uuid,
    product_id: Uuid,
    quantity: i32,
) -> StoreResult<CartItem> {
    if quantity <= 0 {
        return Err(StoreError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let item = sqlx::query_as::<_, CartItem>(
        r#"
        INSERT INTO cart_items (user_id, product_id, quantity)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, product_id)
        DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(product_id)
    .bind(quantity)
    .fetch_one(pool)
    .await?;

    Ok(item)
}

/// Idempotent delete; removing an absent item is not an error.
pub async fn remove_from_cart(pool: &DbPool, user_id: Uuid, product_id: Uuid) -> StoreResult<()> {
    let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
        .bind(user_id)
        .bind(product_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        tracing::debug!(%user_id, %product_id, "remove_from_cart: item was not in cart");
    }

    Ok(())
}

/// Apply a batch of quantity changes as one transaction. A quantity of zero or
/// less deletes the row; otherwise the new quantity is checked against current
/// stock and the whole batch aborts with `InsufficientStock` if it exceeds it.
/// Either every entry applies or none do.
pub async fn update_cart_quantities(
    pool: &DbPool,
    user_id: Uuid,
    quantities: &HashMap<Uuid, i32>,
) -> StoreResult<()> {
    let mut txn = pool.begin().await?;

    // Sorted iteration keeps row-lock acquisition order consistent across
    // concurrent batches.
    let mut entries: Vec<(Uuid, i32)> = quantities.iter().map(|(&p, &q)| (p, q)).collect();
    entries.sort_by_key(|&(product_id, _)| product_id);

    for (product_id, quantity) in entries {
        if quantity <= 0 {
            sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
                .bind(user_id)
                .bind(product_id)
                .execute(&mut *txn)
                .await?;
            continue;
        }

        let stock: Option<(i32,)> =
            sqlx::query_as("SELECT stock FROM products WHERE id = $1 FOR UPDATE")
                .bind(product_id)
                .fetch_optional(&mut *txn)
                .await?;
        let Some((stock,)) = stock else {
            return Err(StoreError::NotFound);
        };
        if quantity > stock {
            // Dropping the transaction rolls back everything applied so far.
            return Err(StoreError::InsufficientStock(product_id));
        }

        sqlx::query("UPDATE cart_items SET quantity = $1 WHERE user_id = $2 AND product_id = $3")
            .bind(quantity)
            .bind(user_id)
            .bind(product_id)
            .execute(&mut *txn)
            .await?;
    }

    txn.commit().await?;
    Ok(())
}
