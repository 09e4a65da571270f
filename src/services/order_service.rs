use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::{StoreError, StoreResult},
    models::{Order, OrderHistoryEntry, OrderItem, OrderStatus},
    query::Pagination,
};

#[derive(Debug, FromRow)]
struct CartPricingRow {
    product_id: Uuid,
    quantity: i32,
    price: i64,
    stock: i32,
}

/// A user's past order with the names of the products it contained.
#[derive(Debug, Clone, FromRow)]
pub struct OrderSummary {
    pub order_id: Uuid,
    pub order_date: DateTime<Utc>,
    pub total_cost: i64,
    pub products: Vec<String>,
}

/// Admin listing row: order joined with the buyer's username.
#[derive(Debug, Clone, FromRow)]
pub struct OrderWithUser {
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub total_cost: i64,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
}

/// Convert the user's cart into a persisted order, atomically.
///
/// Inside one transaction: load the cart joined with current price and stock
/// (locking the product rows), validate every line against stock, insert the
/// order with the computed total, snapshot each line into `order_items` while
/// decrementing stock, append the initial `Pending` history entry, and clear
/// the cart. Any failure rolls back every write.
pub async fn process_order(pool: &DbPool, user_id: Uuid) -> StoreResult<Order> {
    let mut txn = pool.begin().await?;

    let lines: Vec<CartPricingRow> = sqlx::query_as(
        r#"
        SELECT c.product_id, c.quantity, p.price, p.stock
        FROM cart_items c
        JOIN products p ON p.id = c.product_id
        WHERE c.user_id = $1
        FOR UPDATE OF p
        "#,
    )
    .bind(user_id)
    .fetch_all(&mut *txn)
    .await?;

    if lines.is_empty() {
        return Err(StoreError::EmptyCart);
    }

    let mut total_cost: i64 = 0;
    for line in &lines {
        if line.quantity > line.stock {
            return Err(StoreError::InsufficientStock(line.product_id));
        }
        total_cost += line.price * i64::from(line.quantity);
    }

    let order_id = Uuid::new_v4();
    let order: Order = sqlx::query_as(
        r#"
        INSERT INTO orders (id, user_id, total_cost, order_date, status)
        VALUES ($1, $2, $3, NOW(), $4)
        RETURNING *
        "#,
    )
    .bind(order_id)
    .bind(user_id)
    .bind(total_cost)
    .bind(OrderStatus::Pending)
    .fetch_one(&mut *txn)
    .await?;

    for line in &lines {
        sqlx::query(
            "INSERT INTO order_items (order_id, product_id, quantity, price) VALUES ($1, $2, $3, $4)",
        )
        .bind(order_id)
        .bind(line.product_id)
        .bind(line.quantity)
        .bind(line.price)
        .execute(&mut *txn)
        .await?;

        sqlx::query("UPDATE products SET stock = stock - $1 WHERE id = $2")
            .bind(line.quantity)
            .bind(line.product_id)
            .execute(&mut *txn)
            .await?;
    }

    sqlx::query("INSERT INTO order_history (id, order_id, status, changed_at) VALUES ($1, $2, $3, NOW())")
        .bind(Uuid::new_v4())
        .bind(order_id)
        .bind(OrderStatus::Pending)
        .execute(&mut *txn)
        .await?;

    sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *txn)
        .await?;

    txn.commit().await?;

    tracing::info!(%order_id, %user_id, total_cost, items = lines.len(), "order placed");
    Ok(order)
}

/// Set a new status and append the matching history entry in one transaction,
/// so the status can never change without an audit record.
pub async fn update_order_status(
    pool: &DbPool,
    order_id: Uuid,
    status: OrderStatus,
) -> StoreResult<Order> {
    let mut txn = pool.begin().await?;

    let order: Option<Order> =
        sqlx::query_as("UPDATE orders SET status = $1 WHERE id = $2 RETURNING *")
            .bind(status)
            .bind(order_id)
            .fetch_optional(&mut *txn)
            .await?;
    let Some(order) = order else {
        return Err(StoreError::NotFound);
    };

    sqlx::query("INSERT INTO order_history (id, order_id, status, changed_at) VALUES ($1, $2, $3, NOW())")
        .bind(Uuid::new_v4())
        .bind(order_id)
        .bind(status)
        .execute(&mut *txn)
        .await?;

    txn.commit().await?;

    tracing::info!(%order_id, %status, "order status updated");
    Ok(order)
}

pub async fn get_order(pool: &DbPool, order_id: Uuid) -> StoreResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(order_id)
        .fetch_optional(pool)
        .await?;

    if order.is_none() {
        tracing::debug!(%order_id, "order not found");
    }
    Ok(order)
}

pub async fn get_order_items(pool: &DbPool, order_id: Uuid) -> StoreResult<Vec<OrderItem>> {
    let items = sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items WHERE order_id = $1")
        .bind(order_id)
        .fetch_all(pool)
        .await?;
    Ok(items)
}

/// The last five orders for a user, newest first, with product names.
pub async fn get_last_orders(pool: &DbPool, user_id: Uuid) -> StoreResult<Vec<OrderSummary>> {
    let orders = sqlx::query_as::<_, OrderSummary>(
        r#"
        SELECT o.id AS order_id, o.order_date, o.total_cost,
               ARRAY(
                   SELECT p.name
                   FROM order_items oi
                   JOIN products p ON p.id = oi.product_id
                   WHERE oi.order_id = o.id
               ) AS products
        FROM orders o
        WHERE o.user_id = $1
        ORDER BY o.order_date DESC
        LIMIT 5
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(orders)
}

pub async fn list_orders(pool: &DbPool, pagination: &Pagination) -> StoreResult<Vec<OrderWithUser>> {
    let (_, limit, offset) = pagination.normalize();
    let orders = sqlx::query_as::<_, OrderWithUser>(
        r#"
        SELECT o.id AS order_id, o.user_id, u.username, o.total_cost, o.order_date, o.status
        FROM orders o
        JOIN users u ON u.id = o.user_id
        ORDER BY o.order_date DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(orders)
}

/// Status transitions for an order, oldest first.
pub async fn get_order_history(
    pool: &DbPool,
    order_id: Uuid,
) -> StoreResult<Vec<OrderHistoryEntry>> {
    let entries = sqlx::query_as::<_, OrderHistoryEntry>(
        "SELECT * FROM order_history WHERE order_id = $1 ORDER BY changed_at",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(entries)
}
