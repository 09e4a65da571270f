use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::{StoreError, StoreResult},
    models::Review,
};

#[derive(Debug, Clone, FromRow)]
pub struct ReviewWithAuthor {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub review_date: DateTime<Utc>,
    pub username: String,
}

pub async fn add_review(
    pool: &DbPool,
    product_id: Uuid,
    user_id: Uuid,
    rating: i32,
    comment: Option<&str>,
) -> StoreResult<Review> {
    if !(1..=5).contains(&rating) {
        return Err(StoreError::BadRequest(
            "rating must be between 1 and 5".to_string(),
        ));
    }

    let review = sqlx::query_as::<_, Review>(
        r#"
        INSERT INTO reviews (product_id, user_id, rating, comment)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(product_id)
    .bind(user_id)
    .bind(rating)
    .bind(comment)
    .fetch_one(pool)
    .await?;

    Ok(review)
}

pub async fn list_reviews(pool: &DbPool, product_id: Uuid) -> StoreResult<Vec<ReviewWithAuthor>> {
    let reviews = sqlx::query_as::<_, ReviewWithAuthor>(
        r#"
        SELECT r.id, r.product_id, r.user_id, r.rating, r.comment, r.review_date, u.username
        FROM reviews r
        JOIN users u ON u.id = r.user_id
        WHERE r.product_id = $1
        ORDER BY r.review_date DESC
        "#,
    )
    .bind(product_id)
    .fetch_all(pool)
    .await?;

    Ok(reviews)
}

/// None when the product has no reviews yet.
pub async fn average_rating(pool: &DbPool, product_id: Uuid) -> StoreResult<Option<f64>> {
    let (avg,): (Option<f64>,) =
        sqlx::query_as("SELECT AVG(rating)::float8 FROM reviews WHERE product_id = $1")
            .bind(product_id)
            .fetch_one(pool)
            .await?;
    Ok(avg)
}
