use uuid::Uuid;

use crate::{
    db::DbPool,
    error::StoreResult,
    models::{User, UserProfile},
};

/// Create a user and grant the default `User` role in one transaction.
/// The password hash is computed by the caller; this layer stores it opaquely.
pub async fn create_user(
    pool: &DbPool,
    username: &str,
    password_hash: &str,
    email: &str,
) -> StoreResult<Uuid> {
    let mut txn = pool.begin().await?;

    let user_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO users (id, username, password_hash, email) VALUES ($1, $2, $3, $4)",
    )
    .bind(user_id)
    .bind(username)
    .bind(password_hash)
    .bind(email)
    .execute(&mut *txn)
    .await?;

    let role_id: Option<(i32,)> = sqlx::query_as("SELECT id FROM roles WHERE name = $1")
        .bind("User")
        .fetch_optional(&mut *txn)
        .await?;
    let Some((role_id,)) = role_id else {
        return Err(anyhow::anyhow!("default role 'User' is not seeded").into());
    };

    sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)")
        .bind(user_id)
        .bind(role_id)
        .execute(&mut *txn)
        .await?;

    txn.commit().await?;
    Ok(user_id)
}

pub async fn get_user_by_id(pool: &DbPool, user_id: Uuid) -> StoreResult<Option<UserProfile>> {
    let user = sqlx::query_as::<_, UserProfile>(
        "SELECT username, email FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    if user.is_none() {
        tracing::debug!(%user_id, "user not found");
    }
    Ok(user)
}

/// Full row including the password hash, for login flows.
pub async fn get_user_by_email(pool: &DbPool, email: &str) -> StoreResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn get_user_roles(pool: &DbPool, user_id: Uuid) -> StoreResult<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        r#"
        SELECT r.name
        FROM user_roles ur
        JOIN roles r ON r.id = ur.role_id
        WHERE ur.user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|(name,)| name).collect())
}

pub async fn get_role_id_by_name(pool: &DbPool, role_name: &str) -> StoreResult<Option<i32>> {
    let role: Option<(i32,)> = sqlx::query_as("SELECT id FROM roles WHERE name = $1")
        .bind(role_name)
        .fetch_optional(pool)
        .await?;

    if role.is_none() {
        tracing::error!(role_name, "role not found");
    }
    Ok(role.map(|(id,)| id))
}
