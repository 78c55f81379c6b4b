//! Credential store queries over the `users` table.

use sqlx::PgPool;

use super::AuthError;
use crate::models::auth::{NewUser, ProfileUpdate, UserRow};

const USER_COLUMNS: &str = "id, name, email, password_hash, address, cpf, photo, \
                            is_active, email_confirmed, email_token, created_at";

/// Fetch a user by e-mail.
pub async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRow>, AuthError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Fetch a user by id.
pub async fn get_user_by_id(pool: &PgPool, user_id: i64) -> Result<Option<UserRow>, AuthError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Check whether an e-mail is already registered.
pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, AuthError> {
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(pool)
            .await?;
    Ok(exists)
}

/// Insert an inactive, unconfirmed user.
///
/// A concurrent registration that wins the unique index race surfaces as a
/// validation error, same as the up-front duplicate check.
pub async fn create_user(pool: &PgPool, user: &NewUser) -> Result<UserRow, AuthError> {
    let result = sqlx::query_as::<_, UserRow>(&format!(
        "INSERT INTO users (name, email, password_hash, address, cpf, photo, \
                            is_active, email_confirmed, email_token) \
         VALUES ($1, $2, $3, $4, $5, $6, FALSE, FALSE, $7) \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.address)
    .bind(&user.cpf)
    .bind(&user.photo)
    .bind(&user.email_token_hash)
    .fetch_one(pool)
    .await;

    match result {
        Ok(row) => Ok(row),
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(
            AuthError::ValidationError("E-mail already registered".into()),
        ),
        Err(e) => Err(e.into()),
    }
}

/// Redeem a confirmation token: activate the account and clear the token.
///
/// Returns the confirmed user's id, or `None` when no pending token matches
/// (unknown or already consumed). Single statement, so two concurrent
/// redemptions cannot both succeed.
pub async fn confirm_email(pool: &PgPool, token_hash: &str) -> Result<Option<i64>, AuthError> {
    let id = sqlx::query_scalar::<_, i64>(
        "UPDATE users \
         SET email_confirmed = TRUE, is_active = TRUE, email_token = NULL \
         WHERE email_token = $1 \
         RETURNING id",
    )
    .bind(token_hash)
    .fetch_optional(pool)
    .await?;
    Ok(id)
}

/// Apply a partial profile update, returning the updated row.
pub async fn update_profile(
    pool: &PgPool,
    user_id: i64,
    update: &ProfileUpdate,
) -> Result<Option<UserRow>, AuthError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "UPDATE users SET \
            name = COALESCE($2, name), \
            address = COALESCE($3, address), \
            cpf = COALESCE($4, cpf), \
            photo = COALESCE($5, photo) \
         WHERE id = $1 \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(user_id)
    .bind(update.name.as_deref())
    .bind(update.address.as_deref())
    .bind(update.cpf.as_deref())
    .bind(update.photo.as_deref())
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Activate or deactivate an account.
pub async fn set_active(pool: &PgPool, user_id: i64, active: bool) -> Result<(), AuthError> {
    sqlx::query("UPDATE users SET is_active = $2 WHERE id = $1")
        .bind(user_id)
        .bind(active)
        .execute(pool)
        .await?;
    Ok(())
}
