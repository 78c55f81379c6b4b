//! Identity document persistence.
//!
//! `validated` only ever moves from false to true; nothing here resets it.

use sqlx::PgPool;

use crate::models::profile::Document;

const DOCUMENT_COLUMNS: &str = "id, user_id, url, type, validated, created_at";

/// Record an uploaded document. The file must already be on disk.
pub async fn insert_document(
    pool: &PgPool,
    user_id: i64,
    url: &str,
    kind: &str,
) -> Result<Document, sqlx::Error> {
    sqlx::query_as::<_, Document>(&format!(
        "INSERT INTO documents (user_id, url, type, validated) \
         VALUES ($1, $2, $3, FALSE) \
         RETURNING {DOCUMENT_COLUMNS}"
    ))
    .bind(user_id)
    .bind(url)
    .bind(kind)
    .fetch_one(pool)
    .await
}

/// List a user's documents, oldest first.
pub async fn list_documents(pool: &PgPool, user_id: i64) -> Result<Vec<Document>, sqlx::Error> {
    sqlx::query_as::<_, Document>(&format!(
        "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE user_id = $1 ORDER BY id"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Fetch a document only if it belongs to `user_id`.
pub async fn find_user_document(
    pool: &PgPool,
    user_id: i64,
    document_id: i64,
) -> Result<Option<Document>, sqlx::Error> {
    sqlx::query_as::<_, Document>(&format!(
        "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = $1 AND user_id = $2"
    ))
    .bind(document_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// The user's most recently uploaded document.
pub async fn latest_document(pool: &PgPool, user_id: i64) -> Result<Option<Document>, sqlx::Error> {
    sqlx::query_as::<_, Document>(&format!(
        "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE user_id = $1 ORDER BY id DESC LIMIT 1"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Delete a document row. Returns whether a row was removed.
pub async fn delete_document(pool: &PgPool, document_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM documents WHERE id = $1")
        .bind(document_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Mark a document as validated, returning the updated row.
pub async fn mark_validated(pool: &PgPool, document_id: i64) -> Result<Document, sqlx::Error> {
    sqlx::query_as::<_, Document>(&format!(
        "UPDATE documents SET validated = TRUE WHERE id = $1 RETURNING {DOCUMENT_COLUMNS}"
    ))
    .bind(document_id)
    .fetch_one(pool)
    .await
}
