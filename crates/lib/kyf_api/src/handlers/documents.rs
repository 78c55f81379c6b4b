//! Identity document handlers.

use axum::Json;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use kyf_core::documents::list_documents;
use kyf_core::models::profile::Document;
use kyf_core::storage::UploadKind;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{DocumentIdQuery, SuccessResponse, ValidateDocumentResponse};
use crate::services::documents;
use crate::services::upload::{UploadSpec, read_multipart};

/// `POST /api/document`: multipart `file` + `type`.
pub async fn upload_document_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    headers: HeaderMap,
    body: Body,
) -> AppResult<Json<Document>> {
    let spec = UploadSpec {
        file_field: "file",
        kind: UploadKind::Document,
        max_bytes: state.config.max_upload_bytes,
    };
    let form = read_multipart(&headers, body, spec).await?;
    let doc = documents::upload(&state, user.id(), &form).await?;
    Ok(Json(doc))
}

/// `GET /api/document`: the caller's documents.
pub async fn list_documents_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
) -> AppResult<Json<Vec<Document>>> {
    Ok(Json(list_documents(&state.pool, user.id()).await?))
}

/// `DELETE /api/document?id=`
pub async fn delete_document_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Query(query): Query<DocumentIdQuery>,
) -> AppResult<Json<SuccessResponse>> {
    let id = query
        .id
        .ok_or_else(|| AppError::BadRequest("Document id is required".into()))?;
    let id: i64 = id
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest("Document id must be a number".into()))?;

    documents::delete(&state, user.id(), id).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// `POST /api/gemini/validateDocument`: check the latest document's CPF.
pub async fn validate_document_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
) -> AppResult<Json<ValidateDocumentResponse>> {
    let (result, document) = documents::validate_latest(&state, user.id()).await?;
    Ok(Json(ValidateDocumentResponse { result, document }))
}
