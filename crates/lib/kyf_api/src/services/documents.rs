//! Identity document upload, removal and AI validation.

use kyf_core::documents;
use kyf_core::models::profile::Document;
use kyf_core::storage::{UploadKind, extension_of, is_image_url};
use kyf_core::vision::{VisionRequest, is_affirmative, normalize_reply};
use tracing::{debug, info};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::services::auth::current_user;
use crate::services::upload::{ParsedUpload, store_upload};

/// Persist the uploaded file, then its row.
pub async fn upload(state: &AppState, user_id: i64, parsed: &ParsedUpload) -> AppResult<Document> {
    let kind = parsed
        .field("type")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::field("type", "Required"))?;
    let file = parsed
        .file
        .as_ref()
        .ok_or_else(|| AppError::field("file", "A file is required"))?;

    let url = store_upload(&state.files, UploadKind::Document, file).await?;
    match documents::insert_document(&state.pool, user_id, &url, kind).await {
        Ok(doc) => {
            info!(user_id, document_id = doc.id, "document uploaded");
            Ok(doc)
        }
        Err(e) => {
            state.files.remove(&url).await;
            Err(e.into())
        }
    }
}

/// Delete one of the caller's documents and, best-effort, its file.
pub async fn delete(state: &AppState, user_id: i64, document_id: i64) -> AppResult<()> {
    let doc = documents::find_user_document(&state.pool, user_id, document_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".into()))?;

    documents::delete_document(&state.pool, doc.id).await?;
    state.files.remove(&doc.url).await;
    info!(user_id, document_id, "document deleted");
    Ok(())
}

/// Ask the vision model whether the latest document shows the caller's CPF.
///
/// Returns the normalized reply and the document, flipped to validated only
/// on an exact affirmative answer.
pub async fn validate_latest(state: &AppState, user_id: i64) -> AppResult<(String, Document)> {
    let user = current_user(state, user_id).await?;
    let doc = documents::latest_document(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".into()))?;

    let not_image = || AppError::BadRequest("Only images can be validated".into());
    if !is_image_url(&doc.url) {
        return Err(not_image());
    }
    let extension = extension_of(&doc.url).ok_or_else(not_image)?;
    let bytes = state.files.read(&doc.url).await?;
    let request = VisionRequest::cpf_check(&user.cpf, &extension, &bytes).ok_or_else(not_image)?;

    let reply = state.verifier.ask(&request).await?;
    let result = normalize_reply(&reply);
    debug!(user_id, document_id = doc.id, %result, "vision reply");

    let doc = if is_affirmative(&result) && !doc.validated {
        let doc = documents::mark_validated(&state.pool, doc.id).await?;
        info!(user_id, document_id = doc.id, "document validated");
        doc
    } else {
        doc
    };
    Ok((result, doc))
}
