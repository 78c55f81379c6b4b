//! E-sports profile link handlers.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use kyf_core::esports::{create_profile, is_esports_profile, list_profiles};
use kyf_core::forms::parse_http_url;
use kyf_core::models::profile::EsportsProfile;
use tracing::info;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::EsportsProfileRequest;

/// `POST /api/esports-profile {url}`
pub async fn create_esports_profile_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    payload: Result<Json<EsportsProfileRequest>, JsonRejection>,
) -> AppResult<Json<EsportsProfile>> {
    let Json(req) = payload?;
    let url = req.url.trim();
    let parsed = parse_http_url(url).ok_or_else(|| AppError::field("url", "Invalid url"))?;

    let validated = is_esports_profile(&parsed);
    let profile = create_profile(&state.pool, user.id(), url, validated).await?;
    info!(user_id = user.id(), profile_id = profile.id, validated, "e-sports profile linked");
    Ok(Json(profile))
}

/// `GET /api/esports-profile`
pub async fn list_esports_profiles_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
) -> AppResult<Json<Vec<EsportsProfile>>> {
    Ok(Json(list_profiles(&state.pool, user.id()).await?))
}
