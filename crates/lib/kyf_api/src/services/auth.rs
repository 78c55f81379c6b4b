//! Account flows: registration, e-mail confirmation, login and profile update.
//!
//! Handlers stay thin; everything here works on plain inputs plus
//! [`AppState`] and returns the records the handlers serialize.

use kyf_core::auth::jwt::{issue_token, verify_token};
use kyf_core::auth::password::{hash_password, verify_password};
use kyf_core::auth::queries;
use kyf_core::auth::tokens::{generate_email_token, hash_email_token};
use kyf_core::auth::AuthError;
use kyf_core::forms::{check_login, check_profile_update, check_registration};
use kyf_core::mail::confirmation_mail;
use kyf_core::models::auth::{
    DEFAULT_AVATAR, NewUser, ProfileUpdate, SessionUser, TokenClaims, UserRow,
};
use kyf_core::storage::UploadKind;
use tracing::{info, warn};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{LoginRequest, RegisterRequest};
use crate::services::upload::{AcceptedFile, store_upload};

/// Register an inactive account and e-mail its confirmation link.
///
/// The avatar, when given, is written before the row is inserted and
/// removed again if the insert fails.
pub async fn register(
    state: &AppState,
    req: &RegisterRequest,
    photo: Option<&AcceptedFile>,
) -> AppResult<UserRow> {
    check_registration(&req.name, &req.email, &req.password, &req.address, &req.cpf)
        .map_err(AppError::Validation)?;

    if queries::email_exists(&state.pool, req.email.trim()).await? {
        return Err(AppError::BadRequest("E-mail already registered".into()));
    }

    let password_hash = hash_password(&req.password)?;
    let confirm_token = generate_email_token();

    let photo_url = match photo {
        Some(file) => Some(store_upload(&state.files, UploadKind::Avatar, file).await?),
        None => None,
    };

    let new_user = NewUser {
        name: req.name.trim().to_string(),
        email: req.email.trim().to_string(),
        password_hash,
        address: req.address.clone(),
        cpf: req.cpf.clone(),
        photo: photo_url.clone().unwrap_or_else(|| DEFAULT_AVATAR.to_string()),
        email_token_hash: hash_email_token(&confirm_token),
    };

    let user = match queries::create_user(&state.pool, &new_user).await {
        Ok(user) => user,
        Err(e) => {
            if let Some(url) = &photo_url {
                state.files.remove(url).await;
            }
            return Err(e.into());
        }
    };
    info!(user_id = user.id, "user registered");

    let confirm_url = state.config.confirm_url(&confirm_token);
    state
        .mailer
        .send(&confirmation_mail(&user.email, &user.name, &confirm_url))
        .await?;

    Ok(user)
}

/// Redeem a confirmation token. Returns the confirmed user id.
///
/// Unknown and already-redeemed tokens are indistinguishable.
pub async fn confirm(state: &AppState, token: &str) -> AppResult<i64> {
    let user_id = queries::confirm_email(&state.pool, &hash_email_token(token))
        .await?
        .ok_or_else(|| AppError::NotFound("Invalid or already used token".into()))?;
    info!(user_id, "e-mail confirmed");
    Ok(user_id)
}

/// Check credentials and issue a session token.
///
/// A deactivated account is refused before the password is looked at.
pub async fn login(state: &AppState, req: &LoginRequest) -> AppResult<(SessionUser, String)> {
    check_login(&req.email, &req.password).map_err(AppError::Validation)?;

    let user = queries::find_user_by_email(&state.pool, req.email.trim())
        .await?
        .ok_or(AuthError::CredentialError)?;

    if !user.is_active {
        warn!(user_id = user.id, "login refused: account inactive");
        return Err(AuthError::InactiveAccount.into());
    }
    if !verify_password(&req.password, &user.password_hash)? {
        return Err(AuthError::CredentialError.into());
    }
    if !user.email_confirmed {
        return Err(AuthError::EmailNotConfirmed.into());
    }

    let session = SessionUser::from(&user);
    let token = issue_token(&session, state.config.jwt_secret.as_bytes())?;
    info!(user_id = user.id, "user logged in");
    Ok((session, token))
}

/// Verify a client-held token before it becomes the session cookie.
pub fn accept_token(state: &AppState, token: &str) -> AppResult<TokenClaims> {
    Ok(verify_token(token, state.config.jwt_secret.as_bytes())?)
}

/// Fetch the caller's own record.
pub async fn current_user(state: &AppState, user_id: i64) -> AppResult<UserRow> {
    queries::get_user_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

/// Apply a partial profile update and re-issue the session token so the
/// claims carry the new name and photo.
pub async fn update_profile(
    state: &AppState,
    user_id: i64,
    mut update: ProfileUpdate,
    photo: Option<&AcceptedFile>,
) -> AppResult<(UserRow, String)> {
    check_profile_update(update.cpf.as_deref()).map_err(AppError::Validation)?;

    update.photo = match photo {
        Some(file) => Some(store_upload(&state.files, UploadKind::Avatar, file).await?),
        None => None,
    };

    let updated = match queries::update_profile(&state.pool, user_id, &update).await {
        Ok(Some(user)) => user,
        other => {
            if let Some(url) = &update.photo {
                state.files.remove(url).await;
            }
            return Err(match other {
                Err(e) => e.into(),
                _ => AppError::NotFound("User not found".into()),
            });
        }
    };

    let token = issue_token(&SessionUser::from(&updated), state.config.jwt_secret.as_bytes())?;
    info!(user_id, "profile updated");
    Ok((updated, token))
}
