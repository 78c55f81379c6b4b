//! Account request handlers: sign-up, confirmation, login and profile.

use axum::Json;
use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::header::ACCEPT;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum_extra::extract::CookieJar;
use kyf_core::models::auth::{Profile, ProfileUpdate};
use kyf_core::storage::UploadKind;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthenticatedUser, session_claims};
use crate::models::{
    LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, SetCookieRequest,
    SuccessResponse, TokenQuery, VerifyResponse,
};
use crate::services::auth;
use crate::services::cookies::{clear_session_cookie, session_cookie};
use crate::services::upload::{UploadSpec, is_multipart, read_multipart};

/// Largest JSON sign-up body accepted.
const JSON_BODY_LIMIT: usize = 64 * 1024;

const CONFIRMED_PAGE: &str = r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>E-mail Confirmado</title>
  <style>
    body { font-family: Arial, sans-serif; background: #000; color: #e5e7eb;
           display: flex; justify-content: center; align-items: center; height: 100vh; margin: 0; }
    .box { text-align: center; background: #1f2937; padding: 2rem; border-radius: 1rem;
           border: 1px solid #6b21a8; }
    h1 { color: #9333ea; }
    a { color: #d8b4fe; font-weight: bold; text-decoration: none; }
  </style>
</head>
<body>
  <div class="box">
    <h1>E-mail Confirmado!</h1>
    <p>Seu e-mail foi confirmado com sucesso. Agora você já pode entrar na plataforma.</p>
    <p><a href="/login">Entrar</a></p>
  </div>
</body>
</html>
"#;

fn avatar_spec(state: &AppState) -> UploadSpec {
    UploadSpec {
        file_field: "photo",
        kind: UploadKind::Avatar,
        max_bytes: state.config.max_upload_bytes,
    }
}

/// `POST /api/user/register`: JSON, or multipart with an optional `photo`.
pub async fn register_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Body,
) -> AppResult<Json<RegisterResponse>> {
    let (req, photo) = if is_multipart(&headers) {
        let form = read_multipart(&headers, body, avatar_spec(&state)).await?;
        (RegisterRequest::from_form(&form), form.file)
    } else {
        let bytes = axum::body::to_bytes(body, JSON_BODY_LIMIT)
            .await
            .map_err(|e| AppError::BadRequest(format!("Unreadable body: {e}")))?;
        let req = serde_json::from_slice::<RegisterRequest>(&bytes)
            .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))?;
        (req, None)
    };

    let user = auth::register(&state, &req, photo.as_ref()).await?;
    Ok(Json(RegisterResponse {
        success: true,
        message: "Cadastro realizado! Verifique seu e-mail para confirmar.".into(),
        user_id: user.id,
    }))
}

/// `GET /api/user/confirm?token=`: redeem the e-mailed link.
///
/// Browsers get the confirmation page, API clients `{success: true}`.
pub async fn confirm_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<TokenQuery>,
) -> AppResult<Response> {
    let token = query
        .token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing token".into()))?;

    auth::confirm(&state, token.trim()).await?;

    let wants_html = headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"));
    if wants_html {
        Ok(Html(CONFIRMED_PAGE).into_response())
    } else {
        Ok(Json(SuccessResponse::ok()).into_response())
    }
}

/// `POST /api/user/login`: check credentials and set the session cookie.
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<(CookieJar, Json<LoginResponse>)> {
    let Json(req) = payload?;
    let (user, token) = auth::login(&state, &req).await?;
    let jar = jar.add(session_cookie(&token, state.config.cookie_secure));
    Ok((jar, Json(LoginResponse { success: true, user })))
}

/// `POST /api/user/logout`: expire the session cookie.
pub async fn logout_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<SuccessResponse>) {
    let jar = jar.add(clear_session_cookie(state.config.cookie_secure));
    (jar, Json(SuccessResponse::ok()))
}

/// `GET /api/user/verify`: who the session cookie belongs to.
pub async fn verify_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match session_claims(&state, &headers) {
        Some(claims) => Json(VerifyResponse {
            authenticated: true,
            user: Some(claims.user()),
        })
        .into_response(),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(VerifyResponse {
                authenticated: false,
                user: None,
            }),
        )
            .into_response(),
    }
}

/// `POST /api/auth/set-cookie`: adopt a token the client already holds.
pub async fn set_cookie_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<SetCookieRequest>, JsonRejection>,
) -> AppResult<(CookieJar, Json<SuccessResponse>)> {
    let Json(req) = payload?;
    let token = req
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing token".into()))?;

    auth::accept_token(&state, &token)?;
    let jar = jar.add(session_cookie(&token, state.config.cookie_secure));
    Ok((jar, Json(SuccessResponse::ok())))
}

/// `GET /api/user/update`: the caller's profile.
pub async fn get_profile_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
) -> AppResult<Json<Profile>> {
    let row = auth::current_user(&state, user.id()).await?;
    Ok(Json(Profile::from(&row)))
}

/// `PUT /api/user/update`: multipart profile edit; refreshes the session.
pub async fn update_profile_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    jar: CookieJar,
    headers: HeaderMap,
    body: Body,
) -> AppResult<(CookieJar, Json<Profile>)> {
    let form = read_multipart(&headers, body, avatar_spec(&state)).await?;
    let text = |name: &str| form.field(name).map(str::to_string);
    let update = ProfileUpdate {
        name: text("name"),
        address: text("address"),
        cpf: text("cpf"),
        photo: None,
    };

    let (row, token) = auth::update_profile(&state, user.id(), update, form.file.as_ref()).await?;
    let jar = jar.add(session_cookie(&token, state.config.cookie_secure));
    Ok((jar, Json(Profile::from(&row))))
}
