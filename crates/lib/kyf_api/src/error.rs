//! Application error types.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use kyf_core::auth::AuthError;
use kyf_core::forms::FieldIssue;
use kyf_core::mail::MailError;
use kyf_core::social::SocialError;
use kyf_core::storage::StorageError;
use kyf_core::vision::VerifyError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Failure to build the shared state from configuration.
#[derive(Debug, Error)]
pub enum StateError {
    #[error(transparent)]
    Mail(#[from] MailError),

    #[error(transparent)]
    Verifier(#[from] VerifyError),
}

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request body failed schema checks.
    #[error("Validation failed: {} issue(s)", .0.len())]
    Validation(Vec<FieldIssue>),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// AI provider failure. `details` is echoed to the client.
    #[error("Upstream failure: {message}: {details}")]
    Upstream { message: String, details: String },

    /// Mail provider failure. The detail is only logged.
    #[error("Mail failure: {0}")]
    Mail(String),

    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    /// Single-field schema failure.
    pub fn field(path: &str, message: &str) -> Self {
        AppError::Validation(vec![FieldIssue {
            path: path.to_string(),
            message: message.to_string(),
        }])
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) | AppError::UnsupportedFormat(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upstream { .. } | AppError::Mail(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::Validation(issues) => json!({ "error": { "errors": issues } }),
            AppError::BadRequest(m)
            | AppError::UnsupportedFormat(m)
            | AppError::PayloadTooLarge(m)
            | AppError::Unauthenticated(m)
            | AppError::Forbidden(m)
            | AppError::NotFound(m) => json!({ "error": m }),
            AppError::Upstream { message, details } => {
                error!(%details, "{message}");
                json!({ "error": message, "details": details })
            }
            AppError::Mail(detail) => {
                error!(%detail, "mail delivery failed");
                json!({ "error": "Failed to send e-mail" })
            }
            AppError::Internal(detail) => {
                error!(%detail, "internal error");
                json!({ "error": "Internal server error" })
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::BadRequest(e.body_text())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => AppError::NotFound("row not found".into()),
            _ => AppError::Internal(e.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::CredentialError => AppError::Unauthenticated("Invalid credentials".into()),
            AuthError::InactiveAccount => {
                AppError::Forbidden("Account is deactivated. Contact support.".into())
            }
            AuthError::EmailNotConfirmed => {
                AppError::Forbidden("Confirm your e-mail before signing in.".into())
            }
            AuthError::InvalidToken => AppError::Unauthenticated("Invalid or expired token".into()),
            AuthError::TokenError(msg) => AppError::Internal(msg),
            AuthError::ValidationError(msg) => AppError::BadRequest(msg),
            AuthError::DbError(e) => AppError::from(e),
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<SocialError> for AppError {
    fn from(e: SocialError) -> Self {
        match e {
            SocialError::UnknownTeam(id) => AppError::field("teamIds", &format!("Unknown team id: {id}")),
            SocialError::DbError(e) => AppError::from(e),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::Io(io) if io.kind() == std::io::ErrorKind::NotFound => {
                AppError::NotFound("File not found".into())
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<MailError> for AppError {
    fn from(e: MailError) -> Self {
        AppError::Mail(e.to_string())
    }
}

impl From<VerifyError> for AppError {
    fn from(e: VerifyError) -> Self {
        AppError::Upstream {
            message: "Failed to validate document".into(),
            details: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_errors_list_field_issues() {
        let resp = AppError::field("email", "Invalid email").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["error"]["errors"][0]["path"], "email");
        assert_eq!(json["error"]["errors"][0]["message"], "Invalid email");
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let resp = AppError::Internal("connection refused at 10.0.0.1".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp).await;
        assert_eq!(json, json!({ "error": "Internal server error" }));
    }

    #[tokio::test]
    async fn upstream_errors_echo_details() {
        let resp = AppError::from(VerifyError::Provider("quota exceeded".into())).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(resp).await;
        assert_eq!(json["error"], "Failed to validate document");
        assert!(json["details"].as_str().unwrap().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn mail_errors_hide_provider_details() {
        let resp = AppError::from(MailError::Provider(
            "Brevo 401: key xkeysib-abc rejected".into(),
        ))
        .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(resp).await;
        assert_eq!(json, json!({ "error": "Failed to send e-mail" }));
    }

    #[test]
    fn auth_errors_map_to_statuses() {
        assert_eq!(
            AppError::from(AuthError::InactiveAccount).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::from(AuthError::InvalidToken).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(AuthError::CredentialError).status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
