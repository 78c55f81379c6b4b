//! Request and response bodies of the JSON API.

use kyf_core::models::auth::SessionUser;
use kyf_core::models::profile::{Document, SocialItems, SocialLinks, Team};
use serde::{Deserialize, Serialize};

use crate::services::upload::ParsedUpload;

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// Registration fields. Missing fields default to empty and fail the schema.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: String,
    pub cpf: String,
}

impl RegisterRequest {
    /// Registration fields submitted as multipart text parts.
    pub fn from_form(form: &ParsedUpload) -> Self {
        let get = |name: &str| form.field(name).unwrap_or_default().to_string();
        Self {
            name: get("name"),
            email: get("email"),
            password: get("password"),
            address: get("address"),
            cpf: get("cpf"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub user_id: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user: SessionUser,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetCookieRequest {
    pub token: Option<String>,
}

/// `{ "success": true }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentIdQuery {
    pub id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateDocumentResponse {
    /// Normalized model reply.
    pub result: String,
    pub document: Document,
}

// ---------------------------------------------------------------------------
// Social & teams
// ---------------------------------------------------------------------------

/// Social profile save. `teamIds`, when present, replaces the favorites.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialRequest {
    #[serde(flatten)]
    pub links: SocialLinks,
    pub team_ids: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialResponse {
    pub social: Option<SocialItems>,
    /// The caller's favorite teams.
    pub teams: Vec<Team>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_teams: Option<Vec<Team>>,
}

// ---------------------------------------------------------------------------
// E-sports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EsportsProfileRequest {
    pub url: String,
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub db_connected: bool,
}
