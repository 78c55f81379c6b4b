//! Account and session models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Photo path assigned to accounts registered without an avatar.
pub const DEFAULT_AVATAR: &str = "/uploads/avatars/avatar-default.png";

/// Full `users` row, including the credential columns.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub address: String,
    pub cpf: String,
    pub photo: String,
    pub is_active: bool,
    pub email_confirmed: bool,
    /// SHA-256 of the pending confirmation token; `None` once redeemed.
    pub email_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields required to insert a freshly registered user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub address: String,
    pub cpf: String,
    pub photo: String,
    pub email_token_hash: String,
}

/// Partial profile update. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub cpf: Option<String>,
    pub photo: Option<String>,
}

/// Profile as shown to its owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub cpf: String,
    pub photo: String,
    pub email: String,
}

impl From<&UserRow> for Profile {
    fn from(row: &UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name.clone(),
            address: row.address.clone(),
            cpf: row.cpf.clone(),
            photo: row.photo.clone(),
            email: row.email.clone(),
        }
    }
}

/// Identity carried inside a session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub photo: String,
}

impl From<&UserRow> for SessionUser {
    fn from(row: &UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name.clone(),
            email: row.email.clone(),
            photo: row.photo.clone(),
        }
    }
}

/// JWT claims embedded in session tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User id.
    pub id: i64,
    pub name: String,
    pub email: String,
    pub photo: String,
    /// Expiry (unix timestamp).
    pub exp: i64,
    /// Issued at (unix timestamp).
    pub iat: i64,
}

impl TokenClaims {
    /// The identity part of the claims.
    pub fn user(&self) -> SessionUser {
        SessionUser {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            photo: self.photo.clone(),
        }
    }
}
