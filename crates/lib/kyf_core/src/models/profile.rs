//! Documents, social links, teams and e-sports profiles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Uploaded identity document.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: i64,
    pub user_id: i64,
    /// Public URL path under `/uploads/documents/`.
    pub url: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub validated: bool,
    pub created_at: DateTime<Utc>,
}

/// Bio and social network links, one record per user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SocialItems {
    pub user_id: i64,
    pub bio: Option<String>,
    pub youtube: Option<String>,
    pub linkedin: Option<String>,
    pub twitch: Option<String>,
    pub twitter: Option<String>,
    pub instagram: Option<String>,
}

/// Submitted social links; saved as a whole record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SocialLinks {
    pub bio: Option<String>,
    pub youtube: Option<String>,
    pub linkedin: Option<String>,
    pub twitch: Option<String>,
    pub twitter: Option<String>,
    pub instagram: Option<String>,
}

impl SocialLinks {
    /// `(field, value)` pairs for the link fields (bio excluded).
    pub fn links(&self) -> [(&'static str, Option<&str>); 5] {
        [
            ("youtube", self.youtube.as_deref()),
            ("linkedin", self.linkedin.as_deref()),
            ("twitch", self.twitch.as_deref()),
            ("twitter", self.twitter.as_deref()),
            ("instagram", self.instagram.as_deref()),
        ]
    }
}

/// Reference team a fan can pick as favorite.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub logo: String,
}

/// Linked e-sports platform profile.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EsportsProfile {
    pub id: i64,
    pub user_id: i64,
    pub url: String,
    pub validated: bool,
    pub created_at: DateTime<Utc>,
}

/// What other fans can see about a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicProfile {
    pub id: i64,
    pub name: String,
    pub photo: String,
    pub social: Option<SocialItems>,
    pub teams: Vec<Team>,
}
