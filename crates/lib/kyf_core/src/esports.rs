//! E-sports profile links.
//!
//! Profiles are "validated" by a local check against known e-sports
//! platforms; no external service is involved.

use sqlx::PgPool;
use url::Url;

use crate::models::profile::EsportsProfile;

/// Hosts whose profile pages count as e-sports profiles.
const ESPORTS_HOSTS: &[&str] = &[
    "hltv.org",
    "faceit.com",
    "gamersclub.com.br",
    "liquipedia.net",
    "steamcommunity.com",
    "vlr.gg",
    "tracker.gg",
    "op.gg",
];

/// Whether `url` points at a profile on a known e-sports platform.
///
/// Subdomains count (`www.faceit.com`); lookalike suffixes do not
/// (`notfaceit.com`).
pub fn is_esports_profile(url: &Url) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();
    ESPORTS_HOSTS.iter().any(|known| {
        host == *known
            || host
                .strip_suffix(known)
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}

/// Link a profile URL to a user.
pub async fn create_profile(
    pool: &PgPool,
    user_id: i64,
    url: &str,
    validated: bool,
) -> Result<EsportsProfile, sqlx::Error> {
    sqlx::query_as::<_, EsportsProfile>(
        "INSERT INTO esports_profiles (user_id, url, validated) VALUES ($1, $2, $3) \
         RETURNING id, user_id, url, validated, created_at",
    )
    .bind(user_id)
    .bind(url)
    .bind(validated)
    .fetch_one(pool)
    .await
}

/// A user's linked profiles, oldest first.
pub async fn list_profiles(pool: &PgPool, user_id: i64) -> Result<Vec<EsportsProfile>, sqlx::Error> {
    sqlx::query_as::<_, EsportsProfile>(
        "SELECT id, user_id, url, validated, created_at \
         FROM esports_profiles WHERE user_id = $1 ORDER BY id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(s: &str) -> bool {
        is_esports_profile(&Url::parse(s).unwrap())
    }

    #[test]
    fn known_platforms_pass() {
        assert!(check("https://www.hltv.org/player/2023/fallen"));
        assert!(check("https://faceit.com/en/players/art"));
        assert!(check("https://steamcommunity.com/id/kscerato"));
    }

    #[test]
    fn unknown_or_lookalike_hosts_fail() {
        assert!(!check("https://example.com/profile"));
        assert!(!check("https://notfaceit.com/en/players/art"));
        assert!(!check("https://hltv.org.evil.io/player"));
    }
}
