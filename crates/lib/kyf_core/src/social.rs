//! Social profile, favorite teams and the public fan directory.

use std::collections::HashMap;

use sqlx::PgPool;
use thiserror::Error;
use tracing::debug;

use crate::models::profile::{PublicProfile, SocialItems, SocialLinks, Team};

/// Errors from social profile operations.
#[derive(Debug, Error)]
pub enum SocialError {
    #[error("Unknown team id: {0}")]
    UnknownTeam(i64),

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),
}

const SOCIAL_COLUMNS: &str = "user_id, bio, youtube, linkedin, twitch, twitter, instagram";

/// All reference teams, by name.
pub async fn list_teams(pool: &PgPool) -> Result<Vec<Team>, sqlx::Error> {
    sqlx::query_as::<_, Team>("SELECT id, name, logo FROM teams ORDER BY name")
        .fetch_all(pool)
        .await
}

/// A user's social record, if one was ever saved.
pub async fn get_social(pool: &PgPool, user_id: i64) -> Result<Option<SocialItems>, sqlx::Error> {
    sqlx::query_as::<_, SocialItems>(&format!(
        "SELECT {SOCIAL_COLUMNS} FROM social_items WHERE user_id = $1"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// A user's favorite teams, by name.
pub async fn favorite_teams(pool: &PgPool, user_id: i64) -> Result<Vec<Team>, sqlx::Error> {
    sqlx::query_as::<_, Team>(
        "SELECT t.id, t.name, t.logo \
         FROM user_favorite_teams uft \
         JOIN teams t ON t.id = uft.team_id \
         WHERE uft.user_id = $1 \
         ORDER BY t.name",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Save the social record and, when `team_ids` is given, replace the
/// favorite set with exactly those teams.
///
/// Everything runs in one transaction: a failure leaves the previous record
/// and favorites untouched.
pub async fn save_social_profile(
    pool: &PgPool,
    user_id: i64,
    links: &SocialLinks,
    team_ids: Option<&[i64]>,
) -> Result<SocialItems, SocialError> {
    let mut tx = pool.begin().await?;

    let social = sqlx::query_as::<_, SocialItems>(&format!(
        "INSERT INTO social_items (user_id, bio, youtube, linkedin, twitch, twitter, instagram) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         ON CONFLICT (user_id) DO UPDATE SET \
            bio = EXCLUDED.bio, \
            youtube = EXCLUDED.youtube, \
            linkedin = EXCLUDED.linkedin, \
            twitch = EXCLUDED.twitch, \
            twitter = EXCLUDED.twitter, \
            instagram = EXCLUDED.instagram \
         RETURNING {SOCIAL_COLUMNS}"
    ))
    .bind(user_id)
    .bind(links.bio.as_deref())
    .bind(links.youtube.as_deref())
    .bind(links.linkedin.as_deref())
    .bind(links.twitch.as_deref())
    .bind(links.twitter.as_deref())
    .bind(links.instagram.as_deref())
    .fetch_one(&mut *tx)
    .await?;

    if let Some(team_ids) = team_ids {
        let team_ids = dedup_preserving_order(team_ids);

        let known = sqlx::query_scalar::<_, i64>("SELECT id FROM teams WHERE id = ANY($1)")
            .bind(team_ids.as_slice())
            .fetch_all(&mut *tx)
            .await?;
        if let Some(missing) = team_ids.iter().find(|id| !known.contains(id)) {
            return Err(SocialError::UnknownTeam(*missing));
        }

        sqlx::query("DELETE FROM user_favorite_teams WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        for team_id in &team_ids {
            sqlx::query("INSERT INTO user_favorite_teams (user_id, team_id) VALUES ($1, $2)")
                .bind(user_id)
                .bind(team_id)
                .execute(&mut *tx)
                .await?;
        }
        debug!(user_id, count = team_ids.len(), "favorite teams replaced");
    }

    tx.commit().await?;
    Ok(social)
}

/// Public profile of a single active user.
pub async fn public_profile(pool: &PgPool, user_id: i64) -> Result<Option<PublicProfile>, sqlx::Error> {
    let Some((id, name, photo)) = sqlx::query_as::<_, (i64, String, String)>(
        "SELECT id, name, photo FROM users WHERE id = $1 AND is_active",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    else {
        return Ok(None);
    };

    Ok(Some(PublicProfile {
        id,
        name,
        photo,
        social: get_social(pool, id).await?,
        teams: favorite_teams(pool, id).await?,
    }))
}

/// Public profiles of every active user, in registration order.
pub async fn list_public_profiles(pool: &PgPool) -> Result<Vec<PublicProfile>, sqlx::Error> {
    let users = sqlx::query_as::<_, (i64, String, String)>(
        "SELECT id, name, photo FROM users WHERE is_active ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    let mut socials: HashMap<i64, SocialItems> = sqlx::query_as::<_, SocialItems>(&format!(
        "SELECT {SOCIAL_COLUMNS} FROM social_items"
    ))
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|s| (s.user_id, s))
    .collect();

    let favorites = sqlx::query_as::<_, (i64, i64, String, String)>(
        "SELECT uft.user_id, t.id, t.name, t.logo \
         FROM user_favorite_teams uft \
         JOIN teams t ON t.id = uft.team_id \
         ORDER BY t.name",
    )
    .fetch_all(pool)
    .await?;
    let mut teams: HashMap<i64, Vec<Team>> = HashMap::new();
    for (user_id, id, name, logo) in favorites {
        teams.entry(user_id).or_default().push(Team { id, name, logo });
    }

    Ok(users
        .into_iter()
        .map(|(id, name, photo)| PublicProfile {
            id,
            name,
            photo,
            social: socials.remove(&id),
            teams: teams.remove(&id).unwrap_or_default(),
        })
        .collect())
}

fn dedup_preserving_order(ids: &[i64]) -> Vec<i64> {
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(*id);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_keeps_first_occurrence() {
        assert_eq!(dedup_preserving_order(&[3, 1, 3, 2, 1]), vec![3, 1, 2]);
        assert!(dedup_preserving_order(&[]).is_empty());
    }
}
