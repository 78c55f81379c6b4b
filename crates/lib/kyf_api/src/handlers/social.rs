//! Social profile, fan directory and team handlers.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use kyf_core::forms::FormCheck;
use kyf_core::models::profile::{PublicProfile, SocialLinks, Team};
use kyf_core::social;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{SocialRequest, SocialResponse};

/// Blank link fields are stored as absent; the rest must be http(s) URLs.
fn clean_links(mut links: SocialLinks) -> AppResult<SocialLinks> {
    for field in [
        &mut links.bio,
        &mut links.youtube,
        &mut links.linkedin,
        &mut links.twitch,
        &mut links.twitter,
        &mut links.instagram,
    ] {
        if field.as_deref().is_some_and(|v| v.trim().is_empty()) {
            *field = None;
        }
    }

    let mut check = FormCheck::new();
    for (name, value) in links.links() {
        if let Some(value) = value {
            check.http_url(name, value);
        }
    }
    check.finish().map_err(AppError::Validation)?;
    Ok(links)
}

/// `GET /api/social`: the caller's links, favorites and the team catalogue.
pub async fn get_social_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
) -> AppResult<Json<SocialResponse>> {
    let social = social::get_social(&state.pool, user.id()).await?;
    let teams = social::favorite_teams(&state.pool, user.id()).await?;
    let all_teams = social::list_teams(&state.pool).await?;
    Ok(Json(SocialResponse {
        social,
        teams,
        all_teams: Some(all_teams),
    }))
}

/// `POST /api/social`: save links; `teamIds` replaces the favorites.
pub async fn save_social_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    payload: Result<Json<SocialRequest>, JsonRejection>,
) -> AppResult<Json<SocialResponse>> {
    let Json(req) = payload?;
    let links = clean_links(req.links)?;

    let saved =
        social::save_social_profile(&state.pool, user.id(), &links, req.team_ids.as_deref())
            .await?;
    let teams = social::favorite_teams(&state.pool, user.id()).await?;
    Ok(Json(SocialResponse {
        social: Some(saved),
        teams,
        all_teams: None,
    }))
}

/// `GET /api/social/{id}`: another fan's public profile.
pub async fn public_profile_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<PublicProfile>> {
    let id: i64 = id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid user id".into()))?;
    let profile = social::public_profile(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(Json(profile))
}

/// `GET /api/social/getAll`: every active fan.
pub async fn list_profiles_handler(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<PublicProfile>>> {
    Ok(Json(social::list_public_profiles(&state.pool).await?))
}

/// `GET /api/teams`
pub async fn list_teams_handler(State(state): State<AppState>) -> AppResult<Json<Vec<Team>>> {
    Ok(Json(social::list_teams(&state.pool).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_links_become_absent() {
        let links = clean_links(SocialLinks {
            bio: Some("  ".into()),
            youtube: Some(String::new()),
            twitch: Some("https://twitch.tv/furiatv".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(links.bio, None);
        assert_eq!(links.youtube, None);
        assert_eq!(links.twitch.as_deref(), Some("https://twitch.tv/furiatv"));
    }

    #[test]
    fn non_url_links_are_rejected() {
        let err = clean_links(SocialLinks {
            bio: Some("não é url, e tudo bem".into()),
            instagram: Some("@furiagg".into()),
            ..Default::default()
        })
        .unwrap_err();
        match err {
            AppError::Validation(issues) => {
                assert_eq!(issues.len(), 1);
                assert_eq!(issues[0].path, "instagram");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
