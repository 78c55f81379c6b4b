//! Page access gate.
//!
//! Every request is classified once by path. Pages behind a session redirect
//! to `/login`; the login and sign-up pages redirect signed-in users home.
//! API routes are classified `Public` here and protected by
//! [`require_auth`](super::auth::require_auth) on their route group.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use crate::AppState;
use crate::middleware::auth::session_claims;

/// Pages that only make sense without a session.
const AUTH_ONLY_PAGES: &[&str] = &["/login", "/cadastro"];

/// Pages that need a session.
const PROTECTED_PAGES: &[&str] = &["/perfil", "/documentos", "/network"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Public,
    AuthOnly,
    Protected,
}

/// Classify a request path. `/perfil` and `/perfil/x` match, `/perfilx`
/// does not.
pub fn classify(path: &str) -> RouteClass {
    if AUTH_ONLY_PAGES.iter().any(|p| under(path, p)) {
        RouteClass::AuthOnly
    } else if PROTECTED_PAGES.iter().any(|p| under(path, p)) {
        RouteClass::Protected
    } else {
        RouteClass::Public
    }
}

fn under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Axum middleware applying [`classify`] to every request.
pub async fn page_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let class = classify(request.uri().path());
    if class == RouteClass::Public {
        return next.run(request).await;
    }

    let signed_in = session_claims(&state, request.headers()).is_some();
    match (class, signed_in) {
        (RouteClass::AuthOnly, true) => {
            debug!(path = %request.uri().path(), "signed in, redirecting home");
            Redirect::temporary("/").into_response()
        }
        (RouteClass::Protected, false) => {
            debug!(path = %request.uri().path(), "no session, redirecting to login");
            Redirect::temporary("/login").into_response()
        }
        _ => next.run(request).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_pages() {
        assert_eq!(classify("/"), RouteClass::Public);
        assert_eq!(classify("/login"), RouteClass::AuthOnly);
        assert_eq!(classify("/cadastro/"), RouteClass::AuthOnly);
        assert_eq!(classify("/perfil"), RouteClass::Protected);
        assert_eq!(classify("/documentos/123"), RouteClass::Protected);
        assert_eq!(classify("/network"), RouteClass::Protected);
    }

    #[test]
    fn prefix_match_respects_segments() {
        assert_eq!(classify("/perfilx"), RouteClass::Public);
        assert_eq!(classify("/loginpage"), RouteClass::Public);
        assert_eq!(classify("/api/user/login"), RouteClass::Public);
        assert_eq!(classify("/uploads/avatars/a.png"), RouteClass::Public);
    }
}
