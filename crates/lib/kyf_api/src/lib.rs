//! # kyf_api
//!
//! HTTP API library for FURIA KYF.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use kyf_core::mail::Mailer;
use kyf_core::mail::brevo::BrevoMailer;
use kyf_core::mail::log::LogMailer;
use kyf_core::storage::FileStore;
use kyf_core::vision::DocumentVerifier;
use kyf_core::vision::fixed::FixedVerifier;
use kyf_core::vision::gemini::GeminiVerifier;
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ApiConfig;
use crate::error::StateError;
use crate::handlers::{documents, esports, health, social, user};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool.
    pub pool: PgPool,
    /// API configuration.
    pub config: ApiConfig,
    /// Upload area under the public directory.
    pub files: FileStore,
    pub mailer: Arc<dyn Mailer>,
    pub verifier: Arc<dyn DocumentVerifier>,
}

impl AppState {
    /// State with the mailer and verifier picked from configuration.
    ///
    /// Without Brevo settings mail is only logged; without a Gemini key every
    /// validation gets an empty reply and nothing is validated.
    pub fn new(pool: PgPool, config: ApiConfig) -> Result<Self, StateError> {
        let client = reqwest::Client::new();

        let mailer: Arc<dyn Mailer> = match &config.brevo {
            Some(brevo) => {
                info!(sender = %brevo.sender_email, "sending mail through Brevo");
                Arc::new(BrevoMailer::new(
                    client.clone(),
                    &brevo.api_key,
                    &brevo.sender_email,
                    &brevo.sender_name,
                )?)
            }
            None => {
                warn!("no mail provider configured; confirmation links are only logged");
                Arc::new(LogMailer)
            }
        };

        let verifier: Arc<dyn DocumentVerifier> = match &config.gemini_api_key {
            Some(key) => Arc::new(GeminiVerifier::new(client, key, &config.gemini_model)?),
            None => {
                warn!("GEMINI_API_KEY not set; document validation always answers empty");
                Arc::new(FixedVerifier::new(""))
            }
        };

        Ok(Self::with_services(pool, config, mailer, verifier))
    }

    /// State with explicit mail and vision backends.
    pub fn with_services(
        pool: PgPool,
        config: ApiConfig,
        mailer: Arc<dyn Mailer>,
        verifier: Arc<dyn DocumentVerifier>,
    ) -> Self {
        Self {
            files: FileStore::new(config.public_dir.clone()),
            pool,
            config,
            mailer,
            verifier,
        }
    }
}

/// Run embedded database migrations.
///
/// Delegates to `kyf_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    kyf_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
///
/// Anything that is not an API route is served from the public directory,
/// behind the page gate.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public = Router::new()
        .route("/api/health", get(health::health_handler))
        .route("/api/user/register", post(user::register_handler))
        .route("/api/user/confirm", get(user::confirm_handler))
        .route("/api/user/login", post(user::login_handler))
        .route("/api/user/logout", post(user::logout_handler))
        .route("/api/user/verify", get(user::verify_handler))
        .route("/api/auth/set-cookie", post(user::set_cookie_handler))
        .route("/api/social/getAll", get(social::list_profiles_handler))
        .route("/api/social/{id}", get(social::public_profile_handler))
        .route("/api/teams", get(social::list_teams_handler));

    // Protected routes (require a session cookie)
    let protected = Router::new()
        .route(
            "/api/user/update",
            get(user::get_profile_handler).put(user::update_profile_handler),
        )
        .route(
            "/api/document",
            get(documents::list_documents_handler)
                .post(documents::upload_document_handler)
                .delete(documents::delete_document_handler),
        )
        .route(
            "/api/gemini/validateDocument",
            post(documents::validate_document_handler),
        )
        .route(
            "/api/social",
            get(social::get_social_handler).post(social::save_social_handler),
        )
        .route(
            "/api/esports-profile",
            get(esports::list_esports_profiles_handler)
                .post(esports::create_esports_profile_handler),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .fallback_service(ServeDir::new(&state.config.public_dir))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::gate::page_gate,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
