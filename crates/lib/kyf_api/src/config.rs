//! API server configuration.

use std::path::PathBuf;

use kyf_core::auth::jwt::resolve_jwt_secret;
use kyf_core::vision::gemini::DEFAULT_GEMINI_MODEL;
use tracing::warn;

/// Default per-file upload limit: 5 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Brevo credentials for outgoing mail.
#[derive(Clone, Debug)]
pub struct BrevoConfig {
    pub api_key: String,
    pub sender_email: String,
    pub sender_name: String,
}

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3000").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub pg_connection_url: String,
    /// JWT signing secret.
    pub jwt_secret: String,
    /// Static root; uploads go to `<public_dir>/uploads/`.
    pub public_dir: PathBuf,
    /// Public base URL used in confirmation links.
    pub base_url: String,
    /// Whether the session cookie carries the `Secure` attribute.
    pub cookie_secure: bool,
    /// Largest accepted uploaded file, in bytes.
    pub max_upload_bytes: usize,
    /// Gemini API key. Without it the vision check uses a fixed reply.
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    /// Brevo mail settings. Without them mail is only logged.
    pub brevo: Option<BrevoConfig>,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable             | Default                              |
    /// |----------------------|--------------------------------------|
    /// | `BIND_ADDR`          | `127.0.0.1:3000`                     |
    /// | `DATABASE_URL`       | `postgres://localhost:5432/kyf`      |
    /// | `JWT_SECRET` / `AUTH_SECRET` | generated & persisted to file |
    /// | `PUBLIC_DIR`         | `public`                             |
    /// | `BASE_URL`           | `http://localhost:3000`              |
    /// | `COOKIE_SECURE`      | `false`                              |
    /// | `MAX_UPLOAD_BYTES`   | `5242880`                            |
    /// | `GEMINI_API_KEY`     | unset                                |
    /// | `GEMINI_MODEL`       | `gemini-2.5-pro`                     |
    /// | `BREVO_API_KEY`, `BREVO_SENDER_EMAIL`, `BREVO_SENDER_NAME` | unset |
    pub fn from_env() -> Self {
        Self {
            bind_addr: env_or("BIND_ADDR", "127.0.0.1:3000"),
            pg_connection_url: env_or("DATABASE_URL", "postgres://localhost:5432/kyf"),
            jwt_secret: resolve_jwt_secret(),
            public_dir: PathBuf::from(env_or("PUBLIC_DIR", "public")),
            base_url: env_or("BASE_URL", "http://localhost:3000"),
            cookie_secure: env_flag("COOKIE_SECURE"),
            max_upload_bytes: upload_limit(env_opt("MAX_UPLOAD_BYTES").as_deref()),
            gemini_api_key: env_opt("GEMINI_API_KEY"),
            gemini_model: env_or("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
            brevo: brevo_from_env(),
        }
    }

    /// Confirmation link for a plaintext e-mail token.
    pub fn confirm_url(&self, token: &str) -> String {
        format!(
            "{}/api/user/confirm?token={token}",
            self.base_url.trim_end_matches('/')
        )
    }
}

/// Brevo settings, present only when key and sender are both set.
pub fn brevo_from_env() -> Option<BrevoConfig> {
    Some(BrevoConfig {
        api_key: env_opt("BREVO_API_KEY")?,
        sender_email: env_opt("BREVO_SENDER_EMAIL")?,
        sender_name: env_or("BREVO_SENDER_NAME", "FURIA KYF"),
    })
}

/// Parse `MAX_UPLOAD_BYTES`, falling back to the default when unset or invalid.
fn upload_limit(raw: Option<&str>) -> usize {
    let Some(raw) = raw else {
        return DEFAULT_MAX_UPLOAD_BYTES;
    };
    match raw.parse::<usize>() {
        Ok(limit) if limit > 0 => limit,
        _ => {
            warn!(
                value = raw,
                default = DEFAULT_MAX_UPLOAD_BYTES,
                "invalid MAX_UPLOAD_BYTES; using the default"
            );
            DEFAULT_MAX_UPLOAD_BYTES
        }
    }
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_string())
}

fn env_flag(key: &str) -> bool {
    env_opt(key).is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> ApiConfig {
        ApiConfig {
            bind_addr: "127.0.0.1:0".into(),
            pg_connection_url: String::new(),
            jwt_secret: "s".into(),
            public_dir: PathBuf::from("public"),
            base_url: base_url.into(),
            cookie_secure: false,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.into(),
            brevo: None,
        }
    }

    #[test]
    fn upload_limit_falls_back_on_bad_values() {
        assert_eq!(upload_limit(None), DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(upload_limit(Some("1048576")), 1_048_576);
        assert_eq!(upload_limit(Some("5MB")), DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(upload_limit(Some("0")), DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn confirm_url_joins_without_double_slash() {
        assert_eq!(
            config("https://kyf.furia.gg/").confirm_url("abc"),
            "https://kyf.furia.gg/api/user/confirm?token=abc"
        );
        assert_eq!(
            config("http://localhost:3000").confirm_url("abc"),
            "http://localhost:3000/api/user/confirm?token=abc"
        );
    }
}
