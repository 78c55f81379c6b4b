//! Document vision check: asks a generative-AI model whether the CPF
//! printed on an uploaded document matches the account's CPF.
//!
//! # Providers
//!
//! - [`gemini::GeminiVerifier`]: Google Gemini `streamGenerateContent`
//! - [`fixed::FixedVerifier`]: canned reply, no network (tests, offline dev)
//!
//! The verdict is decided here, not by the provider: only a reply that is
//! exactly [`AFFIRMATIVE_REPLY`] after trimming and lowercasing counts.

pub mod fixed;
pub mod gemini;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

/// The only reply that validates a document.
pub const AFFIRMATIVE_REPLY: &str = "válido";

/// Errors from the vision provider.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("Vision provider error: {0}")]
    Provider(String),

    #[error("Vision config error: {0}")]
    Config(String),
}

/// Prompt plus inline image sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisionRequest {
    pub prompt: String,
    pub mime_type: &'static str,
    /// Standard base64 of the image bytes.
    pub data_base64: String,
}

impl VisionRequest {
    /// Build the CPF check for an image with the given extension.
    ///
    /// Returns `None` for anything that is not a PNG or JPEG.
    pub fn cpf_check(cpf: &str, extension: &str, image: &[u8]) -> Option<Self> {
        Some(Self {
            prompt: cpf_prompt(cpf),
            mime_type: mime_for_extension(extension)?,
            data_base64: STANDARD.encode(image),
        })
    }
}

/// Vision model client.
#[async_trait]
pub trait DocumentVerifier: Send + Sync {
    /// Send the request once and return the model's full textual reply.
    async fn ask(&self, request: &VisionRequest) -> Result<String, VerifyError>;
}

/// Fixed instruction asking the model for a one-word verdict.
pub fn cpf_prompt(cpf: &str) -> String {
    format!(
        "Verifique se o CPF presente na imagem/documento corresponde ao CPF: {cpf}. \
         Responda apenas \"válido\" ou \"inválido\"."
    )
}

/// MIME type for the image extensions the model accepts.
pub fn mime_for_extension(extension: &str) -> Option<&'static str> {
    match extension {
        ".png" => Some("image/png"),
        ".jpg" | ".jpeg" => Some("image/jpeg"),
        _ => None,
    }
}

/// Trim and lowercase a raw model reply.
pub fn normalize_reply(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Whether a normalized reply validates the document.
pub fn is_affirmative(normalized: &str) -> bool {
    normalized == AFFIRMATIVE_REPLY
}
