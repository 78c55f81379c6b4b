//! Deterministic verifier that always gives the same reply.

use async_trait::async_trait;

use super::{DocumentVerifier, VerifyError, VisionRequest};

#[derive(Debug, Clone)]
pub struct FixedVerifier {
    reply: String,
}

impl FixedVerifier {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

#[async_trait]
impl DocumentVerifier for FixedVerifier {
    async fn ask(&self, _request: &VisionRequest) -> Result<String, VerifyError> {
        Ok(self.reply.clone())
    }
}
