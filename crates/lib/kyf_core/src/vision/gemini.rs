//! Google Gemini provider.
//!
//! Calls `models/{model}:streamGenerateContent?alt=sse` once, with no retry,
//! and concatenates the text parts of every streamed chunk.

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{DocumentVerifier, VerifyError, VisionRequest};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Default model used when none is configured.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-pro";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum RequestPart<'a> {
    Text(&'a str),
    InlineData {
        #[serde(rename = "mimeType")]
        mime_type: &'a str,
        data: &'a str,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
struct GenerateChunk {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ChunkContent>,
}

#[derive(Deserialize)]
struct ChunkContent {
    #[serde(default)]
    parts: Vec<ChunkPart>,
}

#[derive(Deserialize)]
struct ChunkPart {
    text: Option<String>,
}

/// Text carried by one streamed chunk (`data:` payload of an SSE event).
fn chunk_text(data: &str) -> Result<String, VerifyError> {
    let chunk: GenerateChunk = serde_json::from_str(data)
        .map_err(|e| VerifyError::Provider(format!("Gemini chunk parse error: {e}")))?;
    Ok(chunk
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .filter_map(|p| p.text)
        .collect())
}

fn request_body(request: &VisionRequest) -> GenerateRequest<'_> {
    GenerateRequest {
        contents: vec![RequestContent {
            role: "user",
            parts: vec![
                RequestPart::Text(&request.prompt),
                RequestPart::InlineData {
                    mime_type: request.mime_type,
                    data: &request.data_base64,
                },
            ],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "text/plain",
        },
    }
}

/// Gemini vision client.
#[derive(Debug, Clone)]
pub struct GeminiVerifier {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiVerifier {
    pub fn new(
        client: Client,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, VerifyError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(VerifyError::Config(
                "GEMINI_API_KEY is required for the gemini verifier".into(),
            ));
        }
        Ok(Self {
            client,
            api_key,
            model: model.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{GEMINI_API_BASE}/{}:streamGenerateContent?alt=sse",
            self.model
        )
    }
}

#[async_trait]
impl DocumentVerifier for GeminiVerifier {
    async fn ask(&self, request: &VisionRequest) -> Result<String, VerifyError> {
        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("Accept", "text/event-stream")
            .json(&request_body(request))
            .send()
            .await
            .map_err(|e| VerifyError::Provider(format!("Gemini request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(VerifyError::Provider(format!(
                "Gemini generateContent failed: {status} {body}"
            )));
        }

        let mut events = sse_stream::SseStream::from_bytes_stream(resp.bytes_stream());
        let mut reply = String::new();
        while let Some(event) = events.next().await {
            let event =
                event.map_err(|e| VerifyError::Provider(format!("Gemini stream error: {e}")))?;
            let Some(data) = event.data.as_deref() else {
                continue;
            };
            match chunk_text(data) {
                Ok(text) => reply.push_str(&text),
                Err(e) => warn!("skipping Gemini chunk: {e}"),
            }
        }

        debug!(model = %self.model, reply = %reply, "Gemini reply received");
        Ok(reply)
    }
}
