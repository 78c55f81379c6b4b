//! Multipart upload pipeline.
//!
//! The request body is fed to `multer` chunk by chunk. Text parts land in a
//! field map. The first file part on the expected field is checked against
//! the extension allow-list before any of its bytes are read, then buffered
//! up to the size limit. Text parts are capped at [`MAX_TEXT_FIELD_BYTES`]
//! and the whole body at the file limit plus [`FORM_OVERHEAD_BYTES`].
//! Nothing is written here; callers persist the file with [`store_upload`]
//! after parsing succeeded.

use std::collections::HashMap;

use axum::body::Body;
use axum::http::HeaderMap;
use axum::http::header::CONTENT_TYPE;
use bytes::{Bytes, BytesMut};
use kyf_core::storage::{FileStore, UploadKind, extension_of};
use multer::{Constraints, Multipart, SizeLimit};
use thiserror::Error;
use tracing::debug;

use crate::error::AppError;

/// Largest accepted text part.
pub const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;

/// Room for text parts, skipped parts and multipart framing on top of the
/// file limit.
pub const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Errors from reading a multipart upload.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Request must be multipart/form-data")]
    NotMultipart,

    #[error("Unsupported file format; accepted: {accepted}")]
    UnsupportedFormat { accepted: String },

    #[error("Upload exceeds the {limit} byte limit")]
    TooLarge { limit: usize },

    #[error("Malformed multipart body: {0}")]
    Malformed(String),
}

impl From<UploadError> for AppError {
    fn from(e: UploadError) -> Self {
        match e {
            UploadError::NotMultipart | UploadError::Malformed(_) => {
                AppError::BadRequest(e.to_string())
            }
            UploadError::UnsupportedFormat { .. } => AppError::UnsupportedFormat(e.to_string()),
            UploadError::TooLarge { .. } => AppError::PayloadTooLarge(e.to_string()),
        }
    }
}

/// What an endpoint expects from the multipart body.
#[derive(Debug, Clone, Copy)]
pub struct UploadSpec {
    /// Form field carrying the file.
    pub file_field: &'static str,
    pub kind: UploadKind,
    pub max_bytes: usize,
}

/// File accepted by the pipeline, not yet written to disk.
#[derive(Debug, Clone)]
pub struct AcceptedFile {
    /// Filename declared by the client.
    pub file_name: String,
    /// Lowercased extension with the dot, already allow-listed.
    pub extension: String,
    pub bytes: Bytes,
}

/// Parsed multipart body.
#[derive(Debug, Default)]
pub struct ParsedUpload {
    pub fields: HashMap<String, String>,
    pub file: Option<AcceptedFile>,
}

impl ParsedUpload {
    /// Text field value, if submitted.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Reject anything that is not `multipart/form-data` with a boundary.
///
/// Runs before the body is touched.
pub fn multipart_boundary(headers: &HeaderMap) -> Result<String, UploadError> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or(UploadError::NotMultipart)?;
    if !content_type
        .to_ascii_lowercase()
        .starts_with("multipart/form-data")
    {
        return Err(UploadError::NotMultipart);
    }
    multer::parse_boundary(content_type).map_err(|_| UploadError::NotMultipart)
}

/// Whether the request declares a multipart body.
pub fn is_multipart(headers: &HeaderMap) -> bool {
    multipart_boundary(headers).is_ok()
}

/// Stream the body through the multipart parser.
///
/// Only the first file part named `spec.file_field` is kept; later file
/// parts, and file parts on other fields, are skipped without error.
pub async fn read_multipart(
    headers: &HeaderMap,
    body: Body,
    spec: UploadSpec,
) -> Result<ParsedUpload, UploadError> {
    let boundary = multipart_boundary(headers)?;
    let stream_limit = spec.max_bytes.saturating_add(FORM_OVERHEAD_BYTES);
    let constraints = Constraints::new()
        .size_limit(SizeLimit::new().whole_stream(stream_limit as u64));
    let mut multipart =
        Multipart::with_constraints(body.into_data_stream(), boundary, constraints);

    let mut parsed = ParsedUpload::default();
    let mut file_taken = false;

    while let Some(mut field) = multipart.next_field().await.map_err(parse_error)? {
        let name = field.name().unwrap_or_default().to_string();

        let Some(file_name) = field.file_name().map(str::to_string) else {
            let raw = read_capped(&mut field, MAX_TEXT_FIELD_BYTES).await?;
            let value = String::from_utf8(raw.to_vec()).map_err(|_| {
                UploadError::Malformed(format!("field `{name}` is not valid UTF-8"))
            })?;
            parsed.fields.insert(name, value);
            continue;
        };

        if name != spec.file_field || file_taken {
            debug!(field = %name, file_name = %file_name, "ignoring extra file part");
            continue;
        }
        file_taken = true;

        // Browsers send an empty part when no file was picked.
        if file_name.is_empty() {
            continue;
        }

        let extension = extension_of(&file_name)
            .filter(|ext| spec.kind.accepts(ext))
            .ok_or_else(|| UploadError::UnsupportedFormat {
                accepted: spec.kind.allowed_extensions().join(", "),
            })?;

        let bytes = read_capped(&mut field, spec.max_bytes).await?;
        parsed.file = Some(AcceptedFile {
            file_name,
            extension,
            bytes,
        });
    }

    Ok(parsed)
}

/// Write an accepted file under the upload area for `kind`.
pub async fn store_upload(
    files: &FileStore,
    kind: UploadKind,
    file: &AcceptedFile,
) -> Result<String, AppError> {
    Ok(files.save(kind, &file.extension, &file.bytes).await?)
}

/// Buffer one part, failing as soon as it grows past `limit`.
async fn read_capped(field: &mut multer::Field<'_>, limit: usize) -> Result<Bytes, UploadError> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = field.chunk().await.map_err(parse_error)? {
        if buf.len() + chunk.len() > limit {
            return Err(UploadError::TooLarge { limit });
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf.freeze())
}

fn parse_error(e: multer::Error) -> UploadError {
    match e {
        multer::Error::StreamSizeExceeded { limit }
        | multer::Error::FieldSizeExceeded { limit, .. } => UploadError::TooLarge {
            limit: usize::try_from(limit).unwrap_or(usize::MAX),
        },
        other => UploadError::Malformed(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const BOUNDARY: &str = "kyf-boundary";

    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a str, &'a [u8]),
    }

    fn multipart_request(parts: &[Part<'_>]) -> (HeaderMap, Body) {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                            .as_bytes(),
                    );
                }
                Part::File(name, file_name, bytes) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                             Content-Type: application/octet-stream\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(bytes);
                    body.extend_from_slice(b"\r\n");
                }
            }
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_str(&format!("multipart/form-data; boundary={BOUNDARY}")).unwrap(),
        );
        (headers, Body::from(body))
    }

    fn doc_spec() -> UploadSpec {
        UploadSpec {
            file_field: "file",
            kind: UploadKind::Document,
            max_bytes: 1024,
        }
    }

    #[test]
    fn rejects_non_multipart_content_types() {
        let mut headers = HeaderMap::new();
        assert!(matches!(
            multipart_boundary(&headers),
            Err(UploadError::NotMultipart)
        ));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        assert!(matches!(
            multipart_boundary(&headers),
            Err(UploadError::NotMultipart)
        ));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("multipart/form-data"));
        assert!(matches!(
            multipart_boundary(&headers),
            Err(UploadError::NotMultipart)
        ));
    }

    #[tokio::test]
    async fn collects_fields_and_first_file() {
        let (headers, body) = multipart_request(&[
            Part::Text("type", "RG"),
            Part::File("file", "frente.JPG", b"first"),
            Part::File("file", "verso.jpg", b"second"),
        ]);
        let parsed = read_multipart(&headers, body, doc_spec()).await.unwrap();

        assert_eq!(parsed.field("type"), Some("RG"));
        let file = parsed.file.unwrap();
        assert_eq!(file.file_name, "frente.JPG");
        assert_eq!(file.extension, ".jpg");
        assert_eq!(&file.bytes[..], b"first");
    }

    #[tokio::test]
    async fn later_bad_file_is_ignored_after_latch() {
        let (headers, body) = multipart_request(&[
            Part::File("file", "cpf.pdf", b"%PDF"),
            Part::File("file", "virus.exe", b"MZ"),
        ]);
        let parsed = read_multipart(&headers, body, doc_spec()).await.unwrap();
        assert_eq!(parsed.file.unwrap().extension, ".pdf");
    }

    #[tokio::test]
    async fn files_on_other_fields_are_skipped() {
        let (headers, body) = multipart_request(&[Part::File("other", "a.png", b"x")]);
        let parsed = read_multipart(&headers, body, doc_spec()).await.unwrap();
        assert!(parsed.file.is_none());
    }

    #[tokio::test]
    async fn disallowed_extension_fails() {
        for name in ["setup.exe", "notes.txt", "noext"] {
            let (headers, body) = multipart_request(&[Part::File("file", name, b"data")]);
            let err = read_multipart(&headers, body, doc_spec()).await.unwrap_err();
            assert!(
                matches!(err, UploadError::UnsupportedFormat { .. }),
                "{name}: {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn avatars_do_not_accept_pdf() {
        let (headers, body) = multipart_request(&[Part::File("photo", "me.pdf", b"%PDF")]);
        let spec = UploadSpec {
            file_field: "photo",
            kind: UploadKind::Avatar,
            max_bytes: 1024,
        };
        assert!(matches!(
            read_multipart(&headers, body, spec).await,
            Err(UploadError::UnsupportedFormat { .. })
        ));
    }

    #[tokio::test]
    async fn oversized_file_fails() {
        let big = vec![0u8; 2048];
        let (headers, body) = multipart_request(&[Part::File("file", "big.png", &big)]);
        assert!(matches!(
            read_multipart(&headers, body, doc_spec()).await,
            Err(UploadError::TooLarge { limit: 1024 })
        ));
    }

    #[tokio::test]
    async fn oversized_text_field_fails() {
        let long = "x".repeat(MAX_TEXT_FIELD_BYTES + 1);
        let (headers, body) = multipart_request(&[
            Part::Text("type", &long),
            Part::File("file", "rg.png", b"img"),
        ]);
        assert!(matches!(
            read_multipart(&headers, body, doc_spec()).await,
            Err(UploadError::TooLarge {
                limit: MAX_TEXT_FIELD_BYTES
            })
        ));
    }

    #[tokio::test]
    async fn body_past_the_stream_limit_fails() {
        let huge = "x".repeat(8 * 1024 * 1024);
        let (headers, body) = multipart_request(&[Part::Text("type", &huge)]);
        assert!(matches!(
            read_multipart(&headers, body, doc_spec()).await,
            Err(UploadError::TooLarge { .. })
        ));
    }

    #[tokio::test]
    async fn empty_file_part_counts_as_no_file() {
        let (headers, body) = multipart_request(&[
            Part::Text("name", "Ana"),
            Part::File("file", "", b""),
        ]);
        let parsed = read_multipart(&headers, body, doc_spec()).await.unwrap();
        assert!(parsed.file.is_none());
        assert_eq!(parsed.field("name"), Some("Ana"));
    }

    #[test]
    fn error_statuses() {
        use axum::http::StatusCode;
        assert_eq!(AppError::from(UploadError::NotMultipart).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::from(UploadError::TooLarge { limit: 1 }).status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            AppError::from(UploadError::UnsupportedFormat { accepted: String::new() }).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
