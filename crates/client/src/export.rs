// Board export
//
// Sends the full board to the hosted renderer and returns the document
// bytes with the filename the service suggested.

use std::path::Path;

use regex::Regex;

use harada_engine::snapshot::ExportSnapshot;
use harada_protocol::{ExportRequest, DEFAULT_EXPORT_FILENAME, GENERATE_PDF_PATH};

use crate::error::ClientError;
use crate::http::{build_http, check_status};

/// A rendered board document.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedDocument {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: Option<String>,
}

/// Client for the hosted `/api/generate-pdf` endpoint.
pub struct ExportClient {
    http: reqwest::blocking::Client,
    base_url: String,
    default_filename: String,
}

impl ExportClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            http: build_http()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            default_filename: DEFAULT_EXPORT_FILENAME.to_string(),
        })
    }

    /// Filename used when the response does not suggest one.
    pub fn with_default_filename(mut self, name: &str) -> Self {
        if !name.trim().is_empty() {
            self.default_filename = name.trim().to_string();
        }
        self
    }

    /// The exact JSON body `export` would send.
    pub fn request_body(snapshot: &ExportSnapshot) -> ExportRequest {
        ExportRequest::new(&snapshot.cells, &snapshot.values)
    }

    pub fn export(&self, snapshot: &ExportSnapshot) -> Result<ExportedDocument, ClientError> {
        let url = format!("{}{}", self.base_url, GENERATE_PDF_PATH);
        let body = Self::request_body(snapshot);

        log::debug!(
            "POST {} ({} cells, {} filled)",
            url,
            body.cells.len(),
            snapshot.filled_count()
        );
        let response = check_status(self.http.post(&url).json(&body).send()?)?;

        let headers = response.headers();
        let filename = filename_from_disposition(
            headers
                .get(reqwest::header::CONTENT_DISPOSITION)
                .and_then(|v| v.to_str().ok()),
            &self.default_filename,
        );
        let content_type = headers
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response.bytes()?.to_vec();
        if bytes.is_empty() {
            return Err(ClientError::InvalidResponse("empty document".to_string()));
        }
        log::info!("Exported {} ({} bytes)", filename, bytes.len());

        Ok(ExportedDocument {
            bytes,
            filename,
            content_type,
        })
    }
}

/// Filename from a `Content-Disposition` header, or `fallback`.
///
/// Only the final path component is kept.
pub fn filename_from_disposition(header: Option<&str>, fallback: &str) -> String {
    let re = Regex::new(r#"filename="?([^";]+)"?"#).ok();
    header
        .zip(re.as_ref())
        .and_then(|(h, re)| re.captures(h))
        .and_then(|caps| caps.get(1))
        .and_then(|m| Path::new(m.as_str().trim()).file_name().map(|n| n.to_string_lossy().to_string()))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}
