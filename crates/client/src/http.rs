//! Shared HTTP plumbing.

use std::time::Duration;

use harada_protocol::ErrorBody;

use crate::error::ClientError;

pub(crate) const TIMEOUT: Duration = Duration::from_secs(60);

pub(crate) fn build_http() -> Result<reqwest::blocking::Client, ClientError> {
    reqwest::blocking::Client::builder()
        .user_agent(format!("harada/{}", env!("CARGO_PKG_VERSION")))
        .timeout(TIMEOUT)
        .build()
        .map_err(|e| ClientError::Network(e.to_string()))
}

/// Pass 2xx responses through; turn anything else into `ClientError::Http`.
pub(crate) fn check_status(
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().unwrap_or_default();
    let message = error_message(&text);
    log::debug!("Service returned HTTP {}: {}", status.as_u16(), message);
    Err(ClientError::Http {
        status: status.as_u16(),
        message,
    })
}

/// Best-effort error text: `{"error": "..."}`, `{"error": {"message": "..."}}`, or raw body.
fn error_message(text: &str) -> String {
    if let Ok(body) = serde_json::from_str::<ErrorBody>(text) {
        return body.error;
    }
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(text) {
        if let Some(msg) = value["error"]["message"].as_str() {
            return msg.to_string();
        }
    }
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_shapes() {
        assert_eq!(error_message(r#"{"error":"Failed to generate"}"#), "Failed to generate");
        assert_eq!(
            error_message(r#"{"error":{"message":"Invalid key","type":"auth"}}"#),
            "Invalid key"
        );
        assert_eq!(error_message(" upstream down \n"), "upstream down");
    }
}
