/// Error from the assist or export services.
///
/// None of these touch the board: a failed request leaves every cell as it was.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientError {
    /// Service not configured (provider disabled, no base URL)
    NotConfigured(String),
    /// API key missing
    MissingKey,
    /// Network error
    Network(String),
    /// Non-success HTTP status
    Http { status: u16, message: String },
    /// Response body could not be decoded
    Parse(String),
    /// Response decoded but carried no usable content
    InvalidResponse(String),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::NotConfigured(msg) => write!(f, "Not configured: {}", msg),
            ClientError::MissingKey => write!(f, "API key not configured"),
            ClientError::Network(msg) => write!(f, "Network error: {}", msg),
            ClientError::Http { status, message } => write!(f, "HTTP {}: {}", status, message),
            ClientError::Parse(msg) => write!(f, "Failed to parse response: {}", msg),
            ClientError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::Parse(e.to_string())
        } else {
            ClientError::Network(e.to_string())
        }
    }
}
