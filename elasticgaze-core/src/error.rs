//! Error taxonomy shared by every ElasticGaze operation
//!
//! - `AuthError`: credential problems detected before any request is sent
//! - `GazeError`: transport, status, decoding, validation and configuration failures,
//!   optionally wrapped with the endpoint that produced them

use crate::fetch::Endpoint;

/// Authentication setup failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("{missing} required for {method} authentication")]
    MissingCredentials {
        method: &'static str,
        missing: &'static str,
    },
    #[error("unsupported authentication method: {0}")]
    UnsupportedAuthMethod(String),
}

/// Errors raised while talking to a cluster
#[derive(Debug, thiserror::Error)]
pub enum GazeError {
    #[error("request to {url} failed: {source}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("authentication setup failed: {0}")]
    AuthSetup(#[from] AuthError),
    #[error("unexpected status code {status} from {url}: {body}")]
    HttpStatus { url: String, status: u16, body: String },
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{field}: {message}")]
    Validation { field: &'static str, message: String },
    #[error("failed to fetch {endpoint}: {source}")]
    Endpoint {
        endpoint: Endpoint,
        #[source]
        source: Box<GazeError>,
    },
    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T, E = GazeError> = std::result::Result<T, E>;

impl GazeError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        GazeError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Attach the endpoint that failed
    pub fn at(self, endpoint: Endpoint) -> Self {
        GazeError::Endpoint {
            endpoint,
            source: Box::new(self),
        }
    }

    /// The underlying error, without endpoint context
    pub fn root(&self) -> &GazeError {
        match self {
            GazeError::Endpoint { source, .. } => source.root(),
            other => other,
        }
    }

    /// Endpoint that failed, if the error carries one
    pub fn endpoint(&self) -> Option<Endpoint> {
        match self {
            GazeError::Endpoint { endpoint, .. } => Some(*endpoint),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.root(), GazeError::Connection { source, .. } if source.is_timeout())
    }

    /// Stable machine-readable code (e.g. `CONNECTION_ERROR`, `HTTP_503`)
    pub fn code(&self) -> String {
        match self {
            GazeError::Endpoint { source, .. } => source.code(),
            GazeError::Connection { source, .. } if source.is_timeout() => "TIMEOUT_ERROR".into(),
            GazeError::Connection { .. } => "CONNECTION_ERROR".into(),
            GazeError::AuthSetup(_) => "AUTH_ERROR".into(),
            GazeError::HttpStatus { status, .. } => format!("HTTP_{status}"),
            GazeError::Decode { .. } => "DECODE_ERROR".into(),
            GazeError::Validation { .. } => "VALIDATION_ERROR".into(),
            GazeError::Config(_) => "CONFIG_ERROR".into(),
        }
    }
}
