/// Errors that can occur when resolving or calling an AI provider.
///
/// Every crate in the workspace shares this enum so the selection service can
/// pass adapter errors through unchanged and callers see one error surface
/// regardless of which adapter produced it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Active provider / model configuration is missing or inconsistent.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Missing or rejected API key.
    #[error("{provider}: authentication failed (check the {env_var} environment variable)")]
    Authentication { provider: String, env_var: String },

    /// Upstream throttling (HTTP 429).
    #[error("{provider}: rate limit exceeded, please try again later")]
    RateLimit { provider: String },

    /// 5xx from the vendor.
    #[error("{provider}: service is temporarily unavailable, please try again later")]
    Unavailable { provider: String },

    /// The upstream call did not complete within the client timeout.
    #[error("{provider}: request timed out")]
    Timeout { provider: String },

    /// The provider or model cannot perform the requested operation.
    #[error("{provider} does not support {capability}")]
    Unsupported { provider: String, capability: String },

    /// The vendor reply could not be parsed as JSON, even after repair.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Parsed JSON does not match the canonical analysis shape.
    #[error("invalid response shape: {0}")]
    InvalidShape(String),

    /// Generic analysis failure with a provider-named message.
    #[error("{0}")]
    Analysis(String),

    /// Transport-level failure.
    #[error("http error: {0}")]
    Http(Box<dyn std::error::Error + Send + Sync>),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }

    pub fn auth(provider: impl Into<String>, env_var: impl Into<String>) -> Self {
        Error::Authentication {
            provider: provider.into(),
            env_var: env_var.into(),
        }
    }

    pub fn unsupported(provider: impl Into<String>, capability: impl Into<String>) -> Self {
        Error::Unsupported {
            provider: provider.into(),
            capability: capability.into(),
        }
    }

    pub fn analysis(msg: impl Into<String>) -> Self {
        Error::Analysis(msg.into())
    }

    pub fn malformed(detail: impl Into<String>) -> Self {
        Error::MalformedResponse(detail.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
