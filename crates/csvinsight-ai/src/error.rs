/// Failures of a single AI provider call.
///
/// Each variant maps to one distinct failure condition so callers and tests
/// can tell a misconfiguration from an upstream outage.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    /// No credential configured. Raised before any network traffic.
    #[error("{env_var} is not set")]
    MissingApiKey { env_var: &'static str },

    /// Upstream answered with a non-success status. `message` is the
    /// upstream's own `error.message` when one was provided.
    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// Upstream answered 2xx but without any usable message content.
    #[error("{provider} response did not include insights content")]
    MissingContent { provider: &'static str },

    /// Upstream answered 2xx with a body that is not a chat completion.
    #[error("{provider} response could not be parsed: {source}")]
    InvalidResponse {
        provider: &'static str,
        source: serde_json::Error,
    },

    /// Network-level failure (DNS, connect, timeout, reset).
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

impl AiError {
    /// True for failures caused by local configuration rather than the upstream.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingApiKey { .. })
    }
}
