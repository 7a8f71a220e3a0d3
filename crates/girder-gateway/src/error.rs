use thiserror::Error;

/// Errors that can occur during gateway operations
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Upstream provider returned an error (network, auth, or a
    /// malformed response body)
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Caller sent a request the gateway cannot dispatch
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A routing chain references a provider with no registered adapter
    #[error("unknown provider in routing chain: {0}")]
    UnknownProvider(String),

    /// Routing or provider configuration is internally inconsistent
    #[error("configuration error: {0}")]
    Config(String),

    /// Every provider in the chain was skipped or failed
    #[error("all providers in chain failed: {last}")]
    Exhausted {
        /// Message of the most recent underlying failure
        last: String,
    },

    /// Unexpected internal error
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
