use thiserror::Error;

/// # Market Data Error
///
/// Everything that can go wrong talking to an upstream market data source.
/// These never leave the fetch boundaries: callers log them and fall back to
/// "N/A".
#[derive(Debug, Error)]
pub enum MarketDataError {
    /// Network, TLS, URL or body decoding failure.
    #[error("transport failure: {0}")]
    Transport(#[from] anyhow::Error),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status} from {path}")]
    Http {
        /// Status code.
        status: u16,
        /// Request path relative to the client's base URL.
        path: String,
    },

    /// A 2xx answer without a usable body.
    #[error("empty response body from {0}")]
    EmptyBody(String),

    /// The body did not match the expected JSON schema.
    #[error("schema mismatch for {path}: {source}")]
    Schema {
        /// Request path.
        path: String,
        /// Underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },

    /// The upstream reported an error in its own payload.
    #[error("upstream error for {symbol}: {description}")]
    Upstream {
        /// Ticker the request was for.
        symbol: String,
        /// Upstream description.
        description: String,
    },

    /// All retry attempts failed.
    #[error("gave up on {path} after {attempts} attempts")]
    Exhausted {
        /// Request path.
        path: String,
        /// Attempts made.
        attempts: u32,
    },
}
