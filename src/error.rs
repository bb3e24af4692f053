//! Error types for API calls.
//!
//! This module covers the failures a call itself can hit: request
//! construction, the network round trip, and body encoding/decoding. A non-2xx
//! status is deliberately *not* represented here. The server's application
//! errors are decoded into the caller's error target as ordinary data (see
//! [`ApiErrors`](crate::ApiErrors)), and the call still returns `Ok`.

use http::StatusCode;

/// The main error type for API calls.
///
/// Only transport-level and codec-level failures appear as errors. When the
/// server answers with a status outside `[200, 299]`, `call()` decodes the
/// supplied error target and returns `Ok(())`; callers detect application
/// failure by inspecting that target and the status attached to the success
/// target, not the returned `Result`.
///
/// # Examples
///
/// ```no_run
/// use accountable::{Client, Error, StatusAware};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::builder()
///     .base_url("https://api.example.com/v1")?
///     .build()?;
///
/// match client.fetch_account("ad27e265-9605-4b4b-a0e5-3003ea9cc4dc").await {
///     Ok(account) => println!("status: {:?}", account.status()),
///     Err(Error::DecodeFailed { raw_response, serde_error, .. }) => {
///         eprintln!("Response did not parse: {}", serde_error);
///         eprintln!("Raw body: {}", raw_response);
///     }
///     Err(Error::Network(e)) => eprintln!("Transport failure: {}", e),
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A network-level error occurred (connection refused, DNS lookup failed,
    /// TLS handshake failed, timeout).
    ///
    /// This wraps the underlying `reqwest::Error` verbatim. No response was
    /// classified, so no status is attached to any target: the success
    /// target's status stays `None`, which is distinguishable from every
    /// real status code.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The request could not be constructed from the accumulated builder
    /// state (malformed HTTP verb, invalid header name or value).
    ///
    /// Returned before any I/O is attempted.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The request body could not be serialized to JSON.
    ///
    /// `json_body` encodes eagerly but the failure is surfaced by `call()`,
    /// before any I/O, so the configuration chain itself never fails.
    #[error("Failed to encode request body: {0}")]
    EncodeFailed(String),

    /// The response body did not parse as JSON into the expected target
    /// shape.
    ///
    /// By the time this is returned the status has already been attached to
    /// the success target.
    ///
    /// # Fields
    ///
    /// * `raw_response` - The raw response body as a string
    /// * `serde_error` - The error message from serde
    /// * `status` - The HTTP status code of the response
    #[error("Failed to decode response (status {status}): {serde_error}")]
    DecodeFailed {
        /// The raw response body that failed to decode
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: StatusCode,
    },

    /// Invalid client configuration (missing base URL, invalid default
    /// header).
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// An invalid URL was provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Returns the HTTP status code if this error has one.
    ///
    /// Only `DecodeFailed` carries a status; transport and construction
    /// failures happen before any status exists.
    ///
    /// # Examples
    ///
    /// ```
    /// use accountable::Error;
    /// use http::StatusCode;
    ///
    /// let err = Error::DecodeFailed {
    ///     raw_response: "OK".to_string(),
    ///     serde_error: "expected value".to_string(),
    ///     status: StatusCode::OK,
    /// };
    ///
    /// assert_eq!(err.status(), Some(StatusCode::OK));
    /// assert_eq!(Error::EncodeFailed("oops".to_string()).status(), None);
    /// ```
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::DecodeFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the raw response body if this error preserved one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::DecodeFailed { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }

    /// Returns `true` if this is a network-level transport failure.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Network(_))
    }

    /// Returns `true` if this error is a request timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Network(e) if e.is_timeout())
    }
}

/// A specialized `Result` type for API calls.
///
/// This is a convenience alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
