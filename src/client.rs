//! Endpoint client configuration and request seeding.
//!
//! The [`Client`] type is the main entry point: it owns the HTTP transport
//! and the per-session configuration (base URL, authorization token, default
//! headers, timeout, debug flag) and seeds one [`ApiRequest`] per call. Use
//! [`ClientBuilder`] to configure and create clients.

use std::sync::Arc;
use std::time::Duration;

use http::{HeaderName, HeaderValue};
use url::Url;

use crate::error::{Error, Result};
use crate::request::ApiRequest;

/// A client for a resource-oriented API, bound to one base URL.
///
/// The client is created once per session and is immutable afterwards. It is
/// cheap to clone (the transport and configuration live behind an `Arc`) and
/// safe to share across tasks: every call gets its own [`ApiRequest`], and
/// no mutable state crosses between them. Connection pooling is inherited
/// from the underlying `reqwest` transport.
///
/// # Examples
///
/// ```no_run
/// use accountable::Client;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), accountable::Error> {
/// let client = Client::builder()
///     .base_url("https://api.example.com/v1")?
///     .auth_token("api-key-123")
///     .timeout(Duration::from_secs(30))
///     .build()?;
///
/// let accounts = client.list_accounts(1, 100).await?;
/// println!("fetched {} accounts", accounts.data.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: Url,
    auth_token: String,
    default_headers: Vec<(String, String)>,
    timeout: Option<Duration>,
    debug: bool,
}

impl Client {
    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Seeds an authenticated request against the client's base URL.
    ///
    /// The returned builder starts with the client's default headers,
    /// `Accept: application/vnd.api+json`, and the `Authorization` header
    /// when the configured token is non-empty; a client built with an empty
    /// token issues anonymous requests through this same method.
    ///
    /// `success` and `error` are the decoding targets:
    /// [`call`](ApiRequest::call) populates exactly one of them (or neither,
    /// for a status-only `success`) and attaches the response status to
    /// `success`. Pass `None` for `error` when the error body is of no
    /// interest:
    ///
    /// ```no_run
    /// use accountable::{ApiErrors, Client, NoContent};
    /// use http::Method;
    ///
    /// # async fn example(client: &Client) -> Result<(), accountable::Error> {
    /// let mut probe = NoContent::default();
    /// client
    ///     .request::<_, ApiErrors>(&mut probe, None)
    ///     .path("/health")
    ///     .method(Method::GET)
    ///     .call()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn request<'a, S, E>(
        &self,
        success: &'a mut S,
        error: Option<&'a mut E>,
    ) -> ApiRequest<'a, S, E> {
        self.request_anonymous(success, error)
            .authorization(&self.inner.auth_token)
    }

    /// Seeds a request that never carries an `Authorization` header,
    /// regardless of the configured token.
    ///
    /// Otherwise identical to [`request`](Self::request).
    pub fn request_anonymous<'a, S, E>(
        &self,
        success: &'a mut S,
        error: Option<&'a mut E>,
    ) -> ApiRequest<'a, S, E> {
        let mut request = ApiRequest::new(
            self.inner.http_client.clone(),
            self.inner.base_url.clone(),
            self.inner.timeout,
            self.inner.debug,
            success,
            error,
        );
        for (name, value) in &self.inner.default_headers {
            request = request.header(name, value);
        }
        request.header("accept", "application/vnd.api+json")
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use accountable::ClientBuilder;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), accountable::Error> {
/// // A transport with custom settings (TLS identity, proxies, pool limits)
/// // can be injected; otherwise a default one is built.
/// let transport = reqwest::Client::builder()
///     .connect_timeout(Duration::from_secs(5))
///     .build()?;
///
/// let client = ClientBuilder::new()
///     .base_url("https://api.example.com/v1")?
///     .http_client(transport)
///     .default_header("User-Agent", "my-app/1.0")?
///     .timeout(Duration::from_secs(30))
///     .debug(true)
///     .build()?;
/// # let _ = client;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    base_url: Option<Url>,
    http_client: Option<reqwest::Client>,
    auth_token: String,
    default_headers: Vec<(String, String)>,
    timeout: Option<Duration>,
    debug: bool,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            base_url: None,
            http_client: None,
            auth_token: String::new(),
            default_headers: Vec::new(),
            timeout: None,
            debug: false,
        }
    }

    /// Sets the base URL all request paths resolve against.
    ///
    /// The URL must be absolute. A path prefix (such as `/v1`) is preserved
    /// when request paths are joined onto it.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not parse.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.base_url = Some(Url::parse(url.as_ref())?);
        Ok(self)
    }

    /// Injects a preconfigured HTTP transport.
    ///
    /// This is where TLS and mTLS setup, proxies, and pool policy belong;
    /// the client forwards requests to whatever transport it is given. When
    /// no transport is injected, [`build`](Self::build) creates a default
    /// one.
    pub fn http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// Sets the static authorization token sent with every authenticated
    /// request.
    ///
    /// The token is sent verbatim as the `Authorization` header value. An
    /// empty token (the default) means requests go out anonymous; there is
    /// no separate anonymous client type.
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = token.into();
        self
    }

    /// Adds a default header included in every request seeded by the client.
    ///
    /// Per-request headers with the same name overwrite defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = name.as_ref();
        let value = value.as_ref();
        HeaderName::try_from(name)
            .map_err(|e| Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
        HeaderValue::try_from(value)
            .map_err(|e| Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
        self.default_headers.push((name.to_string(), value.to_string()));
        Ok(self)
    }

    /// Sets the per-call timeout applied to every request.
    ///
    /// Without one, requests wait as long as the transport allows.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Enables or disables debug mode.
    ///
    /// When enabled, every completed call emits the raw wire-level response
    /// (status line, headers, body) to the `tracing` sink at debug level, as
    /// a side effect. The dump is never part of a return value.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if no base URL was provided, or if the default
    /// transport cannot be constructed.
    pub fn build(self) -> Result<Client> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::ConfigurationError("Base URL is required".to_string()))?;

        let http_client = match self.http_client {
            Some(http_client) => http_client,
            None => reqwest::Client::builder().build().map_err(|e| {
                Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
            })?,
        };

        Ok(Client {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                auth_token: self.auth_token,
                default_headers: self.default_headers,
                timeout: self.timeout,
                debug: self.debug,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
