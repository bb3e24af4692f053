//! Fluent request builder and response dispatcher.
//!
//! [`ApiRequest`] is the core of the crate. Configuration calls accumulate
//! method, path, headers, query parameters and an encoded body without
//! performing any I/O or failing; [`call`](ApiRequest::call) then executes
//! exactly one network round trip, classifies the response by status code,
//! decodes into the caller's borrowed targets, and attaches the status to the
//! success target. Because `call` consumes the builder, a builder can never
//! be dispatched twice; a fresh one is created per request.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Version};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::error::{Error, Result};
use crate::response::StatusAware;

/// A query parameter value, drawn from a small closed set of variants.
///
/// Scalars produce a single `key=value` entry using their canonical string
/// form. A sequence expands to one entry per element under the same key, in
/// element order (the repeated-key convention for multi-value filters).
///
/// # Examples
///
/// ```
/// use accountable::QueryValue;
///
/// assert_eq!(QueryValue::from(100u32), QueryValue::Int(100));
/// assert_eq!(QueryValue::from(true), QueryValue::Bool(true));
/// assert_eq!(
///     QueryValue::from(vec!["GBDSC", "GBDSD"]),
///     QueryValue::Seq(vec!["GBDSC".to_string(), "GBDSD".to_string()]),
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    /// A literal string value.
    Str(String),
    /// An integer, rendered in decimal.
    Int(i64),
    /// A boolean, rendered as `true` / `false`.
    Bool(bool),
    /// One query entry per element under the same key, order-preserving.
    Seq(Vec<String>),
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Str(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Str(value)
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Int(value)
    }
}

impl From<i32> for QueryValue {
    fn from(value: i32) -> Self {
        QueryValue::Int(value.into())
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        QueryValue::Int(value.into())
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Bool(value)
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(values: Vec<String>) -> Self {
        QueryValue::Seq(values)
    }
}

impl From<Vec<&str>> for QueryValue {
    fn from(values: Vec<&str>) -> Self {
        QueryValue::Seq(values.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for QueryValue {
    fn from(values: &[&str]) -> Self {
        QueryValue::Seq(values.iter().map(|v| v.to_string()).collect())
    }
}

/// A single API request under construction.
///
/// Created by [`Client::request`](crate::Client::request) or
/// [`Client::request_anonymous`](crate::Client::request_anonymous), seeded
/// with the client's base URL, default headers, and (for authenticated
/// requests) the authorization token. The builder holds exclusive borrows of
/// the caller's success and error targets for its whole lifetime and
/// populates them during [`call`](Self::call).
///
/// Configuration methods consume and return the builder and never fail;
/// anything fallible (verb parsing, header validation, body encoding) is
/// surfaced by `call` before I/O.
///
/// # Examples
///
/// ```no_run
/// use accountable::{ApiErrors, Client, NoContent, StatusAware};
/// use http::Method;
///
/// # async fn example() -> Result<(), accountable::Error> {
/// let client = Client::builder()
///     .base_url("https://api.example.com/v1")?
///     .build()?;
///
/// let mut outcome = NoContent::default();
/// let mut errors = ApiErrors::default();
/// client
///     .request(&mut outcome, Some(&mut errors))
///     .path("/organisation/accounts")
///     .path_segment("ad27e265-9605-4b4b-a0e5-3003ea9cc4dc")
///     .query("version", 0)
///     .method(Method::DELETE)
///     .call()
///     .await?;
///
/// if !outcome.is_success() {
///     eprintln!("Delete rejected: {:?}", errors);
/// }
/// # Ok(())
/// # }
/// ```
pub struct ApiRequest<'a, S, E> {
    http_client: reqwest::Client,
    url: Url,
    method: String,
    headers: HashMap<String, String>,
    body: Option<Vec<u8>>,
    encode_err: Option<Error>,
    timeout: Option<Duration>,
    debug: bool,
    success: &'a mut S,
    error: Option<&'a mut E>,
}

impl<'a, S, E> ApiRequest<'a, S, E> {
    pub(crate) fn new(
        http_client: reqwest::Client,
        url: Url,
        timeout: Option<Duration>,
        debug: bool,
        success: &'a mut S,
        error: Option<&'a mut E>,
    ) -> Self {
        Self {
            http_client,
            url,
            method: Method::GET.as_str().to_string(),
            headers: HashMap::new(),
            body: None,
            encode_err: None,
            timeout,
            debug,
            success,
            error,
        }
    }

    /// Sets the HTTP verb for this request.
    ///
    /// The verb is stored verbatim, with no legality check at set time. A
    /// verb the transport cannot represent surfaces as
    /// [`Error::InvalidRequest`] from [`call`](Self::call), before any I/O.
    pub fn method(mut self, method: impl AsRef<str>) -> Self {
        self.method = method.as_ref().to_string();
        self
    }

    /// Joins `path` onto the request path unconditionally.
    ///
    /// Used for the fixed resource-collection portion of a URL. The join is
    /// normalized (duplicate separators are collapsed) and the base URL's
    /// own path prefix is preserved.
    pub fn path(mut self, path: impl AsRef<str>) -> Self {
        let joined = join_path(self.url.path(), path.as_ref());
        self.url.set_path(&joined);
        self
    }

    /// Appends `segment` to the request path if it is non-empty.
    ///
    /// An empty segment leaves the path unchanged, which permits optional
    /// resource identifiers at call sites.
    pub fn path_segment(self, segment: impl AsRef<str>) -> Self {
        let segment = segment.as_ref();
        if segment.is_empty() {
            return self;
        }
        self.path(segment)
    }

    /// Inserts or overwrites a header (last-write-wins).
    ///
    /// Header names are case-insensitive, so keys are normalized to
    /// lowercase before insertion; overwrites behave the same regardless of
    /// spelling. An invalid name or value surfaces as
    /// [`Error::InvalidRequest`] from [`call`](Self::call).
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.as_ref().to_string());
        self
    }

    /// Sets the `Authorization` header to `token`, verbatim.
    ///
    /// An empty token is a no-op: anonymous calls are made by configuring
    /// the client with an empty token, not through a separate code path. The
    /// token is sent as-is; include a scheme prefix such as `Bearer ` if the
    /// API expects one.
    pub fn authorization(self, token: impl AsRef<str>) -> Self {
        let token = token.as_ref();
        if token.is_empty() {
            return self;
        }
        self.header("authorization", token)
    }

    /// Adds a query parameter.
    ///
    /// A [`QueryValue::Seq`] adds one entry per element under `key`, in
    /// order; scalar variants add a single entry in canonical string form.
    /// Keys and values are percent-encoded by the URL query serializer.
    pub fn query(mut self, key: impl AsRef<str>, value: impl Into<QueryValue>) -> Self {
        let key = key.as_ref();
        match value.into() {
            QueryValue::Seq(values) => {
                // An empty sequence adds nothing; skip the serializer so the
                // URL does not pick up a dangling `?`.
                if values.is_empty() {
                    return self;
                }
                let mut pairs = self.url.query_pairs_mut();
                for value in &values {
                    pairs.append_pair(key, value);
                }
            }
            QueryValue::Str(value) => {
                self.url.query_pairs_mut().append_pair(key, &value);
            }
            QueryValue::Int(value) => {
                self.url.query_pairs_mut().append_pair(key, &value.to_string());
            }
            QueryValue::Bool(value) => {
                self.url
                    .query_pairs_mut()
                    .append_pair(key, if value { "true" } else { "false" });
            }
        }
        self
    }

    /// Serializes `payload` to JSON and sets it as the request body.
    ///
    /// Also ensures the `Accept` header is `application/vnd.api+json`. No
    /// `Content-Type` is set implicitly; add one via
    /// [`header`](Self::header) if the API requires it. Encoding happens
    /// eagerly, but a failure is stashed and returned by
    /// [`call`](Self::call) as [`Error::EncodeFailed`] before any I/O, so
    /// the configuration chain itself never fails.
    pub fn json_body<T: Serialize + ?Sized>(mut self, payload: &T) -> Self {
        match serde_json::to_vec(payload) {
            Ok(bytes) => self.body = Some(bytes),
            Err(e) => self.encode_err = Some(Error::EncodeFailed(e.to_string())),
        }
        self.header("accept", "application/vnd.api+json")
    }

    /// Executes the request and dispatches the response into the targets.
    ///
    /// Exactly one network round trip. The response is classified by status:
    /// codes in `[200, 299]` decode the body into the success target (unless
    /// the target is status-only); any other code decodes the body into the
    /// error target when one was supplied, and is *not* an `Err`. Callers
    /// detect application failure by inspecting the error target, not the
    /// returned `Result`.
    ///
    /// Whenever a response was received the status is attached to the
    /// *success* target, on both branches, even when decoding failed. On
    /// transport failure no response exists and the target's status stays
    /// `None`.
    ///
    /// # Errors
    ///
    /// * [`Error::EncodeFailed`] / [`Error::InvalidRequest`] - before any
    ///   I/O is attempted.
    /// * [`Error::Network`] - the round trip failed; no status is attached.
    /// * [`Error::DecodeFailed`] - a response body did not parse into the
    ///   expected target; the status has already been attached.
    pub async fn call(self) -> Result<()>
    where
        S: StatusAware + DeserializeOwned,
        E: DeserializeOwned,
    {
        let ApiRequest {
            http_client,
            url,
            method,
            headers,
            body,
            encode_err,
            timeout,
            debug,
            success,
            error,
        } = self;

        if let Some(err) = encode_err {
            return Err(err);
        }

        let method = Method::from_bytes(method.as_bytes())
            .map_err(|_| Error::InvalidRequest(format!("Malformed HTTP verb {:?}", method)))?;

        let mut header_map = HeaderMap::new();
        for (name, value) in &headers {
            let header_name = HeaderName::try_from(name.as_str())
                .map_err(|_| Error::InvalidRequest(format!("Invalid header name {:?}", name)))?;
            let header_value = HeaderValue::try_from(value.as_str())
                .map_err(|_| Error::InvalidRequest(format!("Invalid value for header {:?}", name)))?;
            header_map.insert(header_name, header_value);
        }

        let mut request = http_client
            .request(method.clone(), url.clone())
            .headers(header_map);

        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        if let Some(body) = body {
            request = request.body(body);
        }

        tracing::debug!(method = %method, url = %url, "Executing request");

        let start = Instant::now();
        let response = request.send().await?;

        let status = response.status();
        let version = response.version();
        let response_headers = response.headers().clone();
        let raw_body = response.text().await?;
        let latency = start.elapsed();

        tracing::info!(
            status = status.as_u16(),
            latency_ms = latency.as_millis(),
            "Received response"
        );

        if debug {
            tracing::debug!(
                "Raw response:\n{}",
                dump_response(version, status, &response_headers, &raw_body)
            );
        }

        let result = if status.is_success() {
            if S::STATUS_ONLY {
                Ok(())
            } else {
                decode_into(&mut *success, &raw_body, status)
            }
        } else {
            tracing::warn!(
                status = status.as_u16(),
                method = %method,
                url = %url,
                "Server reported an application error"
            );
            match error {
                Some(target) => decode_into(target, &raw_body, status),
                None => Ok(()),
            }
        };

        success.set_status(status);
        result
    }
}

/// Decodes `body` as JSON into `target`, preserving the raw body and status
/// when it does not parse.
fn decode_into<T: DeserializeOwned>(target: &mut T, body: &str, status: StatusCode) -> Result<()> {
    match serde_json::from_str::<T>(body) {
        Ok(decoded) => {
            *target = decoded;
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, raw_response = %body, "Failed to decode response");
            Err(Error::DecodeFailed {
                raw_response: body.to_string(),
                serde_error: e.to_string(),
                status,
            })
        }
    }
}

/// Joins `part` onto `base` with single separators, keeping `base`'s prefix.
///
/// Empty parts (and empty components inside `part`) are dropped, so the
/// result never contains duplicate separators or a trailing slash.
fn join_path(base: &str, part: &str) -> String {
    let mut joined = base.trim_end_matches('/').to_string();
    for segment in part.split('/').filter(|s| !s.is_empty()) {
        joined.push('/');
        joined.push_str(segment);
    }
    joined
}

/// Renders the wire-level view of a response for the debug flag.
fn dump_response(version: Version, status: StatusCode, headers: &HeaderMap, body: &str) -> String {
    use std::fmt::Write;

    let mut dump = format!("{:?} {}\n", version, status);
    for (name, value) in headers {
        let _ = writeln!(dump, "{}: {}", name, value.to_str().unwrap_or("<opaque>"));
    }
    dump.push('\n');
    dump.push_str(body);
    dump
}
