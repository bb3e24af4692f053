//! # Accountable - a typed client for organisation-account APIs
//!
//! Accountable is a fluent, type-safe HTTP client for an organisation
//! accounts API, built on top of `reqwest`. Requests are composed with a
//! builder that performs no I/O until dispatch; responses are classified by
//! status code and decoded into targets the caller owns, so server-reported
//! failures stay inspectable data instead of becoming `Err`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use accountable::Client;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), accountable::Error> {
//!     let client = Client::builder()
//!         .base_url("https://api.example.com/v1")?
//!         .auth_token("api-key-123")
//!         .timeout(Duration::from_secs(30))
//!         .build()?;
//!
//!     // List one page of accounts.
//!     let page = client.list_accounts(1, 100).await?;
//!     println!("{} accounts on page 1", page.data.len());
//!
//!     // Fetch one of them by identifier.
//!     let account = client
//!         .fetch_account("ad27e265-9605-4b4b-a0e5-3003ea9cc4dc")
//!         .await?;
//!     println!("account country: {}", account.data.attributes.country);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Caller-owned decoding targets** - responses decode into `&mut` borrows handed to the builder; nothing is allocated behind the caller's back
//! - **Status-classifying dispatch** - 2xx decodes the success target, anything else decodes the error target; the status is attached to the success target on both branches
//! - **Application errors as data** - non-2xx answers are not `Err`; inspect the decoded errors and the attached status instead
//! - **Status-only calls** - [`NoContent`] skips body decoding for endpoints that answer with a bare status
//! - **Fluent, infallible configuration** - verbs, paths, headers, queries and JSON bodies accumulate without I/O; everything fallible surfaces from `call()` before the wire
//! - **Typed account operations** - create, fetch, list and delete wrappers over the same builder
//! - **Structured logging** - request and response observability with `tracing`
//! - **Injectable transport** - bring a preconfigured `reqwest::Client` for TLS, proxies and pooling
//!
//! ## Error Handling
//!
//! A response from the server is never an `Err`, whatever its status. `Err`
//! is reserved for the request pipeline itself: invalid configuration,
//! transport failure, a body that does not decode. Server-reported failures
//! land in the caller's targets, with the status attached to the success
//! target whenever a response was received at all:
//!
//! ```no_run
//! use accountable::{Client, StatusAware};
//!
//! # async fn example(client: &Client) -> Result<(), accountable::Error> {
//! // `?` here only propagates pipeline failures, never a rejected delete.
//! let (outcome, errors) = client
//!     .delete_account("ad27e265-9605-4b4b-a0e5-3003ea9cc4dc", 3)
//!     .await?;
//!
//! if outcome.is_success() {
//!     println!("deleted");
//! } else {
//!     eprintln!("Delete rejected with {:?}: {:?}", outcome.status(), errors);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Pipeline failures keep their diagnostic context: [`Error::DecodeFailed`]
//! preserves the raw response body and the serde message alongside the
//! status, which has already been attached to the success target by the
//! time the error is returned.
//!
//! ## Custom Calls
//!
//! Every typed account operation is a short composition over
//! [`Client::request`]; the same builder serves endpoints the crate does not
//! wrap. Configuration calls never fail and never touch the network, and
//! [`call`](ApiRequest::call) consumes the builder, so a request cannot be
//! dispatched twice:
//!
//! ```no_run
//! use accountable::{ApiErrors, Client, NoContent};
//! use http::Method;
//!
//! # async fn example(client: &Client) -> Result<(), accountable::Error> {
//! let mut outcome = NoContent::default();
//! let mut errors = ApiErrors::default();
//!
//! client
//!     .request(&mut outcome, Some(&mut errors))
//!     .path("/organisation/accounts")
//!     .path_segment("ad27e265-9605-4b4b-a0e5-3003ea9cc4dc")
//!     .query("version", 0)
//!     .method(Method::DELETE)
//!     .call()
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod request;
mod response;

pub mod accounts;

pub use client::{Client, ClientBuilder};
pub use error::{Error, Result};
pub use request::{ApiRequest, QueryValue};
pub use response::{ApiErrors, ErrorDetail, NoContent, StatusAware};
