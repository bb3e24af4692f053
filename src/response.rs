//! Response targets and the status-attachment capability.
//!
//! The dispatcher never returns decoded data; it decodes *into* caller-owned
//! targets and attaches the server-reported status to the success target
//! through the [`StatusAware`] capability. This module provides that trait,
//! the [`NoContent`] marker for calls whose response body is irrelevant, and
//! the [`ApiErrors`] shape the server uses for application-level failures.

use std::collections::HashMap;

use http::StatusCode;
use serde::{Deserialize, Serialize};

/// Capability for response targets that can have an HTTP status attached.
///
/// Every success target must implement this. The dispatcher calls
/// [`set_status`](StatusAware::set_status) unconditionally once a response
/// has been classified, on the error branch too, and even when decoding
/// failed; the attached status alone does not mean the body was decoded.
///
/// The status is `Option<StatusCode>` rather than a bare code: `None` means
/// "no response was ever received" (transport failure), which is distinct
/// from any real status a server could send.
///
/// # Status-only targets
///
/// Some calls only care about the status line (the original DELETE endpoint
/// answers with a non-JSON body). Such targets set
/// [`STATUS_ONLY`](StatusAware::STATUS_ONLY) to `true` and the dispatcher
/// skips body decoding entirely; the flag is part of the capability, so new
/// status-only shapes need no special-casing anywhere else.
///
/// # Examples
///
/// ```
/// use accountable::StatusAware;
/// use http::StatusCode;
///
/// #[derive(Default)]
/// struct Ping {
///     status: Option<StatusCode>,
/// }
///
/// impl StatusAware for Ping {
///     fn set_status(&mut self, status: StatusCode) {
///         self.status = Some(status);
///     }
///
///     fn status(&self) -> Option<StatusCode> {
///         self.status
///     }
/// }
///
/// let mut ping = Ping::default();
/// assert_eq!(ping.status(), None);
/// ping.set_status(StatusCode::OK);
/// assert!(ping.is_success());
/// ```
pub trait StatusAware {
    /// When `true`, the dispatcher skips body decoding for this target and
    /// only attaches the status.
    const STATUS_ONLY: bool = false;

    /// Attaches the server-reported status code.
    fn set_status(&mut self, status: StatusCode);

    /// Returns the attached status, or `None` if no response was received.
    fn status(&self) -> Option<StatusCode>;

    /// Returns `true` if a status was attached and it is in `[200, 299]`.
    fn is_success(&self) -> bool {
        self.status().is_some_and(|s| s.is_success())
    }
}

/// Success target for calls where only the status matters.
///
/// The dispatcher never decodes a body into this type
/// (`STATUS_ONLY = true`), so it works against endpoints that answer with an
/// empty or non-JSON body.
///
/// # Examples
///
/// ```
/// use accountable::{NoContent, StatusAware};
/// use http::StatusCode;
///
/// let mut target = NoContent::default();
/// target.set_status(StatusCode::CONFLICT);
/// assert_eq!(target.status(), Some(StatusCode::CONFLICT));
/// assert!(!target.is_success());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct NoContent {
    #[serde(skip)]
    status: Option<StatusCode>,
}

impl StatusAware for NoContent {
    const STATUS_ONLY: bool = true;

    fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    fn status(&self) -> Option<StatusCode> {
        self.status
    }
}

/// A single application-level error message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code, when the server provides one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Human-readable error message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Application-level errors decoded from a non-2xx response body.
///
/// This is the error-target shape the API uses: validation problems keyed by
/// field name plus errors that apply to the request as a whole. It is data,
/// not an `Err`; `call()` returns `Ok` after populating it, and the caller
/// inspects it explicitly.
///
/// # Examples
///
/// ```
/// use accountable::ApiErrors;
///
/// let errors: ApiErrors = serde_json::from_str(
///     r#"{"generalErrors":[{"message":"invalid version"}]}"#,
/// ).unwrap();
///
/// assert!(!errors.is_empty());
/// assert_eq!(
///     errors.general_errors[0].message.as_deref(),
///     Some("invalid version"),
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiErrors {
    /// Field-level validation errors, keyed by field name.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub field_errors: HashMap<String, Vec<ErrorDetail>>,

    /// Errors that apply to the request as a whole.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub general_errors: Vec<ErrorDetail>,
}

impl ApiErrors {
    /// Returns `true` if the server reported no errors at all.
    pub fn is_empty(&self) -> bool {
        self.field_errors.is_empty() && self.general_errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_content_skips_decoding() {
        assert!(NoContent::STATUS_ONLY);
    }

    #[test]
    fn status_none_until_attached() {
        let mut target = NoContent::default();
        assert_eq!(target.status(), None);
        assert!(!target.is_success());

        target.set_status(StatusCode::OK);
        assert_eq!(target.status(), Some(StatusCode::OK));
        assert!(target.is_success());
    }

    #[test]
    fn non_2xx_is_not_success() {
        let mut target = NoContent::default();
        target.set_status(StatusCode::CONFLICT);
        assert!(!target.is_success());
    }

    #[test]
    fn api_errors_decode_field_and_general() {
        let body = r#"{
            "fieldErrors": {
                "country": [{"code": "required", "message": "country is required"}]
            },
            "generalErrors": [{"message": "invalid version"}]
        }"#;

        let errors: ApiErrors = serde_json::from_str(body).unwrap();
        assert!(!errors.is_empty());
        assert_eq!(errors.field_errors["country"][0].code.as_deref(), Some("required"));
        assert_eq!(
            errors.general_errors[0].message.as_deref(),
            Some("invalid version"),
        );
    }

    #[test]
    fn api_errors_tolerate_missing_sections() {
        let errors: ApiErrors = serde_json::from_str("{}").unwrap();
        assert!(errors.is_empty());

        let errors: ApiErrors =
            serde_json::from_str(r#"{"generalErrors":[{"code":"conflict"}]}"#).unwrap();
        assert!(!errors.is_empty());
        assert!(errors.field_errors.is_empty());
    }

    #[test]
    fn api_errors_round_trip_omits_empty_sections() {
        let errors = ApiErrors::default();
        assert_eq!(serde_json::to_string(&errors).unwrap(), "{}");
    }
}
