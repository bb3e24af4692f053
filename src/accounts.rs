//! Account resources and the typed operations over them.
//!
//! The types here mirror the wire format of the organisation-accounts API:
//! `data`-wrapped envelopes, snake_case attributes, and a `type` discriminator
//! on every record. The `impl Client` block at the bottom provides the typed
//! endpoint operations; each one is a thin composition over
//! [`Client::request`](crate::Client::request) and owns its decoding targets,
//! so callers never see the builder unless they want custom calls.

use http::{Method, StatusCode};
use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::error::Result;
use crate::response::{ApiErrors, NoContent, StatusAware};

/// A single account record as the API returns it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Account {
    /// Record type discriminator, `"accounts"` for this resource.
    #[serde(rename = "type")]
    pub account_type: String,
    pub id: String,
    pub organisation_id: String,
    /// Concurrency-control version; required when deleting.
    pub version: i64,
    pub attributes: AccountAttributes,
}

/// The attribute set of an [`Account`].
///
/// The API omits attributes it has no value for, so decoding is lenient:
/// absent strings come back empty and absent optional fields come back
/// `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountAttributes {
    /// ISO 3166-1 country code.
    pub country: String,
    /// ISO 4217 currency code.
    pub base_currency: String,
    pub account_number: String,
    pub bank_id: i64,
    /// Clearing-system identifier for `bank_id`, e.g. `"GBDSC"`.
    pub bank_id_code: String,
    pub bic: String,
    pub iban: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_classification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joint_account: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_matching_opt_out: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alternative_bank_account_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_identification: Option<String>,
}

/// A new account to register, the payload of [`Client::create_account`].
///
/// Unlike [`Account`] there is no `version`; the server assigns version `0`
/// on creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewAccount {
    /// Record type discriminator, `"accounts"` for this resource.
    #[serde(rename = "type")]
    pub account_type: String,
    /// Client-generated identifier for the new account.
    pub id: String,
    pub organisation_id: String,
    pub attributes: NewAccountAttributes,
}

/// The attributes required when registering an account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewAccountAttributes {
    pub country: String,
    pub base_currency: String,
    pub bank_id: i64,
    pub bank_id_code: String,
    pub bic: String,
}

/// The `data`-wrapped request body for [`Client::create_account`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateAccountRequest {
    pub data: NewAccount,
}

/// One page of accounts, as returned by [`Client::list_accounts`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListAccountsResponse {
    #[serde(skip)]
    status: Option<StatusCode>,
    /// The account records on this page.
    pub data: Vec<Account>,
}

impl StatusAware for ListAccountsResponse {
    fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    fn status(&self) -> Option<StatusCode> {
        self.status
    }
}

/// A single account, as returned by [`Client::fetch_account`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FetchAccountResponse {
    #[serde(skip)]
    status: Option<StatusCode>,
    pub data: Account,
}

impl StatusAware for FetchAccountResponse {
    fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    fn status(&self) -> Option<StatusCode> {
        self.status
    }
}

/// The created account, as returned by [`Client::create_account`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateAccountResponse {
    #[serde(skip)]
    status: Option<StatusCode>,
    pub data: Account,
}

impl StatusAware for CreateAccountResponse {
    fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    fn status(&self) -> Option<StatusCode> {
        self.status
    }
}

impl Client {
    /// Lists the organisation's accounts, one page at a time.
    ///
    /// Pages are 1-based. The server reports an application error (a 4xx,
    /// say, for an out-of-range page) through the attached status: the call
    /// still returns `Ok`, with `data` left empty; check
    /// [`is_success`](StatusAware::is_success) before trusting the page.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use accountable::Client;
    ///
    /// # async fn example() -> Result<(), accountable::Error> {
    /// let client = Client::builder()
    ///     .base_url("https://api.example.com/v1")?
    ///     .auth_token("api-key-123")
    ///     .build()?;
    ///
    /// let page = client.list_accounts(1, 100).await?;
    /// for account in &page.data {
    ///     println!("{} ({})", account.id, account.attributes.country);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error only when the request pipeline itself fails:
    /// transport failure, or a 2xx body that does not decode.
    pub async fn list_accounts(
        &self,
        page_number: u32,
        page_size: u32,
    ) -> Result<ListAccountsResponse> {
        let mut response = ListAccountsResponse::default();

        self.request(&mut response, None::<&mut ApiErrors>)
            .path("/organisation/accounts")
            .query("page[number]", page_number)
            .query("page[size]", page_size)
            .method(Method::GET)
            .call()
            .await?;

        Ok(response)
    }

    /// Registers a new account.
    ///
    /// On success the second element is `None` and the response carries the
    /// created record. When the server rejects the request the call still
    /// returns `Ok`: the second element is `Some` with the decoded
    /// application errors, and the response carries the rejecting status.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use accountable::accounts::{CreateAccountRequest, NewAccount, NewAccountAttributes};
    /// use accountable::Client;
    ///
    /// # async fn example(client: &Client) -> Result<(), accountable::Error> {
    /// let request = CreateAccountRequest {
    ///     data: NewAccount {
    ///         account_type: "accounts".to_string(),
    ///         id: "ad27e265-9605-4b4b-a0e5-3003ea9cc4dc".to_string(),
    ///         organisation_id: "eb0bd6f5-c3f5-44b2-b677-acd23cdde73c".to_string(),
    ///         attributes: NewAccountAttributes {
    ///             country: "GB".to_string(),
    ///             base_currency: "GBP".to_string(),
    ///             bank_id: 400300,
    ///             bank_id_code: "GBDSC".to_string(),
    ///             bic: "NWBKGB22".to_string(),
    ///         },
    ///     },
    /// };
    ///
    /// let (created, errors) = client.create_account(&request).await?;
    /// match errors {
    ///     None => println!("created account {}", created.data.id),
    ///     Some(errors) => eprintln!("Rejected: {:?}", errors),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error only when the request pipeline itself fails:
    /// transport failure, or a response body that does not decode into the
    /// branch's target.
    pub async fn create_account(
        &self,
        request: &CreateAccountRequest,
    ) -> Result<(CreateAccountResponse, Option<ApiErrors>)> {
        let mut response = CreateAccountResponse::default();
        let mut errors = ApiErrors::default();

        self.request(&mut response, Some(&mut errors))
            .path("/organisation/accounts")
            .json_body(request)
            .method(Method::POST)
            .call()
            .await?;

        if response.is_success() {
            Ok((response, None))
        } else {
            Ok((response, Some(errors)))
        }
    }

    /// Fetches a single account by identifier.
    ///
    /// An unknown identifier is an application error, not an `Err`: the
    /// response comes back with the server's status attached and `data` left
    /// default.
    ///
    /// # Errors
    ///
    /// Returns an error only when the request pipeline itself fails:
    /// transport failure, or a 2xx body that does not decode.
    pub async fn fetch_account(&self, account_id: &str) -> Result<FetchAccountResponse> {
        let mut response = FetchAccountResponse::default();

        self.request(&mut response, None::<&mut ApiErrors>)
            .path("/organisation/accounts/")
            .path_segment(account_id)
            .method(Method::GET)
            .call()
            .await?;

        Ok(response)
    }

    /// Deletes an account at a specific version.
    ///
    /// The endpoint answers with a bare status (the body is not JSON on
    /// success), so the outcome is a [`NoContent`] carrying the status, plus
    /// the decoded application errors when the server rejects the delete.
    /// A version conflict is the usual rejection.
    ///
    /// ```no_run
    /// # async fn example(client: &accountable::Client) -> Result<(), accountable::Error> {
    /// use accountable::StatusAware;
    ///
    /// let (outcome, errors) = client
    ///     .delete_account("ad27e265-9605-4b4b-a0e5-3003ea9cc4dc", 0)
    ///     .await?;
    /// if !outcome.is_success() {
    ///     eprintln!("Delete rejected: {:?}", errors);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error only when the request pipeline itself fails:
    /// transport failure, or an error body that does not decode.
    pub async fn delete_account(
        &self,
        account_id: &str,
        version: i64,
    ) -> Result<(NoContent, Option<ApiErrors>)> {
        let mut outcome = NoContent::default();
        let mut errors = ApiErrors::default();

        self.request(&mut outcome, Some(&mut errors))
            .path("/organisation/accounts")
            .path_segment(account_id)
            .query("version", version)
            .method(Method::DELETE)
            .call()
            .await?;

        if outcome.is_success() {
            Ok((outcome, None))
        } else {
            Ok((outcome, Some(errors)))
        }
    }
}
