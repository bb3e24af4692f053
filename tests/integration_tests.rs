//! Integration tests using wiremock to simulate the accounts API.

use accountable::accounts::{CreateAccountRequest, NewAccount, NewAccountAttributes};
use accountable::{ApiErrors, Client, Error, NoContent, StatusAware};
use http::{Method, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ACCOUNT_ID: &str = "ad27e265-9605-4b4b-a0e5-3003ea9cc4dc";
const ORGANISATION_ID: &str = "eb0bd6f5-c3f5-44b2-b677-acd23cdde73c";

const LIST_BODY: &str = r#"{
    "data": [
        {
            "type": "accounts",
            "id": "ad27e265-9605-4b4b-a0e5-3003ea9cc4dc",
            "organisation_id": "eb0bd6f5-c3f5-44b2-b677-acd23cdde73c",
            "version": 0,
            "attributes": {
                "country": "GB",
                "base_currency": "GBP"
            }
        },
        {
            "type": "accounts",
            "id": "ea6239c1-99e9-42b3-bca1-92f5c068da6b",
            "organisation_id": "eb0bd6f5-c3f5-44b2-b677-acd23cdde73c",
            "version": 0,
            "attributes": {
                "country": "GB",
                "base_currency": "GBP"
            }
        }
    ]
}"#;

const FETCH_BODY: &str = r#"{
    "data": {
        "type": "accounts",
        "id": "ad27e265-9605-4b4b-a0e5-3003ea9cc4dc",
        "organisation_id": "eb0bd6f5-c3f5-44b2-b677-acd23cdde73c",
        "version": 0,
        "attributes": {
            "country": "GB",
            "base_currency": "GBP",
            "account_number": "41426819",
            "bank_id": 400300,
            "bank_id_code": "GBDSC"
        }
    }
}"#;

/// A caller-defined success target, to exercise the raw builder the way a
/// downstream crate would.
#[derive(Debug, Default, Deserialize)]
struct Widget {
    #[serde(skip)]
    status: Option<StatusCode>,
    name: String,
}

impl StatusAware for Widget {
    fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    fn status(&self) -> Option<StatusCode> {
        self.status
    }
}

fn client_for(mock_server: &MockServer) -> Client {
    Client::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_list_accounts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/organisation/accounts"))
        .and(query_param("page[number]", "1"))
        .and(query_param("page[size]", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LIST_BODY))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let page = client.list_accounts(1, 100).await.unwrap();

    assert!(page.is_success());
    assert_eq!(page.status(), Some(StatusCode::OK));
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.data[0].id, ACCOUNT_ID);
    assert_eq!(page.data[0].organisation_id, ORGANISATION_ID);
    assert_eq!(page.data[1].attributes.country, "GB");
}

#[tokio::test]
async fn test_fetch_account() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/organisation/accounts/{ACCOUNT_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_string(FETCH_BODY))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let account = client.fetch_account(ACCOUNT_ID).await.unwrap();

    assert!(account.is_success());
    assert_eq!(account.data.id, ACCOUNT_ID);
    assert_eq!(account.data.organisation_id, ORGANISATION_ID);
    assert_eq!(account.data.attributes.bank_id, 400300);
    assert_eq!(account.data.attributes.account_number, "41426819");
}

#[tokio::test]
async fn test_create_account() {
    let mock_server = MockServer::start().await;

    let request = CreateAccountRequest {
        data: NewAccount {
            account_type: "accounts".to_string(),
            id: ACCOUNT_ID.to_string(),
            organisation_id: ORGANISATION_ID.to_string(),
            attributes: NewAccountAttributes {
                country: "GB".to_string(),
                base_currency: "GBP".to_string(),
                bank_id: 400300,
                bank_id_code: "GBDSC".to_string(),
                bic: "NWBKGB22".to_string(),
            },
        },
    };

    Mock::given(method("POST"))
        .and(path("/organisation/accounts"))
        .and(body_json(serde_json::json!({
            "data": {
                "type": "accounts",
                "id": ACCOUNT_ID,
                "organisation_id": ORGANISATION_ID,
                "attributes": {
                    "country": "GB",
                    "base_currency": "GBP",
                    "bank_id": 400300,
                    "bank_id_code": "GBDSC",
                    "bic": "NWBKGB22"
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string(FETCH_BODY))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let (created, errors) = client.create_account(&request).await.unwrap();

    assert!(errors.is_none());
    assert!(created.is_success());
    assert_eq!(created.data.id, ACCOUNT_ID);
}

#[tokio::test]
async fn test_delete_account_tolerates_non_json_body() {
    let mock_server = MockServer::start().await;

    // The real endpoint answers a successful delete with a bare "OK".
    Mock::given(method("DELETE"))
        .and(path(format!("/organisation/accounts/{ACCOUNT_ID}")))
        .and(query_param("version", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let (outcome, errors) = client.delete_account(ACCOUNT_ID, 0).await.unwrap();

    assert!(outcome.is_success());
    assert_eq!(outcome.status(), Some(StatusCode::OK));
    assert!(errors.is_none());
}

#[tokio::test]
async fn test_delete_account_version_conflict() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path(format!("/organisation/accounts/{ACCOUNT_ID}")))
        .and(query_param("version", "3"))
        .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
            "generalErrors": [{"message": "invalid version"}]
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let (outcome, errors) = client.delete_account(ACCOUNT_ID, 3).await.unwrap();

    assert!(!outcome.is_success());
    assert_eq!(outcome.status(), Some(StatusCode::CONFLICT));
    let errors = errors.expect("a rejected delete carries decoded errors");
    assert_eq!(errors.general_errors[0].message.as_deref(), Some("invalid version"));
}

#[tokio::test]
async fn test_non_2xx_without_error_target_is_still_ok() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error_message": "record does not exist"
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let account = client.fetch_account(ACCOUNT_ID).await.unwrap();

    // No error target was supplied, so the body is ignored; the status is
    // still attached and the data stays default.
    assert_eq!(account.status(), Some(StatusCode::NOT_FOUND));
    assert!(!account.is_success());
    assert!(account.data.id.is_empty());
}

#[tokio::test]
async fn test_transport_failure_leaves_status_unattached() {
    // Grab a port nobody is listening on.
    let unreachable = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        format!("http://{}", listener.local_addr().unwrap())
    };

    let client = Client::builder()
        .base_url(unreachable)
        .unwrap()
        .build()
        .unwrap();

    let mut outcome = NoContent::default();
    let mut errors = ApiErrors::default();
    let result = client
        .request(&mut outcome, Some(&mut errors))
        .path("/organisation/accounts")
        .method(Method::GET)
        .call()
        .await;

    match result {
        Err(Error::Network(_)) => {}
        _ => panic!("Expected Network error, got {:?}", result),
    }
    assert!(result.unwrap_err().is_transport());
    assert_eq!(outcome.status(), None);
    assert!(errors.is_empty());

    // The typed wrappers propagate the same failure.
    let created = client.create_account(&CreateAccountRequest::default()).await;
    assert!(matches!(created, Err(Error::Network(_))));
}

#[tokio::test]
async fn test_decode_failure_still_attaches_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/widgets/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let mut widget = Widget::default();
    let result = client
        .request(&mut widget, None::<&mut ApiErrors>)
        .path("/widgets/1")
        .method(Method::GET)
        .call()
        .await;

    match result {
        Err(Error::DecodeFailed {
            raw_response,
            status,
            ..
        }) => {
            assert_eq!(status, StatusCode::OK);
            assert_eq!(raw_response, "not json");
        }
        _ => panic!("Expected DecodeFailed, got {:?}", result),
    }
    // The response was classified before decoding went wrong.
    assert_eq!(widget.status(), Some(StatusCode::OK));
    assert!(widget.name.is_empty());
}

#[tokio::test]
async fn test_error_branch_decode_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(400).set_body_string("<html>bad request</html>"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let mut outcome = NoContent::default();
    let mut errors = ApiErrors::default();
    let result = client
        .request(&mut outcome, Some(&mut errors))
        .path("/organisation/accounts")
        .path_segment(ACCOUNT_ID)
        .method(Method::DELETE)
        .call()
        .await;

    match result {
        Err(Error::DecodeFailed { status, .. }) => {
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
        _ => panic!("Expected DecodeFailed, got {:?}", result),
    }
    assert_eq!(outcome.status(), Some(StatusCode::BAD_REQUEST));
}

#[tokio::test]
async fn test_authorization_token_sent_verbatim() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LIST_BODY))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .auth_token("Bearer secret-token")
        .build()
        .unwrap();

    let page = client.list_accounts(1, 100).await.unwrap();
    assert!(page.is_success());

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests[0].headers.get_all("authorization").iter().count(), 1);
}

#[tokio::test]
async fn test_empty_token_and_anonymous_requests_omit_authorization() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LIST_BODY))
        .mount(&mock_server)
        .await;

    // An empty token never becomes an empty Authorization header.
    let client = client_for(&mock_server);
    client.list_accounts(1, 100).await.unwrap();

    // A configured token is still skipped on the anonymous path.
    let authenticated = Client::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .auth_token("Bearer secret-token")
        .build()
        .unwrap();
    let mut page = accountable::accounts::ListAccountsResponse::default();
    authenticated
        .request_anonymous(&mut page, None::<&mut ApiErrors>)
        .path("/organisation/accounts")
        .method(Method::GET)
        .call()
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    for request in &requests {
        assert!(!request.headers.contains_key("authorization"));
    }
}

#[tokio::test]
async fn test_accept_header_defaults_to_vendor_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("accept", "application/vnd.api+json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FETCH_BODY))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let account = client.fetch_account(ACCOUNT_ID).await.unwrap();
    assert!(account.is_success());
}

#[tokio::test]
async fn test_per_request_headers_overwrite_defaults() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "sprocket"
        })))
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .default_header("X-Client", "accountable-tests")
        .unwrap()
        .build()
        .unwrap();

    let mut widget = Widget::default();
    client
        .request(&mut widget, None::<&mut ApiErrors>)
        .path("/widgets/1")
        // Different spelling on purpose; header names are case-insensitive.
        .header("Accept", "application/json")
        .method(Method::GET)
        .call()
        .await
        .unwrap();

    assert_eq!(widget.name, "sprocket");

    let requests = mock_server.received_requests().await.unwrap();
    let headers = &requests[0].headers;
    assert_eq!(headers.get("accept").unwrap(), "application/json");
    assert_eq!(headers.get("x-client").unwrap(), "accountable-tests");
    assert_eq!(headers.get_all("accept").iter().count(), 1);
}

#[tokio::test]
async fn test_repeated_query_keys_preserve_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LIST_BODY))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let mut page = accountable::accounts::ListAccountsResponse::default();
    client
        .request(&mut page, None::<&mut ApiErrors>)
        .path("/organisation/accounts")
        .query("filter[bank_id_code]", vec!["GBDSC", "GBDSD"])
        .method(Method::GET)
        .call()
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    let pairs: Vec<(String, String)> = requests[0]
        .url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("filter[bank_id_code]".to_string(), "GBDSC".to_string()),
            ("filter[bank_id_code]".to_string(), "GBDSD".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_malformed_verb_fails_before_any_io() {
    let mock_server = MockServer::start().await;

    let client = client_for(&mock_server);
    let mut outcome = NoContent::default();
    let result = client
        .request(&mut outcome, None::<&mut ApiErrors>)
        .path("/organisation/accounts")
        .method("BAD METHOD")
        .call()
        .await;

    match result {
        Err(Error::InvalidRequest(message)) => {
            assert!(message.contains("BAD METHOD"));
        }
        _ => panic!("Expected InvalidRequest, got {:?}", result),
    }
    assert_eq!(outcome.status(), None);
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unencodable_body_fails_before_any_io() {
    use std::collections::BTreeMap;

    let mock_server = MockServer::start().await;

    let client = client_for(&mock_server);
    let unencodable = BTreeMap::from([((1u8, 2u8), "v")]);
    let mut outcome = NoContent::default();
    let result = client
        .request(&mut outcome, None::<&mut ApiErrors>)
        .path("/organisation/accounts")
        .json_body(&unencodable)
        .method(Method::POST)
        .call()
        .await;

    match result {
        Err(Error::EncodeFailed(_)) => {}
        _ => panic!("Expected EncodeFailed, got {:?}", result),
    }
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_base_url_path_prefix_is_preserved() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/organisation/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LIST_BODY))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .base_url(format!("{}/v1", mock_server.uri()))
        .unwrap()
        .build()
        .unwrap();

    let page = client.list_accounts(1, 100).await.unwrap();
    assert_eq!(page.data.len(), 2);
}

#[tokio::test]
async fn test_builder_configuration_errors() {
    match Client::builder().build() {
        Err(Error::ConfigurationError(message)) => {
            assert!(message.contains("Base URL"));
        }
        other => panic!("Expected ConfigurationError, got {:?}", other.map(|_| ())),
    }

    match Client::builder().base_url("not a url") {
        Err(Error::InvalidUrl(_)) => {}
        other => panic!("Expected InvalidUrl, got {:?}", other.map(|_| ())),
    }

    match Client::builder().default_header("bad header", "value") {
        Err(Error::ConfigurationError(message)) => {
            assert!(message.contains("header name"));
        }
        other => panic!("Expected ConfigurationError, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_debug_mode_dumps_the_wire_response() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(FETCH_BODY)
                .insert_header("x-request-id", "abc-123"),
        )
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .debug(true)
        .build()
        .unwrap();

    // The dump is a logging side effect; the call result is unchanged.
    let account = client.fetch_account(ACCOUNT_ID).await.unwrap();
    assert!(account.is_success());
}

#[tokio::test]
async fn test_timeout_surfaces_as_network_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(LIST_BODY)
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .timeout(Duration::from_millis(50))
        .build()
        .unwrap();

    let result = client.list_accounts(1, 100).await;
    match result {
        Err(e) => {
            assert!(e.is_transport());
            assert!(e.is_timeout());
        }
        Ok(_) => panic!("Expected a timeout"),
    }
}
