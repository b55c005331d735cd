//! Integration tests for the HTTP API.
//!
//! Drive the real router with in-memory mocks behind the ports: auth
//! middleware, address registration, the credit gate on physical sends, and
//! the contacts listing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use secrecy::Secret;
use serde_json::Value;
use tower::ServiceExt;

use postcard_hub::adapters::http::{router, AppState, SessionStore};
use postcard_hub::adapters::identity::MockIdentityVerifier;
use postcard_hub::config::IdentityConfig;
use postcard_hub::domain::payment::StripeWebhookVerifier;
use postcard_hub::domain::user::{Contact, Identity, UserRecord};
use postcard_hub::ports::{
    AddressDetails, CreatedAddress, CreatedPostcard, Deliverability, GrantOutcome, MailClient,
    MailError, NewAddress, PostcardRequest, PostcardSummary, StoreError, UserStore,
};

// =============================================================================
// Test Infrastructure
// =============================================================================

/// In-memory user store mirroring the Postgres semantics.
#[derive(Default)]
struct MockUserStore {
    records: Mutex<HashMap<i64, UserRecord>>,
    events: Mutex<Vec<String>>,
}

impl MockUserStore {
    fn with_record(self, record: UserRecord) -> Self {
        self.records
            .lock()
            .unwrap()
            .insert(record.recurse_id, record);
        self
    }

    fn record(&self, member_id: i64) -> Option<UserRecord> {
        self.records.lock().unwrap().get(&member_id).cloned()
    }
}

#[async_trait]
impl UserStore for MockUserStore {
    async fn upsert(&self, record: &UserRecord) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        let credits = records
            .get(&record.recurse_id)
            .map(|existing| existing.num_credits)
            .unwrap_or(0);
        let mut record = record.clone();
        record.num_credits = credits;
        records.insert(record.recurse_id, record);
        Ok(())
    }

    async fn get(&self, member_id: i64) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.records.lock().unwrap().get(&member_id).cloned())
    }

    async fn credits(&self, member_id: i64) -> Result<i64, StoreError> {
        self.records
            .lock()
            .unwrap()
            .get(&member_id)
            .map(|record| record.num_credits)
            .ok_or(StoreError::NotFound(member_id))
    }

    async fn try_spend_credit(&self, member_id: i64) -> Result<Option<i64>, StoreError> {
        let mut records = self.records.lock().unwrap();
        match records.get_mut(&member_id) {
            Some(record) if record.num_credits > 0 => {
                record.num_credits -= 1;
                Ok(Some(record.num_credits))
            }
            _ => Ok(None),
        }
    }

    async fn grant_credits_for_event(
        &self,
        event_id: &str,
        member_id: i64,
        amount: i64,
    ) -> Result<GrantOutcome, StoreError> {
        let mut events = self.events.lock().unwrap();
        if events.iter().any(|id| id == event_id) {
            return Ok(GrantOutcome::Duplicate);
        }
        events.push(event_id.to_string());

        let mut records = self.records.lock().unwrap();
        match records.get_mut(&member_id) {
            Some(record) => {
                record.num_credits += amount;
                Ok(GrantOutcome::Granted)
            }
            None => Ok(GrantOutcome::UnknownMember),
        }
    }

    async fn list_contacts(&self) -> Result<Vec<Contact>, StoreError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .map(|record| Contact {
                recurse_id: record.recurse_id,
                name: record.user_name.clone(),
                email: record.user_email.clone(),
                accepts_physical_mail: record.accepts_physical_mail,
            })
            .collect())
    }

    async fn delete(&self, member_id: i64) -> Result<(), StoreError> {
        self.records
            .lock()
            .unwrap()
            .remove(&member_id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(member_id))
    }
}

/// Mock mail provider with call counters and a configurable deliverability
/// verdict.
struct MockMailClient {
    deliverability: Deliverability,
    address_calls: AtomicUsize,
    postcard_calls: AtomicUsize,
}

impl MockMailClient {
    fn new() -> Self {
        Self {
            deliverability: Deliverability::Deliverable,
            address_calls: AtomicUsize::new(0),
            postcard_calls: AtomicUsize::new(0),
        }
    }

    fn undeliverable() -> Self {
        Self {
            deliverability: Deliverability::Undeliverable,
            ..Self::new()
        }
    }

    fn postcards_created(&self) -> usize {
        self.postcard_calls.load(Ordering::SeqCst)
    }

    fn addresses_created(&self) -> usize {
        self.address_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MailClient for MockMailClient {
    async fn create_address(
        &self,
        address: &NewAddress,
        owner_id: i64,
        _live: bool,
    ) -> Result<CreatedAddress, MailError> {
        self.address_calls.fetch_add(1, Ordering::SeqCst);
        Ok(CreatedAddress {
            address_id: format!("adr_{owner_id}"),
            name: address.name.clone(),
            address_line1: address.line1.clone(),
            address_line2: address.line2.clone(),
            address_city: address.city.clone(),
            address_state: address.state.clone(),
            address_zip: address.zip.clone(),
        })
    }

    async fn get_address(
        &self,
        address_id: &str,
        _live: bool,
    ) -> Result<AddressDetails, MailError> {
        Ok(AddressDetails {
            name: format!("owner of {address_id}"),
            address_line1: "1 Main St".to_string(),
            address_line2: String::new(),
            address_city: "Brooklyn".to_string(),
            address_state: "NY".to_string(),
            address_zip: "11201".to_string(),
            address_country: "US".to_string(),
        })
    }

    async fn delete_address(&self, _address_id: &str, _live: bool) -> Result<(), MailError> {
        Ok(())
    }

    async fn verify_deliverability(
        &self,
        _address: &NewAddress,
    ) -> Result<Deliverability, MailError> {
        Ok(self.deliverability)
    }

    async fn create_postcard(
        &self,
        _request: &PostcardRequest,
    ) -> Result<CreatedPostcard, MailError> {
        self.postcard_calls.fetch_add(1, Ordering::SeqCst);
        Ok(CreatedPostcard {
            url: "https://mail.example.com/render/psc_1".to_string(),
        })
    }

    async fn list_postcards(
        &self,
        _recipient_id: i64,
        _live: bool,
    ) -> Result<Vec<PostcardSummary>, MailError> {
        Ok(Vec::new())
    }
}

fn ada() -> Identity {
    Identity {
        id: 42,
        name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
    }
}

fn registered(member_id: i64, credits: i64, accepts_physical_mail: bool) -> UserRecord {
    UserRecord {
        recurse_id: member_id,
        lob_address_id: format!("adr_{member_id}"),
        accepts_physical_mail,
        num_credits: credits,
        user_name: format!("member {member_id}"),
        user_email: format!("member{member_id}@example.com"),
    }
}

fn identity_config() -> IdentityConfig {
    IdentityConfig {
        client_id: "client".to_string(),
        client_secret: Secret::new("secret".to_string()),
        redirect_uri: "https://postcards.example.com/auth".to_string(),
        authorize_url: "https://identity.example.com/oauth/authorize".to_string(),
        token_url: "https://identity.example.com/oauth/token".to_string(),
        profile_url: "https://identity.example.com/api/v1/profiles/me".to_string(),
        token_cache_ttl_secs: 3600,
        token_cache_capacity: 100,
    }
}

struct TestApp {
    router: Router,
    store: Arc<MockUserStore>,
    mail: Arc<MockMailClient>,
}

fn test_app(store: MockUserStore, mail: MockMailClient) -> TestApp {
    let store = Arc::new(store);
    let mail = Arc::new(mail);
    let identity = MockIdentityVerifier::new().with_identity("ada-token", ada());
    let state = AppState {
        store: store.clone(),
        mail: mail.clone(),
        identity: Arc::new(identity),
        sessions: SessionStore::new(),
        identity_config: Arc::new(identity_config()),
        webhook_verifier: Arc::new(StripeWebhookVerifier::new("whsec_test")),
        credit_grant: 5,
        http_client: reqwest::Client::new(),
    };
    TestApp {
        router: router(state),
        store,
        mail,
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn authed(request: axum::http::request::Builder) -> axum::http::request::Builder {
    request.header(header::AUTHORIZATION, "Bearer ada-token")
}

const BOUNDARY: &str = "X-TEST-BOUNDARY";

fn postcard_body(message: &str) -> Body {
    postcard_body_with_front(b"fake-png-bytes", message)
}

fn postcard_body_with_front(front: &[u8], message: &str) -> Body {
    let mut body = Vec::with_capacity(front.len() + 512);
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"front-postcard-file\"; filename=\"front.png\"\r\n\
             Content-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(front);
    body.extend_from_slice(
        format!(
            "\r\n--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"back\"\r\n\r\n\
             {message}\r\n\
             --{BOUNDARY}--\r\n"
        )
        .as_bytes(),
    );
    Body::from(body)
}

fn send_request(mode: &str, to: i64, message: &str) -> Request<Body> {
    authed(Request::builder())
        .method("POST")
        .uri(format!("/postcards?mode={mode}&toRecurseId={to}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(postcard_body(message))
        .unwrap()
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn protected_routes_reject_anonymous_requests() {
    let app = test_app(MockUserStore::default(), MockMailClient::new());

    for uri in ["/addresses", "/contacts", "/postcards"] {
        let response = app
            .router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn bad_bearer_token_is_rejected() {
    let app = test_app(MockUserStore::default(), MockMailClient::new());

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/contacts")
                .header(header::AUTHORIZATION, "Bearer wrong-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn landing_page_is_public() {
    let app = test_app(MockUserStore::default(), MockMailClient::new());

    let response = app
        .router
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_redirects_to_the_identity_provider() {
    let app = test_app(MockUserStore::default(), MockMailClient::new());

    let response = app
        .router
        .oneshot(Request::builder().uri("/login").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    let location = response.headers()[header::LOCATION].to_str().unwrap();
    assert!(location.starts_with("https://identity.example.com/oauth/authorize"));
    assert!(location.contains("client_id=client"));
    assert!(location.contains("response_type=code"));
}

// =============================================================================
// Addresses
// =============================================================================

#[tokio::test]
async fn address_registration_persists_the_member_record() {
    let app = test_app(MockUserStore::default(), MockMailClient::new());

    let response = app
        .router
        .oneshot(
            authed(Request::builder())
                .method("POST")
                .uri("/addresses")
                .header(
                    header::CONTENT_TYPE,
                    "application/x-www-form-urlencoded",
                )
                .body(Body::from(
                    "name=Ada+Lovelace&address1=1+Main+St&city=Brooklyn&state=NY&zip=11201&acceptsPhysicalMail=false",
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["name"], "Ada Lovelace");
    assert_eq!(body["accepts_physical_mail"], false);

    let record = app.store.record(42).expect("record should exist");
    assert_eq!(record.lob_address_id, "adr_42");
    assert!(!record.accepts_physical_mail);
    assert_eq!(record.user_email, "ada@example.com");
}

#[tokio::test]
async fn undeliverable_address_is_rejected_and_nothing_is_stored() {
    let app = test_app(MockUserStore::default(), MockMailClient::undeliverable());

    let response = app
        .router
        .oneshot(
            authed(Request::builder())
                .method("POST")
                .uri("/addresses")
                .header(
                    header::CONTENT_TYPE,
                    "application/x-www-form-urlencoded",
                )
                .body(Body::from(
                    "name=Ada&address1=0+Nowhere&city=Atlantis&state=XX&zip=00000&acceptsPhysicalMail=true",
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.mail.addresses_created(), 0);
    assert!(app.store.record(42).is_none());
}

#[tokio::test]
async fn missing_address_fields_are_rejected() {
    let app = test_app(MockUserStore::default(), MockMailClient::new());

    let response = app
        .router
        .oneshot(
            authed(Request::builder())
                .method("POST")
                .uri("/addresses")
                .header(
                    header::CONTENT_TYPE,
                    "application/x-www-form-urlencoded",
                )
                .body(Body::from("name=Ada&city=Brooklyn"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "missing field: address1");
}

#[tokio::test]
async fn members_without_an_address_get_the_community_default() {
    let app = test_app(MockUserStore::default(), MockMailClient::new());

    let response = app
        .router
        .oneshot(
            authed(Request::builder())
                .uri("/addresses")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["address_line1"], "397 Bridge Street");
    assert_eq!(body["accepts_physical_mail"], false);
}

#[tokio::test]
async fn deleting_an_absent_address_is_404() {
    let app = test_app(MockUserStore::default(), MockMailClient::new());

    let response = app
        .router
        .oneshot(
            authed(Request::builder())
                .method("DELETE")
                .uri("/addresses")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_an_address_removes_the_record() {
    let app = test_app(
        MockUserStore::default().with_record(registered(42, 3, true)),
        MockMailClient::new(),
    );

    let response = app
        .router
        .oneshot(
            authed(Request::builder())
                .method("DELETE")
                .uri("/addresses")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.store.record(42).is_none());
}

// =============================================================================
// Postcards
// =============================================================================

#[tokio::test]
async fn physical_send_with_no_credits_is_402_and_never_reaches_the_provider() {
    let app = test_app(
        MockUserStore::default()
            .with_record(registered(42, 0, true))
            .with_record(registered(7, 0, true)),
        MockMailClient::new(),
    );

    let response = app
        .router
        .oneshot(send_request("physical_send", 7, "hello"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    assert_eq!(app.mail.postcards_created(), 0);
}

#[tokio::test]
async fn physical_send_spends_exactly_one_credit() {
    let app = test_app(
        MockUserStore::default()
            .with_record(registered(42, 3, true))
            .with_record(registered(7, 0, true)),
        MockMailClient::new(),
    );

    let response = app
        .router
        .oneshot(send_request("physical_send", 7, "hello"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.mail.postcards_created(), 1);

    let body = body_json(response).await;
    assert_eq!(body["credits"], 2);
    assert!(body.get("url").is_none());
    assert_eq!(app.store.record(42).unwrap().num_credits, 2);
}

#[tokio::test]
async fn physical_send_to_an_opted_out_recipient_is_400() {
    let app = test_app(
        MockUserStore::default()
            .with_record(registered(42, 3, true))
            .with_record(registered(7, 0, false)),
        MockMailClient::new(),
    );

    let response = app
        .router
        .oneshot(send_request("physical_send", 7, "hello"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.mail.postcards_created(), 0);
}

#[tokio::test]
async fn physical_send_to_an_unknown_recipient_is_404() {
    let app = test_app(
        MockUserStore::default().with_record(registered(42, 3, true)),
        MockMailClient::new(),
    );

    let response = app
        .router
        .oneshot(send_request("physical_send", 999, "hello"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn preview_returns_a_render_url_and_spends_nothing() {
    let app = test_app(
        MockUserStore::default().with_record(registered(42, 3, true)),
        MockMailClient::new(),
    );

    let response = app
        .router
        .oneshot(send_request("digital_preview", 42, "draft text"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["url"], "https://mail.example.com/render/psc_1");
    assert_eq!(body["credits"], 3);
    assert_eq!(app.store.record(42).unwrap().num_credits, 3);
}

#[tokio::test]
async fn multi_megabyte_front_images_are_accepted() {
    let app = test_app(
        MockUserStore::default().with_record(registered(42, 3, true)),
        MockMailClient::new(),
    );

    // Larger than the framework's 2 MB default body limit.
    let front = vec![7u8; 3 * 1024 * 1024];
    let response = app
        .router
        .oneshot(
            authed(Request::builder())
                .method("POST")
                .uri("/postcards?mode=digital_preview&toRecurseId=42")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(postcard_body_with_front(&front, "big card"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.mail.postcards_created(), 1);
}

#[tokio::test]
async fn preview_by_an_unregistered_caller_reports_zero_credits() {
    let app = test_app(MockUserStore::default(), MockMailClient::new());

    let response = app
        .router
        .oneshot(send_request("digital_preview", 42, "first draft"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["credits"], 0);
}

#[tokio::test]
async fn unknown_send_mode_is_400() {
    let app = test_app(
        MockUserStore::default().with_record(registered(42, 3, true)),
        MockMailClient::new(),
    );

    let response = app
        .router
        .oneshot(send_request("carrier_pigeon", 7, "hello"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Contacts
// =============================================================================

#[tokio::test]
async fn contacts_include_the_directory_and_the_caller_balance() {
    let app = test_app(
        MockUserStore::default()
            .with_record(registered(42, 4, true))
            .with_record(registered(7, 9, false)),
        MockMailClient::new(),
    );

    let response = app
        .router
        .oneshot(
            authed(Request::builder())
                .uri("/contacts")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["credits"], 4);
    assert_eq!(body["contacts"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn unregistered_callers_see_zero_credits() {
    let app = test_app(
        MockUserStore::default().with_record(registered(7, 9, false)),
        MockMailClient::new(),
    );

    let response = app
        .router
        .oneshot(
            authed(Request::builder())
                .uri("/contacts")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["credits"], 0);
}
