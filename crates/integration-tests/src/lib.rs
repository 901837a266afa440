//! Integration test support for Recipe Box.
//!
//! Tests drive the real router and services against the in-memory document
//! store and an in-memory session store, so no database is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p recipe-box-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use tower_sessions::{MemoryStore, Session};

use recipe_box_core::{Email, Identity};
use recipe_box_web::config::WebConfig;
use recipe_box_web::middleware::request_id::REQUEST_ID_HEADER;
use recipe_box_web::middleware::session::SESSION_COOKIE_NAME;
use recipe_box_web::models::{CurrentUser, session_keys};
use recipe_box_web::services::{IdentityError, IdentityProvider};
use recipe_box_web::state::AppState;
use recipe_box_web::store::{
    CollectionPath, Document, DocumentRef, DocumentStore, MemoryDocumentStore, StoreError,
};

/// Configuration for an app that never binds a socket.
#[must_use]
pub fn test_config() -> WebConfig {
    WebConfig {
        database_url: SecretString::from("postgres://localhost/recipe_box_test"),
        host: std::net::IpAddr::from([127, 0, 0, 1]),
        port: 0,
        base_url: "http://localhost:3000".to_owned(),
        collection_idle: Duration::from_secs(60),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

// =============================================================================
// Document stores
// =============================================================================

/// In-memory store whose reads and writes can be switched to fail.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryDocumentStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool) -> Result<(), StoreError> {
        if flag.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("injected failure".to_owned()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn get(&self, collection: &CollectionPath) -> Result<Vec<Document>, StoreError> {
        Self::check(&self.fail_reads)?;
        self.inner.get(collection).await
    }

    async fn set(&self, doc: &DocumentRef, body: &Value) -> Result<(), StoreError> {
        Self::check(&self.fail_writes)?;
        self.inner.set(doc, body).await
    }

    async fn create(&self, doc: &DocumentRef, body: &Value) -> Result<(), StoreError> {
        Self::check(&self.fail_writes)?;
        self.inner.create(doc, body).await
    }

    async fn delete(&self, doc: &DocumentRef) -> Result<(), StoreError> {
        Self::check(&self.fail_writes)?;
        self.inner.delete(doc).await
    }
}

// =============================================================================
// Identity provider
// =============================================================================

/// Scripted identity provider recording what the gate asked of it.
#[derive(Default)]
pub struct FakeIdentityProvider {
    pub pending_redirect: AtomicBool,
    pub reject_sign_out: AtomicBool,
    pub login_mounts: std::sync::Mutex<Vec<String>>,
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn is_pending_redirect(&self) -> bool {
        self.pending_redirect.load(Ordering::SeqCst)
    }

    async fn start_login(&self, mount: &str) {
        if let Ok(mut mounts) = self.login_mounts.lock() {
            mounts.push(mount.to_owned());
        }
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        if self.reject_sign_out.load(Ordering::SeqCst) {
            Err(IdentityError::Rejected("sign-out refused".to_owned()))
        } else {
            Ok(())
        }
    }
}

// =============================================================================
// HTTP harness
// =============================================================================

/// A response read to completion.
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub request_id: Option<String>,
    pub body: String,
}

/// The full router plus a one-visitor cookie jar.
pub struct TestApp {
    pub state: AppState,
    pub documents: Arc<FlakyStore>,
    sessions: MemoryStore,
    router: Router,
    cookie: Option<String>,
}

impl TestApp {
    /// A router over a fresh in-memory document store.
    ///
    /// # Panics
    ///
    /// Panics if the lazy pool URL cannot be parsed.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        let documents = Arc::new(FlakyStore::new());
        // Never connected to: only the login and readiness routes touch it
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(100))
            .connect_lazy("postgres://localhost/recipe_box_test")
            .expect("valid database url");
        let state = AppState::with_documents(test_config(), pool, documents.clone());
        let sessions = MemoryStore::default();
        let router = recipe_box_web::app(state.clone(), sessions.clone());

        Self {
            state,
            documents,
            sessions,
            router,
            cookie: None,
        }
    }

    /// Start a session already signed in as `identity`.
    ///
    /// # Panics
    ///
    /// Panics if the session cannot be saved.
    #[allow(clippy::expect_used)]
    pub async fn sign_in(&mut self, identity: Identity) {
        let session = Session::new(None, Arc::new(self.sessions.clone()), None);
        let user = CurrentUser {
            identity,
            email: Email::parse("test@example.com").expect("valid email"),
        };
        session
            .insert(session_keys::CURRENT_USER, &user)
            .await
            .expect("insert user");
        session.save().await.expect("save session");
        let id = session.id().expect("saved session has an id");
        self.cookie = Some(format!("{SESSION_COOKIE_NAME}={id}"));
    }

    /// Issue a GET.
    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = self.request("GET", uri).body(Body::empty());
        self.send(request).await
    }

    /// Issue a url-encoded POST.
    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let request = self
            .request("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body));
        self.send(request).await
    }

    fn request(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        }
    }

    #[allow(clippy::expect_used)]
    async fn send(
        &mut self,
        request: Result<Request<Body>, axum::http::Error>,
    ) -> TestResponse {
        let request = request.expect("valid request");
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            && let Some(pair) = set_cookie.split(';').next()
        {
            self.cookie = Some(pair.to_owned());
        }

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let request_id = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");

        TestResponse {
            status,
            location,
            request_id,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
