use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use chirp_core::{AccountStore, Notifier};
use chirp_core::config::{ChirpConfig, DatabaseConfig, JwtConfig, LogFormat, PolicyConfig};
use chirp_server::{AppState, build_router};
use chirp_storage_sqlite::SqliteAccountStore;

use crate::notifier::RecordingNotifier;
use crate::stores::{TestStores, create_test_stores};

pub const TEST_SESSION_SECRET: &str = "test-session-secret-at-least-32-chars-long";
pub const TEST_PASSWORD: &str = "hunter2-test-password";

pub fn create_test_config() -> ChirpConfig {
    ChirpConfig {
        port: 0,
        public_url: "https://chirp.test".to_string(),
        log_format: LogFormat::Pretty,
        jwt: JwtConfig {
            session_secret: TEST_SESSION_SECRET.to_string(),
        },
        database: DatabaseConfig {
            url: String::new(), // not used; stores are pre-connected
        },
        smtp: None,
        policy: PolicyConfig::default(),
        admin_emails: Vec::new(),
    }
}

/// A router over a fresh SQLite store, with confirmations captured in memory.
pub struct TestApp {
    pub router: Router,
    pub stores: TestStores,
    pub notifier: Arc<RecordingNotifier>,
}

pub fn create_test_app_state(
    stores: &TestStores,
    config: ChirpConfig,
    notifier: Arc<dyn Notifier>,
) -> AppState<SqliteAccountStore> {
    AppState::new(
        Arc::new(stores.account_store.clone()),
        Arc::new(config),
        notifier,
    )
}

pub async fn create_test_app() -> TestApp {
    create_test_app_with_config(create_test_config()).await
}

pub async fn create_test_app_with_config(config: ChirpConfig) -> TestApp {
    let stores = create_test_stores().await;
    let notifier = Arc::new(RecordingNotifier::new());
    let router = build_router(create_test_app_state(&stores, config, notifier.clone()));
    TestApp {
        router,
        stores,
        notifier,
    }
}

impl TestApp {
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> (u16, Value) {
        send_request(&self.router, method, uri, auth_token, body).await
    }

    /// Register via the API with [`TEST_PASSWORD`] and return the account id.
    pub async fn register(&self, name: &str, email: &str) -> String {
        let (status, body) = self
            .send(
                "POST",
                "/users",
                None,
                Some(json!({
                    "name": name,
                    "email": email,
                    "password": TEST_PASSWORD,
                    "passwordConfirmation": TEST_PASSWORD,
                })),
            )
            .await;
        assert_eq!(status, 201, "register failed: {body}");
        body["user"]["id"].as_str().unwrap().to_string()
    }

    /// Follow the confirmation link sent to `email`; returns (status, body).
    pub async fn confirm(&self, email: &str) -> (u16, Value) {
        let token = self
            .notifier
            .token_for(email)
            .unwrap_or_else(|| panic!("no confirmation sent to {email}"));
        self.send("GET", &format!("/signup/confirm/{token}"), None, None)
            .await
    }

    /// Register and confirm; returns (account id, session token).
    pub async fn register_confirmed(&self, name: &str, email: &str) -> (String, String) {
        let id = self.register(name, email).await;
        let (status, body) = self.confirm(email).await;
        assert_eq!(status, 200, "confirm failed: {body}");
        let jwt = body["accessJwt"].as_str().unwrap().to_string();
        (id, jwt)
    }

    pub async fn login(&self, email: &str, password: &str) -> (u16, Value) {
        self.send(
            "POST",
            "/login",
            None,
            Some(json!({"email": email, "password": password})),
        )
        .await
    }

    pub async fn promote_to_admin(&self, id: &str) {
        self.stores
            .account_store
            .set_admin(id, true)
            .await
            .expect("failed to promote account");
    }
}

/// A router whose confirmations go to `notifier` instead of being recorded.
pub async fn create_test_router_with_notifier(
    notifier: Arc<dyn Notifier>,
) -> (Router, TestStores) {
    let stores = create_test_stores().await;
    let router = build_router(create_test_app_state(&stores, create_test_config(), notifier));
    (router, stores)
}

/// Send a request through the router and return (status, body_json).
pub async fn send_request(
    router: &Router,
    method: &str,
    uri: &str,
    auth_token: Option<&str>,
    body: Option<Value>,
) -> (u16, Value) {
    let mut builder = axum::http::Request::builder().method(method).uri(uri);

    if let Some(token) = auth_token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }

    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }

    let req_body = match body {
        Some(b) => Body::from(serde_json::to_vec(&b).unwrap()),
        None => Body::empty(),
    };

    let req = builder.body(req_body).unwrap();
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status().as_u16();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();

    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or(Value::String(String::from_utf8_lossy(&bytes).to_string()))
    };

    (status, json)
}
