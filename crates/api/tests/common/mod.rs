//! Shared setup for HTTP integration tests: the production router over a
//! migrated in-memory SQLite store and a mailer that records instead of
//! sending.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use gatehouse_api::auth::jwt::JwtConfig;
use gatehouse_api::config::{IdentityConfig, ServerConfig};
use gatehouse_api::router::build_app_router;
use gatehouse_api::state::AppState;
use gatehouse_core::permissions::PermissionTable;
use gatehouse_core::preferences::OptionGroup;
use gatehouse_db::{create_memory_pool, run_migrations, Dialect};
use gatehouse_mail::{MailError, Mailer, TemplatedMail};
use http_body_util::BodyExt;
use tower::ServiceExt;

pub const SECRET: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

pub const ROLES: &str = r#"{
    "1": { "name": "admin", "permissions": ["users.list", "users.manage", "roles.read", "roles.write"] },
    "2": { "name": "viewer", "permissions": ["users.list"] }
}"#;

pub const OPTIONS: &str = r#"{
    "id": "root",
    "options": [
        { "id": "id1", "type": "string", "defaultValue": "33" },
        { "id": "pageSize", "type": "int", "defaultValue": 25 }
    ]
}"#;

/// Captures every message handed to it.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<TemplatedMail>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<TemplatedMail> {
        self.sent.lock().unwrap().clone()
    }

    /// The token carried by the most recent message to `to`.
    pub fn last_token_for(&self, to: &str) -> String {
        self.sent()
            .iter()
            .rev()
            .find(|mail| mail.to == to)
            .and_then(|mail| mail.data["token"].as_str().map(str::to_string))
            .unwrap_or_else(|| panic!("no token mailed to {to}"))
    }
}

#[async_trait::async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: &TemplatedMail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

/// Test configuration: 1 hour e-mail tokens, the cheapest bcrypt cost.
pub fn test_config() -> ServerConfig {
    let identity = IdentityConfig::from_json(&format!(
        r#"{{
            "token_password": "{SECRET}",
            "tokenLifeSpan": 1,
            "password_reset": {{ "template": "reset.hbs", "subject": "Reset" }},
            "user_activation": {{ "template": "activate.hbs", "subject": "Activate" }},
            "one_time_password": {{ "template": "otp.hbs", "subject": "Login" }}
        }}"#
    ))
    .expect("identity config should parse");

    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: "sqlite::memory:".to_string(),
        roles_file: PathBuf::from("roles.json"),
        preferences_schema: None,
        token_retention_interval_secs: 3600,
        password_cost: 4,
        mail_log_only: false,
        jwt: JwtConfig::new(SECRET, 24).expect("secret is long enough"),
        identity,
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
}

/// Build the full application router over a fresh store.
pub async fn build_test_app() -> TestApp {
    let pool = create_memory_pool()
        .await
        .expect("in-memory database should open");
    run_migrations(&pool, Dialect::Sqlite)
        .await
        .expect("schema should apply");

    let config = test_config();
    let mailer = Arc::new(RecordingMailer::default());
    let state = AppState::new(
        pool,
        Dialect::Sqlite,
        config.clone(),
        PermissionTable::from_json(ROLES).expect("roles should parse"),
        OptionGroup::from_json(OPTIONS).expect("options should parse"),
        mailer.clone(),
    );

    TestApp {
        router: build_app_router(state.clone(), &config),
        state,
        mailer,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: &Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: &Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Account helpers
// ---------------------------------------------------------------------------

/// Register, activate and log in; returns the session token.
pub async fn signed_in_user(app: &TestApp, email: &str, organization_id: i64) -> String {
    let created = post_json(
        &app.router,
        "/users/new",
        serde_json::json!({
            "email": email,
            "password": "abcdef",
            "organizationId": organization_id,
        }),
    )
    .await;
    assert_eq!(created.status(), 201);

    let token = app.mailer.last_token_for(email);
    let activated = post_json(
        &app.router,
        "/users/activate",
        serde_json::json!({ "email": email, "activation_token": token }),
    )
    .await;
    assert_eq!(activated.status(), 202);

    let login = post_json(
        &app.router,
        "/users/login",
        serde_json::json!({
            "email": email,
            "password": "abcdef",
            "organizationId": organization_id,
        }),
    )
    .await;
    assert_eq!(login.status(), 201);
    body_json(login).await["token"]
        .as_str()
        .expect("login returns a token")
        .to_string()
}
