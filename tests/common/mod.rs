#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use mongodb::bson::oid::ObjectId;
use regex::{Regex, RegexBuilder};
use serde_json::{json, Value};
use tower::ServiceExt;

use userhub::accounts::jwt::JwtKeys;
use userhub::accounts::repo::UserStore;
use userhub::accounts::repo_types::{PublicUser, User};
use userhub::accounts::service::AccountService;
use userhub::app::build_app;
use userhub::config::{AppConfig, JwtConfig};
use userhub::error::AppError;
use userhub::state::AppState;

pub const TEST_SECRET: &str = "test-secret";

/// In-memory stand-in for the MongoDB store, matching its `$regex`
/// matching semantics.
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
        }
    }

    pub fn dump(&self) -> Vec<User> {
        self.users.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_name_pattern(&self, pattern: &str) -> Result<Vec<PublicUser>, AppError> {
        let re = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| AppError::Internal(e.into()))?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| re.is_match(&u.name))
            .filter_map(|u| u.clone().into_public())
            .collect())
    }

    async fn find_by_contact_pattern(&self, pattern: &str) -> Result<Vec<PublicUser>, AppError> {
        let re = Regex::new(pattern).map_err(|e| AppError::Internal(e.into()))?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| re.is_match(&u.contact))
            .filter_map(|u| u.clone().into_public())
            .collect())
    }

    async fn insert(&self, mut user: User) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict(
                "User with the email already exists".into(),
            ));
        }
        user.id = Some(ObjectId::new());
        users.push(user.clone());
        Ok(user)
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".into(),
        port: 0,
        mongodb_uri: "mongodb://unused".into(),
        mongodb_db: "userhub-test".into(),
        jwt: JwtConfig {
            secret: TEST_SECRET.into(),
            ttl_secs: 3600,
        },
        store_timeout_secs: 5,
    }
}

pub fn test_keys() -> JwtKeys {
    JwtKeys::new(&test_config().jwt)
}

pub fn test_app() -> (Router, Arc<MemoryUserStore>) {
    let config = test_config();
    let store = Arc::new(MemoryUserStore::new());
    let accounts = AccountService::new(
        store.clone(),
        JwtKeys::new(&config.jwt),
        Duration::from_secs(config.store_timeout_secs),
    );
    let state = AppState::from_parts(accounts, Arc::new(config));
    (build_app(state), store)
}

pub fn signup_body(name: &str, email: &str, password: &str, contact: &str) -> Value {
    json!({
        "name": name,
        "email": email,
        "password": password,
        "contact": contact,
        "address": "12 Baker Street",
        "gender": "Male",
        "country": "India",
    })
}

/// Signs up a user through the API and hands back the issued token.
pub async fn seed_user(app: &Router, name: &str, email: &str, contact: &str) -> String {
    let (status, body) = post_json(
        app,
        "/user/signup",
        signup_body(name, email, "password123", contact),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "seed signup failed: {body}");
    body["token"].as_str().unwrap().to_string()
}

pub async fn post_json(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    post_raw(app, path, &body.to_string()).await
}

pub async fn post_raw(app: &Router, path: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn get(app: &Router, path: &str, bearer: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

/// GET with a verbatim Authorization header value.
pub async fn get_with_auth(app: &Router, path: &str, auth: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .header(header::AUTHORIZATION, auth)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}
