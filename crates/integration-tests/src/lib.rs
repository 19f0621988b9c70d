//! Integration tests for Campfinder.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests (in-memory stores, fake mailer and geocoder)
//! cargo test -p campfinder-integration-tests
//!
//! # HTTP tests against a running server
//! CAMPFINDER_BASE_URL=http://localhost:3000 cargo test -p campfinder-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `user_flows` - Registration, login and one-time code flows
//! - `bootcamp_flows` - Bootcamp and course lifecycle, enrollment, average cost
//! - `http_api` - Live server checks (ignored by default)

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use campfinder_api::routes;
use campfinder_api::state::AppState;
use campfinder_api::test_support::{RecordingMailer, memory_services};

/// Base URL for a running API (configurable via environment).
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("CAMPFINDER_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// The full router over in-memory stores.
pub struct TestApp {
    router: Router,
    pub mailer: Arc<RecordingMailer>,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        let (services, mailer) = memory_services();
        Self {
            router: routes::router(AppState::without_database(services)),
            mailer,
        }
    }

    /// POST a GraphQL document to `/graphql` and return the JSON body.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be served or the body is not JSON.
    pub async fn graphql(&self, query: &str, variables: Value, token: Option<&str>) -> Value {
        let mut request = Request::builder()
            .method("POST")
            .uri("/graphql")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = json!({ "query": query, "variables": variables }).to_string();

        let response = self
            .router
            .clone()
            .oneshot(request.body(Body::from(body)).expect("Failed to build request"))
            .await
            .expect("Router failed");
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        serde_json::from_slice(&bytes).expect("Response is not JSON")
    }

    /// Register an account and return its session token.
    ///
    /// # Panics
    ///
    /// Panics if registration or login fails.
    pub async fn register(&self, name: &str, email: &str, role: &str) -> String {
        let body = self
            .graphql(
                ADD_USER,
                json!({"name": name, "email": email, "role": role, "password": "password"}),
                None,
            )
            .await;
        assert!(body.get("errors").is_none(), "registration failed: {body}");
        self.login(email, "password").await
    }

    /// Log in and return the session token.
    ///
    /// # Panics
    ///
    /// Panics if login fails.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let body = self
            .graphql(LOGIN, json!({"email": email, "password": password}), None)
            .await;
        body["data"]["loginUser"]
            .as_str()
            .unwrap_or_else(|| panic!("login failed: {body}"))
            .to_owned()
    }
}

/// First error message of a response, if any.
#[must_use]
pub fn error_message(body: &Value) -> Option<&str> {
    body["errors"][0]["message"].as_str()
}

/// First error code of a response, if any.
#[must_use]
pub fn error_code(body: &Value) -> Option<&str> {
    body["errors"][0]["extensions"]["code"].as_str()
}

pub const ADD_USER: &str = r"
    mutation AddNewUser($name: String!, $email: String!, $role: Role, $password: String!) {
        addNewUser(name: $name, email: $email, role: $role, password: $password) {
            id name email role isEmailConfirmed
        }
    }";

pub const LOGIN: &str = r"
    mutation Login($email: String!, $password: String!) {
        loginUser(email: $email, password: $password)
    }";
