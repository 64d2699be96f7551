//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all server endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::sync::Mutex;
use std::time::Duration;

/// HTTP test client with bearer-token session management
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
    /// The stored bearer token, if authenticated
    token: Mutex<Option<String>>,
}

impl TestClient {
    /// Creates a new unauthenticated client
    ///
    /// Use this for testing authentication flows.
    /// For most tests, use `authenticated()` instead.
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            client,
            base_url,
            token: Mutex::new(None),
        }
    }

    /// Creates a client pre-authenticated as the admin
    ///
    /// # Panics
    ///
    /// Panics if authentication fails (indicates test infrastructure problem).
    pub async fn authenticated(base_url: String) -> Self {
        let client = Self::new(base_url);

        let response = client.login(ADMIN_USER, ADMIN_PASS).await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::OK,
            "Admin authentication failed"
        );
        let body: Value = response.json().await.expect("Login body was not JSON");
        let token = body["token"].as_str().expect("Login body had no token");
        client.set_token(Some(token.to_string()));

        client
    }

    /// Overrides the stored token (e.g., with a garbage value).
    pub fn set_token(&self, token: Option<String>) {
        *self.token.lock().unwrap() = token;
    }

    fn auth_header(&self) -> Option<String> {
        self.token
            .lock()
            .unwrap()
            .as_ref()
            .map(|t| format!("Bearer {}", t))
    }

    fn with_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth_header() {
            Some(header) => builder.header("Authorization", header),
            None => builder,
        }
    }

    // ========================================================================
    // Authentication Endpoints
    // ========================================================================

    /// POST /login
    pub async fn login(&self, username: &str, password: &str) -> Response {
        self.client
            .post(format!("{}/login", self.base_url))
            .json(&json!({"username": username, "password": password}))
            .send()
            .await
            .expect("Login request failed")
    }

    // ========================================================================
    // Record Endpoints
    // ========================================================================

    /// GET /media_records
    pub async fn list_records(&self) -> Response {
        self.client
            .get(format!("{}/media_records", self.base_url))
            .send()
            .await
            .expect("List request failed")
    }

    /// GET /media_records, parsed
    pub async fn list_records_json(&self) -> Vec<Value> {
        self.list_records()
            .await
            .json()
            .await
            .expect("List body was not a JSON array")
    }

    /// POST /media_records
    pub async fn create_record(&self, body: &Value) -> Response {
        self.with_auth(self.client.post(format!("{}/media_records", self.base_url)))
            .json(body)
            .send()
            .await
            .expect("Create request failed")
    }

    /// PUT /media_records/{id}
    pub async fn update_record(&self, id: &str, body: &Value) -> Response {
        self.with_auth(
            self.client
                .put(format!("{}/media_records/{}", self.base_url, id)),
        )
        .json(body)
        .send()
        .await
        .expect("Update request failed")
    }

    /// PUT /public/media_records/{id}
    pub async fn public_update_status(&self, id: &str, watched_status: &str) -> Response {
        self.client
            .put(format!("{}/public/media_records/{}", self.base_url, id))
            .json(&json!({"watched_status": watched_status}))
            .send()
            .await
            .expect("Public update request failed")
    }

    /// DELETE /media_records/{id}
    pub async fn delete_record(&self, id: &str) -> Response {
        self.with_auth(
            self.client
                .delete(format!("{}/media_records/{}", self.base_url, id)),
        )
        .send()
        .await
        .expect("Delete request failed")
    }

    /// GET / (server stats)
    pub async fn stats(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Stats request failed")
    }
}
