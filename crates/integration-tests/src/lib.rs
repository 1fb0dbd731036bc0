//! API contract tests for Bazaar.
//!
//! # Running Tests
//!
//! The tests talk to a running server over HTTP and are ignored by default.
//!
//! ```bash
//! # Prepare the database
//! cargo run -p bazaar-cli -- migrate
//!
//! # Start the API without the auth rate limit
//! BAZAAR_AUTH_RATE_LIMIT=false cargo run -p bazaar-api
//!
//! # Run the ignored tests
//! cargo test -p bazaar-integration-tests -- --ignored
//! ```
//!
//! `BAZAAR_BASE_URL` overrides the default `http://localhost:3000`.

use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("BAZAAR_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// A short random suffix so test data never collides across runs.
#[must_use]
pub fn unique(prefix: &str) -> String {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(12).collect();
    format!("{prefix}{suffix}")
}

/// HTTP client bound to the API base URL, optionally carrying a bearer token.
pub struct TestClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl TestClient {
    /// Unauthenticated client.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            client: Client::builder()
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url(),
            token: None,
        }
    }

    /// Register a fresh user, log in, and keep the token.
    ///
    /// # Panics
    ///
    /// Panics if registration or login does not succeed.
    pub async fn authenticated() -> Self {
        let mut client = Self::anonymous();
        let username = unique("user_");
        let email = format!("{username}@example.com");

        let resp = client
            .post("/auth/register")
            .json(&json!({"email": email, "username": username, "password": "secret123"}))
            .send()
            .await
            .expect("Failed to register");
        assert_eq!(resp.status(), StatusCode::CREATED);

        let resp = client
            .post("/auth/login")
            .json(&json!({"email": email, "password": "secret123"}))
            .send()
            .await
            .expect("Failed to log in");
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = resp.json().await.expect("Invalid login response");
        let token = body["token"]
            .as_str()
            .expect("Login response has no token")
            .to_owned();
        client.token = Some(token);
        client
    }

    fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    #[must_use]
    pub fn get(&self, path: &str) -> RequestBuilder {
        self.with_auth(self.client.get(format!("{}{path}", self.base_url)))
    }

    #[must_use]
    pub fn post(&self, path: &str) -> RequestBuilder {
        self.with_auth(self.client.post(format!("{}{path}", self.base_url)))
    }

    #[must_use]
    pub fn patch(&self, path: &str) -> RequestBuilder {
        self.with_auth(self.client.patch(format!("{}{path}", self.base_url)))
    }

    #[must_use]
    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.with_auth(self.client.delete(format!("{}{path}", self.base_url)))
    }

    /// Create a category with a unique name and return its JSON.
    ///
    /// # Panics
    ///
    /// Panics if the category is not created.
    pub async fn create_category(&self) -> Value {
        let resp = self
            .post("/api/categories")
            .json(&json!({"name": unique("Category "), "description": "Created by tests"}))
            .send()
            .await
            .expect("Failed to create category");
        assert_eq!(resp.status(), StatusCode::CREATED);
        resp.json().await.expect("Invalid category response")
    }

    /// Create a product in `category_id` and return its JSON.
    ///
    /// # Panics
    ///
    /// Panics if the product is not created.
    pub async fn create_product(&self, category_id: &str, name: &str, price: &str) -> Value {
        let resp = self
            .post("/api/products")
            .json(&json!({
                "name": name,
                "description": "Created by tests",
                "price": price,
                "stock": 10,
                "categoryId": category_id,
            }))
            .send()
            .await
            .expect("Failed to create product");
        assert_eq!(resp.status(), StatusCode::CREATED);
        resp.json().await.expect("Invalid product response")
    }
}

/// Read a JSON error body and return its `message`.
///
/// # Panics
///
/// Panics if the body is not the standard error shape.
pub async fn error_message(resp: reqwest::Response) -> String {
    let status = resp.status().as_u16();
    let body: Value = resp.json().await.expect("Error body is not JSON");
    assert_eq!(body["statusCode"], status);
    body["message"]
        .as_str()
        .expect("Error body has no message")
        .to_owned()
}
