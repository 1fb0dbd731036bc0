//! HTTP routes for the catalog API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                    - Liveness
//! GET    /health/ready              - Readiness (database ping)
//!
//! # Auth (rate limited)
//! POST   /auth/register             - Create an account
//! POST   /auth/login                - Exchange credentials for a bearer token
//! GET    /auth/me                   - Current user              [bearer]
//!
//! # Categories
//! GET    /api/categories            - List, ordered by name
//! POST   /api/categories            - Create
//! GET    /api/categories/{id}       - Show
//! PATCH  /api/categories/{id}       - Partial update
//! DELETE /api/categories/{id}       - Delete (refused while in use)
//!
//! # Products                                                  [bearer]
//! GET    /api/products              - Filtered, paginated list
//! POST   /api/products              - Create (JSON)
//! POST   /api/products/with-image   - Create (multipart, optional image)
//! GET    /api/products/search?q=    - Name/description search
//! GET    /api/products/{id}         - Show
//! PATCH  /api/products/{id}         - Partial update
//! DELETE /api/products/{id}         - Delete
//!
//! # Upload                                                    [bearer]
//! POST   /api/upload/image          - Validate and inline-encode an image
//! ```

pub mod auth;
pub mod categories;
pub mod products;
pub mod upload;

use std::time::Duration;

use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, Method, StatusCode, Uri},
    middleware::from_fn,
    routing::{get, post},
};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::error::AppError;
use crate::middleware::{auth_rate_limiter, request_id_middleware, security_headers_middleware};
use crate::state::AppState;

/// `{"message": ...}` confirmation body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    #[must_use]
    pub const fn new(message: &'static str) -> Self {
        Self { message }
    }
}

/// Create the auth routes router.
///
/// Only the credential endpoints sit behind the rate limiter; `/me` is added
/// after the layer so token checks don't spend the login budget.
pub fn auth_routes(rate_limited: bool) -> Router<AppState> {
    let credentials = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let credentials = if rate_limited {
        credentials.layer(auth_rate_limiter())
    } else {
        credentials
    };

    credentials.route("/me", get(auth::me))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index).post(categories::create))
        .route(
            "/{id}",
            get(categories::show)
                .patch(categories::update)
                .delete(categories::destroy),
        )
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/with-image",
            post(products::create_with_image).layer(DefaultBodyLimit::max(upload::UPLOAD_BODY_LIMIT)),
        )
        .route("/search", get(products::search))
        .route(
            "/{id}",
            get(products::show)
                .patch(products::update)
                .delete(products::destroy),
        )
}

/// Create the upload routes router.
pub fn upload_routes() -> Router<AppState> {
    Router::new().route(
        "/image",
        post(upload::image).layer(DefaultBodyLimit::max(upload::UPLOAD_BODY_LIMIT)),
    )
}

/// Build the complete application with all middleware applied.
pub fn app(state: AppState) -> Router {
    let config = state.config();

    let api = Router::new()
        .nest("/categories", category_routes())
        .nest("/products", product_routes())
        .nest("/upload", upload_routes());

    let mut router = Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/auth", auth_routes(config.auth_rate_limit))
        .nest("/api", api)
        .fallback(not_found)
        .layer(from_fn(security_headers_middleware));

    if let Some(cors) = cors_layer(&config.cors_origins) {
        router = router.layer(cors);
    }

    router
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Build a CORS layer for the configured origins, if any.
fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            HeaderValue::from_str(origin)
                .inspect_err(|_| tracing::warn!(%origin, "ignoring invalid CORS origin"))
                .ok()
        })
        .collect();

    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
            ])
            .allow_headers([
                axum::http::header::AUTHORIZATION,
                axum::http::header::CONTENT_TYPE,
            ]),
    )
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

async fn not_found(method: Method, uri: Uri) -> AppError {
    AppError::NotFound(format!("Cannot {method} {}", uri.path()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use axum::response::Response;
    use secrecy::ExposeSecret;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use crate::config::test_config;

    /// Router over a pool that never connects; only database-free paths work.
    fn test_app() -> Router {
        app_with_config(test_config())
    }

    fn app_with_config(config: crate::config::ApiConfig) -> Router {
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy(config.database_url.expose_secret())
            .unwrap();
        app(AppState::new(config, pool))
    }

    async fn send(request: Request<Body>) -> Response {
        test_app().oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = send(get("/health")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"ok");
    }

    #[tokio::test]
    async fn test_security_headers_applied() {
        let response = send(get("/health")).await;
        let headers = response.headers();
        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(headers[header::X_FRAME_OPTIONS], "DENY");
        assert_eq!(headers[header::REFERRER_POLICY], "no-referrer");
        assert_eq!(headers[header::CACHE_CONTROL], "no-store");
    }

    #[tokio::test]
    async fn test_request_id_echoed_or_generated() {
        let request = Request::builder()
            .uri("/health")
            .header("x-request-id", "req-123")
            .body(Body::empty())
            .unwrap();
        let response = send(request).await;
        assert_eq!(response.headers()["x-request-id"], "req-123");

        let response = send(get("/health")).await;
        let generated = response.headers()["x-request-id"].to_str().unwrap();
        assert!(uuid::Uuid::parse_str(generated).is_ok());
    }

    #[tokio::test]
    async fn test_products_require_bearer_token() {
        let response = send(get("/api/products")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = json_body(response).await;
        assert_eq!(json["statusCode"], 401);
        assert_eq!(json["error"], "Unauthorized");
    }

    #[tokio::test]
    async fn test_rejects_invalid_token() {
        let request = Request::builder()
            .uri("/auth/me")
            .header(header::AUTHORIZATION, "Bearer not.a.jwt")
            .body(Body::empty())
            .unwrap();
        let response = send(request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["message"], "Invalid token");
    }

    #[tokio::test]
    async fn test_upload_requires_bearer_token() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/upload/image")
            .body(Body::empty())
            .unwrap();
        let response = send(request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_category_id_is_bad_request() {
        let response = send(get("/api/categories/not-a-uuid")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["statusCode"], 400);
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let response = send(post_json("/api/categories", "{\"name\": ")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_register_validates_before_touching_database() {
        let response = send(post_json(
            "/auth/register",
            r#"{"email":"not-an-email","username":"ada","password":"secret1"}"#,
        ))
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["message"],
            "email must contain a single @ symbol"
        );

        let response = send(post_json(
            "/auth/register",
            r#"{"email":"ada@example.com","username":"ada","password":"123"}"#,
        ))
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["message"],
            "password must be at least 6 characters"
        );
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let response = send(get("/nope")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["message"], "Cannot GET /nope");
    }

    fn from_client(mut request: Request<Body>, ip: &str) -> Request<Body> {
        request
            .headers_mut()
            .insert("x-forwarded-for", HeaderValue::from_str(ip).unwrap());
        request
    }

    #[tokio::test]
    async fn test_login_throttling_uses_json_body() {
        let app = app_with_config(crate::config::ApiConfig {
            auth_rate_limit: true,
            ..test_config()
        });
        let login = || {
            from_client(
                post_json("/auth/login", r#"{"email":"nope","password":"x"}"#),
                "203.0.113.5",
            )
        };

        for _ in 0..5 {
            let response = app.clone().oneshot(login()).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }

        let response = app.clone().oneshot(login()).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key(header::RETRY_AFTER));
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        let json = json_body(response).await;
        assert_eq!(json["statusCode"], 429);
        assert_eq!(json["message"], "Too many requests");
    }

    #[tokio::test]
    async fn test_me_is_not_rate_limited() {
        let app = app_with_config(crate::config::ApiConfig {
            auth_rate_limit: true,
            ..test_config()
        });

        for _ in 0..8 {
            let request = from_client(get("/auth/me"), "203.0.113.6");
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_cors_layer_only_with_origins() {
        assert!(cors_layer(&[]).is_none());
        assert!(cors_layer(&["https://shop.test".to_string()]).is_some());
    }
}
