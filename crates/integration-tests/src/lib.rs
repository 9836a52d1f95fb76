//! Integration tests for the DyF storefront.
//!
//! Tests drive the full router in-process through [`TestApp`]: the same
//! middleware stack as production, backed by the in-memory document store
//! and `tower_sessions::MemoryStore`. No database or running server is
//! needed.
//!
//! ```bash
//! cargo test -p dyf-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use secrecy::SecretString;
use tower::ServiceExt;

use dyf_core::{Price, ProductId, Role};
use dyf_storefront::config::StoreConfig;
use dyf_storefront::db::{DocumentStore, ProductRepository};
use dyf_storefront::models::{Product, User};
use dyf_storefront::services::auth::{AuthService, SignUpForm};
use dyf_storefront::state::AppState;

/// Name of the session cookie set by the storefront.
pub const SESSION_COOKIE: &str = "dyf_session";

/// Password shared by every seeded account.
pub const PASSWORD: &str = "Qwerty123$";

const SESSION_SECRET: &str =
    "kQ7vX2mN9pL4wR8tY1zB6cH3jF5gD0sA-eU7iO2uK9xM4nV8bT1qW6rE3yZ5aS0d";

/// Configuration for an in-memory storefront.
#[must_use]
pub fn test_config() -> StoreConfig {
    StoreConfig {
        database_url: None,
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        session_secret: SecretString::from(SESSION_SECRET),
        catalog_cache_ttl: Duration::from_secs(60),
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// An application under test plus the store behind it.
pub struct TestApp {
    router: Router,
    store: DocumentStore,
}

impl TestApp {
    /// Build a fresh application with an empty store.
    #[must_use]
    pub fn new() -> Self {
        let store = DocumentStore::memory();
        let state = AppState::new(test_config(), store.clone()).unwrap();
        let router = dyf_storefront::app(state, tower_sessions::MemoryStore::default());
        Self { router, store }
    }

    /// The document store shared with the router.
    #[must_use]
    pub const fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// A browser with no cookies yet.
    #[must_use]
    pub fn client(&self) -> TestClient {
        TestClient {
            router: self.router.clone(),
            cookie: None,
        }
    }

    /// Create an account directly through the service layer.
    pub async fn seed_user(&self, email: &str, rut: &str, name: &str, role: Role) -> User {
        let form = SignUpForm {
            rut: rut.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            password: PASSWORD.to_string(),
            confirm_password: PASSWORD.to_string(),
            phone: "912345678".to_string(),
            shipping_address: "Av. Siempre Viva 742".to_string(),
        };
        AuthService::new(&self.store)
            .create_account(&form, role)
            .await
            .unwrap()
    }

    /// Insert a catalog product.
    pub async fn seed_product(&self, id: &str, title: &str, pesos: u32) -> Product {
        let product = Product {
            id: ProductId::parse(id).unwrap(),
            category: "Herramientas".to_string(),
            description: format!("{title} de prueba"),
            brand: "Bosch".to_string(),
            price: Price::from_pesos(pesos),
            thumbnail_url: format!("https://img.dyf.cl/{id}.jpg"),
            title: title.to_string(),
        };
        ProductRepository::new(&self.store)
            .add(&product)
            .await
            .unwrap();
        product
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// A fully read response.
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

/// A client that keeps the session cookie between requests, like a browser.
pub struct TestClient {
    router: Router,
    cookie: Option<String>,
}

impl TestClient {
    /// Send a GET request.
    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = self.request("GET", uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    /// Send a url-encoded form POST.
    pub async fn post(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = fields
            .iter()
            .map(|(name, value)| {
                format!("{}={}", urlencoding::encode(name), urlencoding::encode(value))
            })
            .collect::<Vec<_>>()
            .join("&");
        let request = self
            .request("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// Log in through the login form, expecting success.
    pub async fn login(&mut self, email: &str) {
        let response = self
            .post("/auth/login", &[("email", email), ("password", PASSWORD)])
            .await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{}", response.body);
    }

    fn request(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        }
    }

    async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        self.remember_cookie(&response);

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            location,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    fn remember_cookie(&mut self, response: &Response) {
        for value in response.headers().get_all(header::SET_COOKIE) {
            let Ok(value) = value.to_str() else { continue };
            let Some(pair) = value.split(';').next() else { continue };
            if let Some(token) = pair.strip_prefix(SESSION_COOKIE).and_then(|r| r.strip_prefix('=')) {
                self.cookie = (!token.is_empty()).then(|| pair.to_string());
            }
        }
    }
}
