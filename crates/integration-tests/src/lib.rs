//! Integration tests for the Massdata storefront.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the storefront against a reachable Magento backend
//! cargo run -p massdata-storefront
//!
//! # Run integration tests
//! cargo test -p massdata-integration-tests -- --ignored
//! ```
//!
//! `STOREFRONT_BASE_URL` selects the server (default `http://localhost:3000`).
//! `STOREFRONT_TEST_SKU` names a product that exists in the backend catalog
//! (default `MS09`).

use reqwest::Client;

/// Base URL of the storefront under test.
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL")
        .unwrap_or_else(|_| "http://localhost:3000".to_string())
        .trim_end_matches('/')
        .to_string()
}

/// SKU of a product known to exist in the backend catalog.
#[must_use]
pub fn test_sku() -> String {
    std::env::var("STOREFRONT_TEST_SKU").unwrap_or_else(|_| "MS09".to_string())
}

/// A client that keeps the session cookie between requests and does not
/// follow redirects.
///
/// # Panics
///
/// Panics if the HTTP client cannot be built.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}
