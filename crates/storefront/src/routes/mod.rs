//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//!
//! # Catalog
//! GET  /category/{id}          - Category page
//! GET  /product/{sku}          - Product detail (?option_<group>=<value>)
//! GET  /search?q=              - Search results
//!
//! # Cart
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (redirects to /cart)
//! GET  /cart/count             - Cart count badge (fragment)
//! GET  /cart/events            - Cart count updates (server-sent events)
//! ```

pub mod cart;
pub mod category;
pub mod home;
pub mod layout;
pub mod product;
pub mod search;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/count", get(cart::count))
        .route("/events", get(cart::events))
}

/// Build the complete routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/category/{id}", get(category::show))
        .route("/product/{sku}", get(product::show))
        .route("/search", get(search::search))
        .nest("/cart", cart_routes())
}
