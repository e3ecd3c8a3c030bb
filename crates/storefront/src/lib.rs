//! Massdata Storefront library.
//!
//! Server-rendered catalog pages over the Magento GraphQL API, with a
//! per-visitor in-memory cart. The binary in `main.rs` only loads config,
//! sets up tracing and Sentry, and serves [`app`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod error;
pub mod filters;
pub mod magento;
pub mod middleware;
pub mod routes;
pub mod state;

#[cfg(test)]
mod test_support;

use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, header::CACHE_CONTROL},
    middleware::{Next, from_fn, from_fn_with_state},
    response::Response,
    routing::get,
};
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::middleware::{
    SecurityHeaders, create_session_layer, request_id_middleware, security_headers_middleware,
};
use crate::state::AppState;

/// Directory served under `/static`.
const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Build the application router with all middleware applied.
pub fn app(state: AppState) -> Router {
    let security_headers = SecurityHeaders::new(&state.config().magento.media_base_url);
    let session_layer = create_session_layer(state.config());

    let static_files = ServiceBuilder::new()
        .layer(from_fn(static_cache_control))
        .service(ServeDir::new(STATIC_DIR));

    Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .nest_service("/static", static_files)
        .layer(session_layer)
        .layer(from_fn_with_state(
            security_headers,
            security_headers_middleware,
        ))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
        .layer(sentry_tower::NewSentryLayer::new_from_top())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the catalog.
async fn health() -> &'static str {
    "ok"
}

/// Hashed files under `derived/` never change; everything else is
/// revalidated hourly.
async fn static_cache_control(request: Request, next: Next) -> Response {
    let immutable = request.uri().path().contains("/derived/");
    let mut response = next.run(request).await;

    if response.status().is_success() {
        let value = if immutable {
            "public, max-age=31536000, immutable"
        } else {
            "public, max-age=3600"
        };
        response
            .headers_mut()
            .insert(CACHE_CONTROL, HeaderValue::from_static(value));
    }

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        body::Body,
        http::{
            StatusCode,
            header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
        },
    };
    use std::time::Duration;

    use axum::body::BodyDataStream;
    use futures::StreamExt;
    use tower::ServiceExt;

    use super::*;
    use crate::middleware::REQUEST_ID_HEADER;
    use crate::test_support::{MockCatalog, storefront_config};

    async fn test_app() -> (Router, MockCatalog) {
        let mock = MockCatalog::start().await;
        let state = AppState::new(storefront_config(mock.config())).unwrap();
        (app(state), mock)
    }

    async fn get_page(app: &Router, uri: &str, cookie: Option<&str>) -> (StatusCode, String) {
        let mut request = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }
        let response = app
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    fn add_request(body: &str, cookie: Option<&str>) -> Request {
        let mut request = Request::builder()
            .method("POST")
            .uri("/cart/add")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }
        request.body(Body::from(body.to_string())).unwrap()
    }

    /// Open `/cart/events` and return its body as a stream.
    async fn open_events(app: &Router, cookie: Option<&str>) -> (Response, BodyDataStream) {
        let mut request = Request::builder().uri("/cart/events");
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }
        let response = app
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let (parts, body) = response.into_parts();
        (Response::from_parts(parts, Body::empty()), body.into_data_stream())
    }

    /// Read until one complete server-sent event has arrived.
    async fn next_event(stream: &mut BodyDataStream, wait: Duration) -> Option<String> {
        let mut event = String::new();
        while !event.contains("\n\n") {
            let chunk = tokio::time::timeout(wait, stream.next()).await.ok()??.unwrap();
            event.push_str(std::str::from_utf8(&chunk).unwrap());
        }
        Some(event)
    }

    /// `name=value` part of the session cookie set on `response`.
    fn session_cookie(response: &Response) -> String {
        let header = response.headers()[SET_COOKIE].to_str().unwrap();
        header.split(';').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _mock) = test_app().await;
        let (status, body) = get_page(&app, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_home_page() {
        let (app, _mock) = test_app().await;
        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
        assert_eq!(response.headers()["x-frame-options"], "DENY");

        let (_, body) = get_page(&app, "/", None).await;
        assert!(body.contains("<title>Homepage - Massdata Commerce®</title>"));
        assert!(body.contains("DISCOVER COMFORT"));
        assert!(body.contains("Red Sock"));
        assert!(body.contains("href=\"/category/3\""));
        assert!(!body.contains("Homepage Banner"));
    }

    #[tokio::test]
    async fn test_category_page() {
        let (app, mock) = test_app().await;
        let (status, body) = get_page(&app, "/category/3", None).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Shop cool Men Socks for men - Massdata Commerce®"));
        assert!(body.contains("Socks for men."));
        assert!(body.contains("Crew"));
        assert!(body.contains("2 products"));
        assert_eq!(mock.last_variables("ProductsByCategory").unwrap()["limit"], 24);
    }

    #[tokio::test]
    async fn test_product_page() {
        let (app, _mock) = test_app().await;
        let (status, body) = get_page(&app, "/product/SHIRT-1?option_size=l", None).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<title>Shirt - Massdata Commerce®</title>"));
        assert!(body.contains("As low as $19.99"));
        assert!(body.contains("4.5/5"));
        assert!(body.contains("name=\"option_size\" value=\"l\""));
        assert!(body.contains("name=\"option_color\" value=\"red\""));
        assert!(body.contains("/s/h/shirt-front.jpg"));
    }

    #[tokio::test]
    async fn test_missing_product_is_not_found() {
        let (app, _mock) = test_app().await;
        let (status, _) = get_page(&app, "/product/NOPE", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_catalog_errors_map_to_gateway_errors() {
        let (app, _mock) = test_app().await;

        let (status, body) = get_page(&app, "/product/BROKEN", None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(!body.contains("Internal server error"));

        let (status, _) = get_page(&app, "/search?q=ratelimit", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_search() {
        let (app, mock) = test_app().await;

        let (status, body) = get_page(&app, "/search?q=%20sock%20", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Red Sock"));
        assert_eq!(mock.last_variables("SearchProducts").unwrap()["term"], "sock");

        let (status, _) = get_page(&app, "/search?q=%20%20", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(mock.request_count("SearchProducts"), 1);
    }

    #[tokio::test]
    async fn test_add_to_cart_flow() {
        let (app, _mock) = test_app().await;

        let response = app
            .clone()
            .oneshot(add_request("sku=SHIRT-1&option_size=m", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/cart");
        let cookie = session_cookie(&response);

        // Same options merge, different options get their own line
        for body in ["sku=SHIRT-1&option_size=m&option_color=red", "sku=SHIRT-1&option_size=l"] {
            let response = app
                .clone()
                .oneshot(add_request(body, Some(&cookie)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::SEE_OTHER);
        }

        let (status, body) = get_page(&app, "/cart", Some(&cookie)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Size: M, Color: Red"));
        assert!(body.contains("Size: L, Color: Red"));
        assert!(body.contains("$59.97"));

        let (_, count) = get_page(&app, "/cart/count", Some(&cookie)).await;
        assert!(count.contains(">3<"));
    }

    #[tokio::test]
    async fn test_add_simple_product_has_no_options() {
        let (app, _mock) = test_app().await;

        let response = app
            .clone()
            .oneshot(add_request("sku=SOCK-RED&quantity=2", None))
            .await
            .unwrap();
        let cookie = session_cookie(&response);

        let (_, body) = get_page(&app, "/cart", Some(&cookie)).await;
        assert!(body.contains("Red Sock"));
        assert!(body.contains("$19.98"));
        assert!(!body.contains("cart-line-options"));
    }

    #[tokio::test]
    async fn test_add_rejects_bad_input() {
        let (app, _mock) = test_app().await;

        let response = app
            .clone()
            .oneshot(add_request("sku=SOCK-RED&quantity=0", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .clone()
            .oneshot(add_request("sku=NOPE", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cart_events_follow_adds() {
        let (app, _mock) = test_app().await;

        let response = app
            .clone()
            .oneshot(add_request("sku=SOCK-RED", None))
            .await
            .unwrap();
        let cookie = session_cookie(&response);

        let (response, mut stream) = open_events(&app, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/event-stream");

        let first = next_event(&mut stream, Duration::from_secs(5)).await.unwrap();
        assert!(first.contains("event: cart-count"));
        assert!(first.contains("data: 1"));

        let response = app
            .clone()
            .oneshot(add_request("sku=SOCK-RED&quantity=2", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let next = next_event(&mut stream, Duration::from_secs(5)).await.unwrap();
        assert!(next.contains("event: cart-count"));
        assert!(next.contains("data: 3"));
    }

    #[tokio::test]
    async fn test_cart_events_without_cart_create_nothing() {
        let (app, _mock) = test_app().await;

        let (response, mut stream) = open_events(&app, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(!response.headers().contains_key(SET_COOKIE));

        let first = next_event(&mut stream, Duration::from_secs(5)).await.unwrap();
        assert!(first.contains("data: 0"));
        assert!(
            next_event(&mut stream, Duration::from_millis(200))
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_empty_cart() {
        let (app, _mock) = test_app().await;

        let (status, body) = get_page(&app, "/cart", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Your cart is empty"));

        let (_, count) = get_page(&app, "/cart/count", None).await;
        assert!(count.contains(">0<"));
    }
}
