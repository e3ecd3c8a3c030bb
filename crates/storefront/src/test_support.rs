//! Test helpers: an in-process Magento GraphQL endpoint with canned data.

#![allow(clippy::unwrap_used)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::{Value, json};
use url::Url;

use crate::config::{MagentoConfig, SentryConfig, StorefrontConfig};

pub const MEDIA_BASE_URL: &str = "https://backend.reachdigital.dev/media/catalog/product";

/// Catalog config pointing at `graphql_url`, without credentials.
pub fn magento_config(graphql_url: &str) -> MagentoConfig {
    MagentoConfig {
        graphql_url: Url::parse(graphql_url).unwrap(),
        media_base_url: MEDIA_BASE_URL.to_string(),
        store_code: None,
        access_token: None,
        cache_ttl: Duration::from_secs(300),
        request_timeout: Duration::from_secs(5),
    }
}

/// Full storefront config using `magento`.
pub fn storefront_config(magento: MagentoConfig) -> StorefrontConfig {
    StorefrontConfig {
        host: "127.0.0.1".parse().unwrap(),
        port: 3000,
        base_url: Url::parse("http://localhost:3000").unwrap(),
        magento,
        sentry: SentryConfig::default(),
    }
}

#[derive(Debug, Clone)]
struct RecordedRequest {
    operation: String,
    variables: Value,
}

type Requests = Arc<Mutex<Vec<RecordedRequest>>>;

/// A running mock catalog endpoint.
///
/// Canned responses:
/// - `Categories`: Men (with Crew and a hidden test child), Women, Sale and a
///   hidden homepage banner category
/// - `ProductsByCategory`: `SOCK-RED` and `SHIRT-1` for category `3`, nothing
///   otherwise
/// - `ProductBySku`: `SHIRT-1` (configurable, Size S/M/L and Color
///   Red/Blue), `SOCK-RED` (simple), `BROKEN` answers with a GraphQL error,
///   anything else is not found
/// - `SearchProducts`: both products for `sock`, HTTP 429 with
///   `Retry-After: 30` for `ratelimit`, nothing otherwise
pub struct MockCatalog {
    addr: SocketAddr,
    requests: Requests,
}

impl MockCatalog {
    pub async fn start() -> Self {
        let requests = Requests::default();
        let app = Router::new()
            .route("/graphql", post(handle))
            .with_state(requests.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, requests }
    }

    pub fn url(&self) -> String {
        format!("http://{}/graphql", self.addr)
    }

    pub fn config(&self) -> MagentoConfig {
        magento_config(&self.url())
    }

    /// Number of requests received for `operation`.
    pub fn request_count(&self, operation: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.operation == operation)
            .count()
    }

    /// Variables of the most recent `operation` request.
    pub fn last_variables(&self, operation: &str) -> Option<Value> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|r| r.operation == operation)
            .map(|r| r.variables.clone())
    }
}

async fn handle(State(requests): State<Requests>, Json(body): Json<Value>) -> Response {
    let operation = body["operationName"].as_str().unwrap_or_default().to_string();
    let variables = body["variables"].clone();
    requests.lock().unwrap().push(RecordedRequest {
        operation: operation.clone(),
        variables: variables.clone(),
    });

    match operation.as_str() {
        "Categories" => Json(json!({ "data": { "categories": { "items": [categories()] } } }))
            .into_response(),
        "ProductsByCategory" => {
            let items = if variables["categoryId"] == "3" {
                vec![red_sock_summary(), shirt_summary()]
            } else {
                Vec::new()
            };
            Json(json!({ "data": { "products": { "items": items } } })).into_response()
        }
        "SearchProducts" => match variables["term"].as_str() {
            Some("ratelimit") => (
                StatusCode::TOO_MANY_REQUESTS,
                [("Retry-After", "30")],
                "slow down",
            )
                .into_response(),
            Some("sock") => Json(json!({
                "data": { "products": { "items": [red_sock_summary(), shirt_summary()] } }
            }))
            .into_response(),
            _ => Json(json!({ "data": { "products": { "items": [] } } })).into_response(),
        },
        "ProductBySku" => match variables["sku"].as_str() {
            Some("SHIRT-1") => product_response(shirt_detail()),
            Some("SOCK-RED") => product_response(red_sock_detail()),
            Some("BROKEN") => Json(json!({
                "errors": [{
                    "message": "Internal server error",
                    "locations": [{ "line": 1, "column": 1 }],
                    "path": ["products"]
                }]
            }))
            .into_response(),
            _ => Json(json!({ "data": { "products": { "items": [] } } })).into_response(),
        },
        _ => (StatusCode::BAD_REQUEST, "unknown operation").into_response(),
    }
}

fn product_response(item: Value) -> Response {
    Json(json!({ "data": { "products": { "items": [item] } } })).into_response()
}

// =============================================================================
// Fixtures
// =============================================================================

fn category(id: i64, name: &str, url_key: &str, children: &[Value]) -> Value {
    json!({
        "id": id,
        "name": name,
        "url_key": url_key,
        "description": null,
        "meta_title": null,
        "meta_description": null,
        "children": children,
    })
}

fn categories() -> Value {
    let mut men = category(
        3,
        "Men",
        "men",
        &[
            category(31, "Crew", "crew", &[]),
            category(32, "Test Category", "test-category", &[]),
        ],
    );
    men["description"] = json!("<p>Socks for <b>men</b>.</p>");

    category(
        2,
        "Default Category",
        "default-category",
        &[
            men,
            category(4, "Women", "women", &[]),
            category(5, "Sale", "sale", &[]),
            category(6, "Homepage Banner", "home-banner", &[]),
        ],
    )
}

fn price(regular: f64, final_price: f64) -> Value {
    json!({
        "minimum_price": {
            "regular_price": { "value": regular, "currency": "USD" },
            "final_price": { "value": final_price, "currency": "USD" }
        }
    })
}

fn red_sock_summary() -> Value {
    json!({
        "sku": "SOCK-RED",
        "name": "Red Sock",
        "url_key": "red-sock",
        "small_image": {
            "url": format!("{MEDIA_BASE_URL}/r/e/red-sock.jpg"),
            "label": "Red Sock"
        },
        "price_range": price(12.0, 9.99),
    })
}

fn shirt_summary() -> Value {
    json!({
        "sku": "SHIRT-1",
        "name": "Shirt",
        "url_key": "shirt",
        "small_image": null,
        "price_range": price(29.99, 19.99),
    })
}

fn option_values(values: &[(&str, &str)]) -> Value {
    values
        .iter()
        .map(|(uid, label)| json!({ "uid": uid, "label": label }))
        .collect()
}

fn shirt_detail() -> Value {
    json!({
        "__typename": "ConfigurableProduct",
        "sku": "SHIRT-1",
        "name": "Shirt",
        "rating_summary": 90,
        "review_count": 4,
        "short_description": { "html": "<p>Soft <b>cotton</b> shirt.</p>" },
        "description": { "html": "<p>Made to last.</p>" },
        "categories": [{ "id": 3, "name": "Men" }],
        "media_gallery_entries": [
            { "id": 1, "file": "/s/h/shirt-front.jpg", "label": "Front" },
            { "id": 2, "file": "/s/h/shirt-back.jpg", "label": null }
        ],
        "price_range": price(29.99, 19.99),
        "configurable_options": [
            {
                "uid": "size",
                "label": "Size",
                "values": option_values(&[("s", "S"), ("m", "M"), ("l", "L")])
            },
            {
                "uid": "color",
                "label": "Color",
                "values": option_values(&[("red", "Red"), ("blue", "Blue")])
            }
        ]
    })
}

fn red_sock_detail() -> Value {
    json!({
        "__typename": "SimpleProduct",
        "sku": "SOCK-RED",
        "name": "Red Sock",
        "rating_summary": 0,
        "review_count": 0,
        "short_description": { "html": "" },
        "description": { "html": "<p>Bright.</p>" },
        "categories": [{ "id": 3, "name": "Men" }],
        "media_gallery_entries": [],
        "price_range": price(12.0, 9.99),
    })
}
