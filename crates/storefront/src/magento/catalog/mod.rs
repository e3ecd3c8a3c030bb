//! Catalog client implementation.
//!
//! Uses `graphql_client` envelopes with `reqwest` 0.13 for HTTP. Categories,
//! category listings and product details are cached using `moka`.

mod cache;
mod conversions;
pub mod queries;

use std::sync::Arc;

use graphql_client::{GraphQLQuery, Response};
use massdata_core::{Category, ProductDetail, ProductSummary};
use moka::future::Cache;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::{debug, instrument};

use crate::config::MagentoConfig;
use crate::magento::{CatalogError, GraphQLError};

use cache::{CacheKey, CacheValue};
use conversions::{convert_categories, convert_product_detail, convert_product_list};
use queries::{
    Categories, ProductBySku, ProductsByCategory, SearchProducts, categories, product_by_sku,
    products_by_category, search_products,
};

/// Longest response body excerpt written to logs.
const LOG_BODY_LIMIT: usize = 500;

// =============================================================================
// CatalogClient
// =============================================================================

/// Client for the Magento catalog GraphQL API.
///
/// Categories, category listings and product details are cached for the
/// configured TTL. Search results are always fetched fresh.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    endpoint: String,
    media_base_url: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Http` if the HTTP client cannot be built, for
    /// example when the access token is not a valid header value.
    pub fn new(config: &MagentoConfig) -> Result<Self, CatalogError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(store) = config.store_code.as_deref()
            && let Ok(value) = HeaderValue::from_str(store)
        {
            headers.insert("Store", value);
        }
        if let Some(token) = &config.access_token
            && let Ok(mut value) =
                HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
        {
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                endpoint: config.graphql_url.to_string(),
                media_base_url: config.media_base_url.trim_end_matches('/').to_string(),
                cache,
            }),
        })
    }

    /// Absolute URL of a media gallery file such as `/s/h/shirt.jpg`.
    #[must_use]
    pub fn media_url(&self, file: &str) -> String {
        let base = &self.inner.media_base_url;
        if file.starts_with('/') {
            format!("{base}{file}")
        } else {
            format!("{base}/{file}")
        }
    }

    /// Execute a GraphQL operation.
    async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, CatalogError> {
        let request_body = Q::build_query(variables);
        let operation = request_body.operation_name;

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(CatalogError::RateLimited(retry_after));
        }

        // Read the body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                operation,
                body = %excerpt(&response_text, LOG_BODY_LIMIT),
                "Catalog API returned non-success status"
            );
            return Err(CatalogError::GraphQL(vec![GraphQLError::local(format!(
                "HTTP {status}: {}",
                excerpt(&response_text, 200)
            ))]));
        }

        let response: Response<Q::ResponseData> = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    operation,
                    body = %excerpt(&response_text, LOG_BODY_LIMIT),
                    "Failed to parse catalog GraphQL response"
                );
                return Err(CatalogError::Parse(e));
            }
        };

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            debug!(errors = ?errors, operation, "GraphQL errors in response");
            return Err(CatalogError::GraphQL(
                errors.into_iter().map(GraphQLError::from).collect(),
            ));
        }

        response.data.ok_or_else(|| {
            tracing::error!(
                operation,
                body = %excerpt(&response_text, LOG_BODY_LIMIT),
                "Catalog GraphQL response has no data and no errors"
            );
            CatalogError::GraphQL(vec![GraphQLError::local("No data in response")])
        })
    }

    // =========================================================================
    // Category Methods
    // =========================================================================

    /// Get the top-level categories with their direct children.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Arc<[Category]>, CatalogError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let data = self
            .execute::<Categories>(categories::Variables {})
            .await?;
        let categories: Arc<[Category]> = convert_categories(data).into();

        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(Arc::clone(&categories)),
            )
            .await;

        Ok(categories)
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get up to `limit` products in a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(category_id = %category_id))]
    pub async fn products_by_category(
        &self,
        category_id: &str,
        limit: u32,
    ) -> Result<Arc<[ProductSummary]>, CatalogError> {
        let cache_key = CacheKey::CategoryProducts {
            category_id: category_id.to_string(),
            limit,
        };

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for category products");
            return Ok(products);
        }

        let variables = products_by_category::Variables {
            category_id: category_id.to_string(),
            limit: i64::from(limit),
        };
        let data = self.execute::<ProductsByCategory>(variables).await?;
        let products: Arc<[ProductSummary]> = convert_product_list(data.products).into();

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(Arc::clone(&products)))
            .await;

        Ok(products)
    }

    /// Get a product by SKU. Returns `Ok(None)` when no product matches.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(sku = %sku))]
    pub async fn product_by_sku(&self, sku: &str) -> Result<Option<Arc<ProductDetail>>, CatalogError> {
        let cache_key = CacheKey::Product(sku.to_string());

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let variables = product_by_sku::Variables {
            sku: sku.to_string(),
        };
        let data = self.execute::<ProductBySku>(variables).await?;
        let product = convert_product_detail(data).map(Arc::new);

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(product.clone()))
            .await;

        Ok(product)
    }

    /// Search products by free text. Never cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(term = %term))]
    pub async fn search_products(
        &self,
        term: &str,
        limit: u32,
    ) -> Result<Vec<ProductSummary>, CatalogError> {
        let variables = search_products::Variables {
            term: term.to_string(),
            limit: i64::from(limit),
        };
        let data = self.execute::<SearchProducts>(variables).await?;
        Ok(convert_product_list(data.products))
    }
}

/// First `limit` characters of `text`.
fn excerpt(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
