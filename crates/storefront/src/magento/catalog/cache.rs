//! Cache types for catalog responses.

use std::sync::Arc;

use massdata_core::{Category, ProductDetail, ProductSummary};

/// Cache key for catalog reads. Searches are never cached.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Categories,
    CategoryProducts { category_id: String, limit: u32 },
    Product(String),
}

/// Cached value types.
///
/// Lists are shared behind `Arc` so cache hits don't copy them.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Categories(Arc<[Category]>),
    Products(Arc<[ProductSummary]>),
    /// `None` caches a miss so unknown SKUs don't hit the backend repeatedly.
    Product(Option<Arc<ProductDetail>>),
}
