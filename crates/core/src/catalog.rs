//! Read-only catalog records.
//!
//! These mirror the shape of the commerce API responses closely enough that
//! nullable source data stays nullable here. The option resolver and the
//! category filters decide what to drop; conversions in the storefront crate
//! do not.

use serde::{Deserialize, Serialize};

use crate::types::Price;

// =============================================================================
// Categories
// =============================================================================

/// A node in the category tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Numeric category id as a string (empty when the API returned none).
    pub id: String,
    /// Display name (empty when the API returned none).
    pub name: String,
    /// URL key used for visibility rules.
    pub url_key: Option<String>,
    /// HTML description.
    pub description: Option<String>,
    /// SEO title override.
    pub meta_title: Option<String>,
    /// SEO description override.
    pub meta_description: Option<String>,
    /// Child categories in API order.
    pub children: Vec<Category>,
}

// =============================================================================
// Products
// =============================================================================

/// Regular and final (discounted) price of a product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub regular: Option<Price>,
    pub final_price: Option<Price>,
}

impl PriceRange {
    /// The price a customer pays: final price, falling back to regular.
    #[must_use]
    pub fn display_price(&self) -> Option<&Price> {
        self.final_price.as_ref().or(self.regular.as_ref())
    }

    /// True when the final price is strictly below the regular price.
    #[must_use]
    pub fn is_discounted(&self) -> bool {
        match (&self.final_price, &self.regular) {
            (Some(final_price), Some(regular)) => final_price.amount < regular.amount,
            _ => false,
        }
    }
}

/// Thumbnail image for product listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub url: String,
    pub label: Option<String>,
}

/// Product as it appears in category grids and search results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub url_key: Option<String>,
    pub small_image: Option<ProductImage>,
    pub price: PriceRange,
}

/// Which kind of product the API reported (`__typename`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductKind {
    #[default]
    Simple,
    Configurable,
    Other(String),
}

impl ProductKind {
    /// Map a GraphQL `__typename` to a product kind.
    #[must_use]
    pub fn from_type_name(type_name: &str) -> Self {
        match type_name {
            "SimpleProduct" => Self::Simple,
            "ConfigurableProduct" => Self::Configurable,
            other => Self::Other(other.to_owned()),
        }
    }

    /// The GraphQL type name for display.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::Simple => "SimpleProduct",
            Self::Configurable => "ConfigurableProduct",
            Self::Other(name) => name,
        }
    }
}

/// A category reference on a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCategory {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// A media gallery entry; `file` is relative to the media base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaEntry {
    pub id: Option<String>,
    pub file: Option<String>,
    pub label: Option<String>,
}

/// Raw configurable option as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurableOptionRecord {
    pub uid: Option<String>,
    pub label: Option<String>,
    pub values: Vec<Option<ConfigurableValueRecord>>,
}

/// Raw configurable option value as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurableValueRecord {
    pub uid: Option<String>,
    pub label: Option<String>,
}

/// Full product record for the detail page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductDetail {
    pub kind: ProductKind,
    pub sku: Option<String>,
    pub name: Option<String>,
    /// Magento rating summary on a 0..100 scale.
    pub rating_summary: Option<f64>,
    pub review_count: Option<u32>,
    pub short_description_html: Option<String>,
    pub description_html: Option<String>,
    pub categories: Vec<ProductCategory>,
    pub media_gallery: Vec<MediaEntry>,
    pub price: PriceRange,
    /// Only populated for configurable products.
    pub configurable_options: Vec<Option<ConfigurableOptionRecord>>,
}

impl ProductDetail {
    /// First category that has both an id and a name.
    #[must_use]
    pub fn main_category(&self) -> Option<&ProductCategory> {
        self.categories.iter().find(|c| {
            c.id.as_deref().is_some_and(|id| !id.is_empty())
                && c.name.as_deref().is_some_and(|name| !name.is_empty())
        })
    }

    /// Category names, skipping entries without one.
    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories
            .iter()
            .filter_map(|c| c.name.as_deref())
            .filter(|name| !name.is_empty())
    }

    /// Gallery entries that reference a file, limited to `limit`.
    pub fn gallery(&self, limit: usize) -> impl Iterator<Item = &MediaEntry> {
        self.media_gallery
            .iter()
            .filter(|entry| entry.file.as_deref().is_some_and(|f| !f.is_empty()))
            .take(limit)
    }
}
