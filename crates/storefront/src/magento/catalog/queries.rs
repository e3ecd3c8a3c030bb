//! GraphQL operations against the Magento catalog schema.
//!
//! Each operation implements [`GraphQLQuery`] by hand: the Magento schema is
//! not vendored, so the request variables and response shapes below are
//! written out to match the selection sets in `graphql/magento/queries`.

use graphql_client::{GraphQLQuery, QueryBody};
use serde::Deserialize;

const CATEGORIES_DOCUMENT: &str = include_str!("../../../graphql/magento/queries/categories.graphql");
const PRODUCTS_DOCUMENT: &str = include_str!("../../../graphql/magento/queries/products.graphql");

// =============================================================================
// Shared selections
// =============================================================================

/// `Money` selection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Money {
    pub value: Option<f64>,
    pub currency: Option<String>,
}

/// `price_range { minimum_price { ... } }` selection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PriceRange {
    pub minimum_price: Option<ProductPrice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPrice {
    pub regular_price: Option<Money>,
    pub final_price: Option<Money>,
}

/// `ProductSummaryFields` fragment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductSummaryFields {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub url_key: Option<String>,
    pub small_image: Option<ProductImage>,
    pub price_range: Option<PriceRange>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductImage {
    pub url: Option<String>,
    pub label: Option<String>,
}

/// `products(...) { items { ...ProductSummaryFields } }`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductSummaryList {
    #[serde(default)]
    pub items: Option<Vec<Option<ProductSummaryFields>>>,
}

// =============================================================================
// Categories
// =============================================================================

/// Category tree, two levels below the root.
pub struct Categories;

pub mod categories {
    use serde::{Deserialize, Serialize};

    /// Serializes as `{}`.
    #[derive(Debug, Clone, Default, Serialize)]
    pub struct Variables {}

    #[derive(Debug, Clone, Default, Deserialize)]
    pub struct ResponseData {
        pub categories: Option<CategoryResult>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    pub struct CategoryResult {
        pub items: Option<Vec<Option<CategoryNode>>>,
    }

    /// A category at any level. Leaf levels leave `children` unset.
    #[derive(Debug, Clone, Default, Deserialize)]
    pub struct CategoryNode {
        pub id: Option<i64>,
        pub name: Option<String>,
        pub url_key: Option<String>,
        pub description: Option<String>,
        pub meta_title: Option<String>,
        pub meta_description: Option<String>,
        #[serde(default)]
        pub children: Option<Vec<Option<CategoryNode>>>,
    }
}

impl GraphQLQuery for Categories {
    type Variables = categories::Variables;
    type ResponseData = categories::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: CATEGORIES_DOCUMENT,
            operation_name: "Categories",
        }
    }
}

// =============================================================================
// ProductsByCategory
// =============================================================================

/// Product summaries filtered by category id.
pub struct ProductsByCategory;

pub mod products_by_category {
    use serde::{Deserialize, Serialize};

    use super::ProductSummaryList;

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub category_id: String,
        pub limit: i64,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    pub struct ResponseData {
        pub products: Option<ProductSummaryList>,
    }
}

impl GraphQLQuery for ProductsByCategory {
    type Variables = products_by_category::Variables;
    type ResponseData = products_by_category::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: PRODUCTS_DOCUMENT,
            operation_name: "ProductsByCategory",
        }
    }
}

// =============================================================================
// SearchProducts
// =============================================================================

/// Full-text product search.
pub struct SearchProducts;

pub mod search_products {
    use serde::{Deserialize, Serialize};

    use super::ProductSummaryList;

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub term: String,
        pub limit: i64,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    pub struct ResponseData {
        pub products: Option<ProductSummaryList>,
    }
}

impl GraphQLQuery for SearchProducts {
    type Variables = search_products::Variables;
    type ResponseData = search_products::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: PRODUCTS_DOCUMENT,
            operation_name: "SearchProducts",
        }
    }
}

// =============================================================================
// ProductBySku
// =============================================================================

/// Full product detail, including configurable options.
pub struct ProductBySku;

pub mod product_by_sku {
    use serde::{Deserialize, Serialize};

    use super::PriceRange;

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub sku: String,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    pub struct ResponseData {
        pub products: Option<ProductList>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    pub struct ProductList {
        pub items: Option<Vec<Option<ProductItem>>>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    pub struct ProductItem {
        #[serde(rename = "__typename")]
        pub typename: Option<String>,
        pub sku: Option<String>,
        pub name: Option<String>,
        pub rating_summary: Option<f64>,
        pub review_count: Option<i64>,
        pub short_description: Option<ComplexText>,
        pub description: Option<ComplexText>,
        pub categories: Option<Vec<Option<CategoryRef>>>,
        pub media_gallery_entries: Option<Vec<Option<MediaGalleryEntry>>>,
        pub price_range: Option<PriceRange>,
        /// Only present on `ConfigurableProduct`.
        #[serde(default)]
        pub configurable_options: Option<Vec<Option<ConfigurableOption>>>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    pub struct ComplexText {
        pub html: Option<String>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    pub struct CategoryRef {
        pub id: Option<i64>,
        pub name: Option<String>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    pub struct MediaGalleryEntry {
        pub id: Option<i64>,
        pub file: Option<String>,
        pub label: Option<String>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    pub struct ConfigurableOption {
        pub uid: Option<String>,
        pub label: Option<String>,
        pub values: Option<Vec<Option<ConfigurableOptionValue>>>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    pub struct ConfigurableOptionValue {
        pub uid: Option<String>,
        pub label: Option<String>,
    }
}

impl GraphQLQuery for ProductBySku {
    type Variables = product_by_sku::Variables;
    type ResponseData = product_by_sku::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: PRODUCTS_DOCUMENT,
            operation_name: "ProductBySku",
        }
    }
}
