//! Conversions from GraphQL response shapes to core catalog records.
//!
//! Nullable fields stay nullable. Filtering (hidden categories, incomplete
//! option groups) is left to `massdata_core`.

use massdata_core::{
    Category, ConfigurableOptionRecord, ConfigurableValueRecord, CurrencyCode, MediaEntry, Price,
    PriceRange, ProductCategory, ProductDetail, ProductImage, ProductKind, ProductSummary,
};
use rust_decimal::Decimal;

use super::queries::{self, categories, product_by_sku};

// =============================================================================
// Categories
// =============================================================================

/// Top-level categories: the children of the first root item.
pub fn convert_categories(data: categories::ResponseData) -> Vec<Category> {
    data.categories
        .and_then(|result| result.items)
        .and_then(|items| items.into_iter().flatten().next())
        .and_then(|root| root.children)
        .map(convert_category_list)
        .unwrap_or_default()
}

fn convert_category_list(nodes: Vec<Option<categories::CategoryNode>>) -> Vec<Category> {
    nodes.into_iter().flatten().map(convert_category).collect()
}

fn convert_category(node: categories::CategoryNode) -> Category {
    Category {
        id: node.id.map(|id| id.to_string()).unwrap_or_default(),
        name: node.name.unwrap_or_default(),
        url_key: node.url_key,
        description: node.description,
        meta_title: node.meta_title,
        meta_description: node.meta_description,
        children: node.children.map(convert_category_list).unwrap_or_default(),
    }
}

// =============================================================================
// Prices
// =============================================================================

/// Parse through the shortest decimal representation so `9.99` stays `9.99`.
fn decimal_from_f64(value: f64) -> Option<Decimal> {
    value.to_string().parse().ok()
}

fn convert_money(money: Option<queries::Money>) -> Option<Price> {
    let money = money?;
    let amount = decimal_from_f64(money.value?)?;
    let currency_code = money
        .currency
        .map(CurrencyCode::from)
        .unwrap_or_default();
    Some(Price::new(amount, currency_code))
}

fn convert_price_range(range: Option<queries::PriceRange>) -> PriceRange {
    let minimum = range.and_then(|r| r.minimum_price).unwrap_or_default();
    PriceRange {
        regular: convert_money(minimum.regular_price),
        final_price: convert_money(minimum.final_price),
    }
}

// =============================================================================
// Products
// =============================================================================

/// Product summaries, skipping null entries.
pub fn convert_product_list(list: Option<queries::ProductSummaryList>) -> Vec<ProductSummary> {
    list.and_then(|l| l.items)
        .map(|items| items.into_iter().flatten().map(convert_summary).collect())
        .unwrap_or_default()
}

fn convert_summary(item: queries::ProductSummaryFields) -> ProductSummary {
    ProductSummary {
        sku: item.sku,
        name: item.name,
        url_key: item.url_key,
        small_image: item.small_image.and_then(|image| {
            Some(ProductImage {
                url: image.url.filter(|u| !u.is_empty())?,
                label: image.label,
            })
        }),
        price: convert_price_range(item.price_range),
    }
}

/// The first product in a by-SKU lookup, if any.
pub fn convert_product_detail(data: product_by_sku::ResponseData) -> Option<ProductDetail> {
    data.products
        .and_then(|list| list.items)
        .and_then(|items| items.into_iter().flatten().next())
        .map(convert_product_item)
}

fn convert_product_item(item: product_by_sku::ProductItem) -> ProductDetail {
    ProductDetail {
        kind: item
            .typename
            .as_deref()
            .map(ProductKind::from_type_name)
            .unwrap_or_default(),
        sku: item.sku,
        name: item.name,
        rating_summary: item.rating_summary,
        review_count: item.review_count.and_then(|n| u32::try_from(n).ok()),
        short_description_html: item.short_description.and_then(|t| t.html),
        description_html: item.description.and_then(|t| t.html),
        categories: item
            .categories
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .map(|c| ProductCategory {
                id: c.id.map(|id| id.to_string()),
                name: c.name,
            })
            .collect(),
        media_gallery: item
            .media_gallery_entries
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .map(|m| MediaEntry {
                id: m.id.map(|id| id.to_string()),
                file: m.file,
                label: m.label,
            })
            .collect(),
        price: convert_price_range(item.price_range),
        configurable_options: item
            .configurable_options
            .unwrap_or_default()
            .into_iter()
            .map(|option| option.map(convert_configurable_option))
            .collect(),
    }
}

fn convert_configurable_option(
    option: product_by_sku::ConfigurableOption,
) -> ConfigurableOptionRecord {
    ConfigurableOptionRecord {
        uid: option.uid,
        label: option.label,
        values: option
            .values
            .unwrap_or_default()
            .into_iter()
            .map(|value| {
                value.map(|v| ConfigurableValueRecord {
                    uid: v.uid,
                    label: v.label,
                })
            })
            .collect(),
    }
}
