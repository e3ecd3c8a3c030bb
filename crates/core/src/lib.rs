//! Massdata Core - Storefront domain logic.
//!
//! This crate holds everything in the storefront that is pure data
//! transformation:
//! - `cart` - Cart lines and the add-or-merge rule
//! - `options` - Configurable option extraction and selection resolution
//! - `categories` - Category visibility and navigation context
//! - `catalog` - Read-only category and product records
//! - `format` - HTML stripping and money formatting for display
//!
//! # Architecture
//!
//! No I/O, no HTTP clients, no async. The `storefront` crate fetches catalog
//! data, converts it into the records defined here, and wraps the cart in a
//! reactive store.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod categories;
pub mod format;
pub mod options;
pub mod types;

pub use cart::{Cart, CartError, CartLineItem, SelectedOptions, options_match};
pub use categories::{
    CategoryContext, find_category_context, is_sale_category, is_visible_category,
    primary_category,
};
pub use catalog::{
    Category, ConfigurableOptionRecord, ConfigurableValueRecord, MediaEntry, PriceRange,
    ProductCategory, ProductDetail, ProductImage, ProductKind, ProductSummary,
};
pub use options::{
    OptionGroup, OptionValue, Selection, all_selected, extract_options, resolve_selection,
    to_cart_option_labels,
};
pub use format::{format_money, rating_out_of_five, strip_html, strip_html_opt};
pub use types::*;
