//! Core value types for the storefront.
//!
//! This module provides type-safe wrappers for prices and product SKUs.

pub mod price;
pub mod sku;

pub use price::{CurrencyCode, Price};
pub use sku::{Sku, SkuError};
