//! Shopping cart lines and the add-or-merge rule.
//!
//! A [`Cart`] is an ordered sequence of [`CartLineItem`]s. The only mutation
//! is [`Cart::with_item`], which returns a new cart: either the matching
//! line's quantity grows, or the item is appended. Two lines match when they
//! share a SKU and their selected options are equal (see [`options_match`]).
//!
//! ```
//! use massdata_core::{Cart, CartLineItem, CurrencyCode, Price, Sku};
//! use rust_decimal::Decimal;
//!
//! let price = Price::new(Decimal::new(999, 2), CurrencyCode::USD);
//! let sock = CartLineItem::new(Sku::parse("SOCK-RED").unwrap(), "Red Sock", price, 1, None).unwrap();
//!
//! let cart = Cart::new().with_item(sock.clone()).with_item(sock);
//! assert_eq!(cart.lines().len(), 1);
//! assert_eq!(cart.total_quantity(), 2);
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{CurrencyCode, Price, Sku};

/// Errors constructing a cart line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    #[error("quantity must be at least 1")]
    ZeroQuantity,

    #[error("cart total is too large")]
    AmountOverflow,

    #[error("cart mixes {0} and {1} prices")]
    MixedCurrency(CurrencyCode, CurrencyCode),
}

// =============================================================================
// Selected Options
// =============================================================================

/// Option label to value label map attached to a cart line.
///
/// Keeps insertion order for display, but equality ignores order: two maps
/// are equal iff they have the same key set and the same value per key.
/// Labels are unique; deserializing keeps the last value of a repeated label.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<(String, String)>", into = "Vec<(String, String)>")]
pub struct SelectedOptions(Vec<(String, String)>);

impl SelectedOptions {
    /// Create an empty option map.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert or replace the value for `label`.
    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<String>) {
        let label = label.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == label) {
            Some(entry) => entry.1 = value,
            None => self.0.push((label, value)),
        }
    }

    /// Value for `label`, if present.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == label)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `"Size: M, Color: Red"` style summary for display.
    #[must_use]
    pub fn summary(&self) -> String {
        self.iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl PartialEq for SelectedOptions {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl Eq for SelectedOptions {}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SelectedOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut options = Self::new();
        for (k, v) in iter {
            options.insert(k, v);
        }
        options
    }
}

impl From<Vec<(String, String)>> for SelectedOptions {
    fn from(entries: Vec<(String, String)>) -> Self {
        entries.into_iter().collect()
    }
}

impl From<SelectedOptions> for Vec<(String, String)> {
    fn from(options: SelectedOptions) -> Self {
        options.0
    }
}

/// Whether two optional option maps identify the same cart line.
///
/// `None` matches `None`; `None` never matches `Some`, not even an empty
/// map.
#[must_use]
pub fn options_match(a: Option<&SelectedOptions>, b: Option<&SelectedOptions>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

// =============================================================================
// Cart Line
// =============================================================================

/// One line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub product_id: Sku,
    pub name: String,
    pub unit_price: Price,
    pub quantity: u32,
    pub selected_options: Option<SelectedOptions>,
}

impl CartLineItem {
    /// Create a cart line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ZeroQuantity`] if `quantity` is 0.
    pub fn new(
        product_id: Sku,
        name: impl Into<String>,
        unit_price: Price,
        quantity: u32,
        selected_options: Option<SelectedOptions>,
    ) -> Result<Self, CartError> {
        if quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }
        Ok(Self {
            product_id,
            name: name.into(),
            unit_price,
            quantity,
            selected_options,
        })
    }

    /// Whether `other` belongs on this line.
    #[must_use]
    pub fn same_line(&self, other: &Self) -> bool {
        self.product_id == other.product_id
            && options_match(
                self.selected_options.as_ref(),
                other.selected_options.as_ref(),
            )
    }

    /// Unit price times quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::AmountOverflow`] if the total doesn't fit.
    pub fn line_total(&self) -> Result<Price, CartError> {
        self.unit_price
            .times(self.quantity)
            .ok_or(CartError::AmountOverflow)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// Ordered cart lines. No two lines share SKU and options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Return a new cart with `item` merged in.
    ///
    /// If a line with the same SKU and equal options exists, its quantity
    /// grows by `item.quantity` (saturating) and its name and price are kept.
    /// Otherwise `item` is appended.
    #[must_use]
    pub fn with_item(&self, item: CartLineItem) -> Self {
        let mut lines = self.lines.clone();
        match lines.iter_mut().find(|line| line.same_line(&item)) {
            Some(line) => line.quantity = line.quantity.saturating_add(item.quantity),
            None => lines.push(item),
        }
        Self { lines }
    }

    /// Lines in the order they were first added.
    #[must_use]
    pub fn lines(&self) -> &[CartLineItem] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Sum of line totals. `Ok(None)` for an empty cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::MixedCurrency`] if lines are priced in different
    /// currencies, or [`CartError::AmountOverflow`] if the sum doesn't fit.
    pub fn subtotal(&self) -> Result<Option<Price>, CartError> {
        let Some(first) = self.lines.first() else {
            return Ok(None);
        };
        let currency = &first.unit_price.currency_code;

        let mut amount = Decimal::ZERO;
        for line in &self.lines {
            if line.unit_price.currency_code != *currency {
                return Err(CartError::MixedCurrency(
                    currency.clone(),
                    line.unit_price.currency_code.clone(),
                ));
            }
            amount = amount
                .checked_add(line.line_total()?.amount)
                .ok_or(CartError::AmountOverflow)?;
        }

        Ok(Some(Price::new(amount, currency.clone())))
    }
}

impl From<Cart> for Vec<CartLineItem> {
    fn from(cart: Cart) -> Self {
        cart.lines
    }
}
