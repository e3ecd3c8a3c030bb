//! Cart route handlers.
//!
//! The visitor's cart id is kept in the session and maps to a [`CartStore`]
//! in the registry. Adding goes through a plain form post followed by a
//! redirect; the header badge follows the cart over server-sent events.

use std::convert::Infallible;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{
        Redirect,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures::Stream;
use massdata_core::{
    CartLineItem, CurrencyCode, Price, Selection, Sku, all_selected, extract_options,
    format_money, resolve_selection, to_cart_option_labels,
};
use rust_decimal::Decimal;
use tower_sessions::Session;
use tracing::instrument;
use uuid::Uuid;

use crate::cart::{CART_ID_SESSION_KEY, CartSnapshot, CartStore};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::routes::layout::{Layout, TITLE_SUFFIX, product_href};
use crate::routes::product::selection_from_params;
use crate::state::AppState;

/// SSE event name carrying the cart's total quantity.
pub const CART_COUNT_EVENT: &str = "cart-count";

// =============================================================================
// Views
// =============================================================================

/// Cart line display data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineView {
    pub href: String,
    pub name: String,
    pub options: Option<String>,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

impl From<&CartLineItem> for CartLineView {
    fn from(line: &CartLineItem) -> Self {
        Self {
            href: product_href(line.product_id.as_str()),
            name: line.name.clone(),
            options: line
                .selected_options
                .as_ref()
                .filter(|o| !o.is_empty())
                .map(massdata_core::SelectedOptions::summary),
            quantity: line.quantity,
            unit_price: format_money(Some(&line.unit_price)),
            line_total: format_money(line.line_total().ok().as_ref()),
        }
    }
}

/// Cart display data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub subtotal: String,
    pub total_quantity: u64,
}

impl From<&CartSnapshot> for CartView {
    fn from(snapshot: &CartSnapshot) -> Self {
        Self {
            lines: snapshot.lines().iter().map(CartLineView::from).collect(),
            subtotal: match snapshot.subtotal() {
                Ok(Some(subtotal)) => format_money(Some(&subtotal)),
                Ok(None) => "$0.00".to_string(),
                Err(e) => {
                    tracing::warn!(error = %e, "Cart subtotal unavailable");
                    String::new()
                }
            },
            total_quantity: snapshot.total_quantity(),
        }
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// The cart id stored in the session, if any.
async fn cart_id(session: &Session) -> Result<Option<Uuid>> {
    Ok(session.get::<Uuid>(CART_ID_SESSION_KEY).await?)
}

/// The visitor's cart, if they have one.
async fn current_cart(state: &AppState, session: &Session) -> Result<Option<CartStore>> {
    match cart_id(session).await? {
        Some(id) => Ok(state.carts().get(&id).await),
        None => Ok(None),
    }
}

/// The visitor's cart, creating it and recording its id in the session if
/// needed.
async fn cart_for_update(state: &AppState, session: &Session) -> Result<CartStore> {
    let id = match cart_id(session).await? {
        Some(id) => id,
        None => {
            let id = Uuid::new_v4();
            session.insert(CART_ID_SESSION_KEY, id).await?;
            tracing::debug!(cart_id = %id, "Created cart");
            id
        }
    };
    Ok(state.carts().get_or_create(id).await)
}

/// Total quantity in the visitor's cart; 0 when it can't be read.
pub async fn cart_count(state: &AppState, session: &Session) -> u64 {
    match current_cart(state, session).await {
        Ok(cart) => cart.map_or(0, |c| c.snapshot().total_quantity()),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read cart from session");
            0
        }
    }
}

// =============================================================================
// Forms
// =============================================================================

/// Add to cart form data.
///
/// Posted as `sku`, optional `quantity` and one `option_<group id>` field
/// per option group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddToCartForm {
    pub sku: Sku,
    pub quantity: u32,
    pub selection: Selection,
}

impl AddToCartForm {
    /// Parse the raw form fields.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BadRequest`] if the SKU is missing or invalid, or
    /// the quantity is not a positive integer.
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self> {
        let field = |name: &str| {
            pairs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.trim())
        };

        let sku = Sku::parse(field("sku").unwrap_or_default())
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let quantity = match field("quantity").filter(|q| !q.is_empty()) {
            None => 1,
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|q| *q > 0)
                .ok_or_else(|| AppError::BadRequest("quantity must be at least 1".to_string()))?,
        };

        Ok(Self {
            sku,
            quantity,
            selection: selection_from_params(pairs),
        })
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub layout: Layout,
    pub title: String,
    pub cart: CartView,
}

/// Cart count badge fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u64,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<CartShowTemplate> {
    let snapshot = current_cart(&state, &session)
        .await?
        .map(|cart| cart.snapshot())
        .unwrap_or_default();

    let mut layout = Layout::load(&state, &session, None).await;
    layout.cart_count = snapshot.total_quantity();

    Ok(CartShowTemplate {
        layout,
        title: format!("Cart{TITLE_SUFFIX}"),
        cart: CartView::from(&snapshot),
    })
}

/// Add item to cart.
///
/// The product is fetched again so that price, name and option labels come
/// from the catalog rather than the form. Options left blank fall back to
/// their defaults; a product whose options still can't all be resolved is
/// rejected.
#[instrument(skip(state, session, pairs))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Redirect> {
    let form = AddToCartForm::from_pairs(&pairs)?;

    let product = state
        .catalog()
        .product_by_sku(form.sku.as_str())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {}", form.sku)))?;

    let options = extract_options(Some(&product));
    let resolved = resolve_selection(&options, &form.selection);
    if !all_selected(&options, &resolved) {
        return Err(AppError::BadRequest(
            "Select a value for every option".to_string(),
        ));
    }

    let selected_options =
        (!options.is_empty()).then(|| to_cart_option_labels(&options, &resolved));
    let unit_price = product
        .price
        .display_price()
        .cloned()
        .unwrap_or_else(|| Price::new(Decimal::ZERO, CurrencyCode::USD));
    let name = product
        .name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| "Product".to_string());

    let sku = form.sku.to_string();
    let item = CartLineItem::new(form.sku, name, unit_price, form.quantity, selected_options)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let snapshot = cart_for_update(&state, &session).await?.add_to_cart(item);

    add_breadcrumb("cart", "Added to cart", Some(&[("sku", sku.as_str())]));
    tracing::info!(
        sku = %sku,
        quantity = form.quantity,
        total_quantity = snapshot.total_quantity(),
        "Added to cart"
    );

    Ok(Redirect::to("/cart"))
}

/// Cart count badge fragment.
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> CartCountTemplate {
    CartCountTemplate {
        count: cart_count(&state, &session).await,
    }
}

/// Stream the cart's total quantity.
///
/// Sends the current count immediately, then one event per cart update.
/// Visitors without a cart get a single `0` and an idle stream; nothing is
/// created for them, and the add redirect reopens the stream once a cart
/// exists.
#[instrument(skip(state, session))]
pub async fn events(
    State(state): State<AppState>,
    session: Session,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let receiver = current_cart(&state, &session)
        .await?
        .map(|cart| cart.subscribe());

    let stream = futures::stream::unfold((receiver, true), |(mut receiver, first)| async move {
        let count = match receiver.as_mut() {
            Some(receiver) => {
                if !first && receiver.changed().await.is_err() {
                    return None;
                }
                receiver.borrow_and_update().total_quantity()
            }
            None => {
                if !first {
                    std::future::pending::<()>().await;
                }
                0
            }
        };
        let event = Event::default()
            .event(CART_COUNT_EVENT)
            .data(count.to_string());
        Some((Ok(event), (receiver, false)))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use massdata_core::SelectedOptions;

    use super::*;

    fn pairs(fields: &[(&str, &str)]) -> Vec<(String, String)> {
        fields
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_form_defaults_quantity_to_one() {
        let form = AddToCartForm::from_pairs(&pairs(&[("sku", " SHIRT-1 ")])).unwrap();
        assert_eq!(form.sku.as_str(), "SHIRT-1");
        assert_eq!(form.quantity, 1);
        assert!(form.selection.is_empty());

        let form =
            AddToCartForm::from_pairs(&pairs(&[("sku", "SHIRT-1"), ("quantity", "")])).unwrap();
        assert_eq!(form.quantity, 1);
    }

    #[test]
    fn test_form_collects_options() {
        let form = AddToCartForm::from_pairs(&pairs(&[
            ("sku", "SHIRT-1"),
            ("quantity", "3"),
            ("option_size", "m"),
            ("option_color", "blue"),
        ]))
        .unwrap();
        assert_eq!(form.quantity, 3);
        assert_eq!(form.selection.get("size").map(String::as_str), Some("m"));
        assert_eq!(form.selection.get("color").map(String::as_str), Some("blue"));
    }

    #[test]
    fn test_form_rejects_bad_input() {
        for fields in [
            vec![("quantity", "1")],
            vec![("sku", "   ")],
            vec![("sku", "SHIRT-1"), ("quantity", "0")],
            vec![("sku", "SHIRT-1"), ("quantity", "-2")],
            vec![("sku", "SHIRT-1"), ("quantity", "two")],
        ] {
            let result = AddToCartForm::from_pairs(&pairs(&fields));
            assert!(
                matches!(result, Err(AppError::BadRequest(_))),
                "expected bad request for {fields:?}"
            );
        }
    }

    #[test]
    fn test_cart_view_formats_lines() {
        let store = CartStore::new();
        let options: SelectedOptions = [("Size", "M"), ("Color", "Red")].into_iter().collect();
        let snapshot = store.add_to_cart(
            CartLineItem::new(
                Sku::parse("SHIRT-1").unwrap(),
                "Shirt",
                Price::new(Decimal::new(1999, 2), CurrencyCode::USD),
                2,
                Some(options),
            )
            .unwrap(),
        );

        let view = CartView::from(&snapshot);
        assert_eq!(view.total_quantity, 2);
        assert_eq!(view.subtotal, "$39.98");
        assert_eq!(view.lines[0].href, "/product/SHIRT-1");
        assert_eq!(view.lines[0].options.as_deref(), Some("Size: M, Color: Red"));
        assert_eq!(view.lines[0].unit_price, "$19.99");
        assert_eq!(view.lines[0].line_total, "$39.98");
    }

    #[test]
    fn test_cart_view_survives_overflowing_totals() {
        let store = CartStore::new();
        let snapshot = store.add_to_cart(
            CartLineItem::new(
                Sku::parse("GOLD").unwrap(),
                "Gold Sock",
                Price::new(Decimal::MAX, CurrencyCode::USD),
                u32::MAX,
                None,
            )
            .unwrap(),
        );

        let view = CartView::from(&snapshot);
        assert_eq!(view.lines[0].line_total, "");
        assert_eq!(view.subtotal, "");
        assert_eq!(view.total_quantity, u64::from(u32::MAX));
    }

    #[test]
    fn test_empty_cart_view() {
        let view = CartView::from(&CartSnapshot::default());
        assert!(view.lines.is_empty());
        assert_eq!(view.subtotal, "$0.00");
        assert_eq!(view.total_quantity, 0);
    }
}
