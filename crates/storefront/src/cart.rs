//! Reactive per-visitor cart store.
//!
//! Each visitor's cart lives in a [`CartStore`]: a `tokio::sync::watch`
//! channel holding the current [`CartSnapshot`]. Writers replace the whole
//! snapshot in one step, so subscribers never see a half-applied update.
//!
//! [`CartRegistry`] owns every store and hands them out by cart id. Cart ids
//! are kept in the visitor's session; see [`crate::routes::cart`].

use std::sync::Arc;
use std::time::Duration;

use massdata_core::{Cart, CartError, CartLineItem, Price};
use moka::future::Cache;
use tokio::sync::watch;
use uuid::Uuid;

/// Session key under which the visitor's cart id is stored.
pub const CART_ID_SESSION_KEY: &str = "cart_id";

// =============================================================================
// CartSnapshot
// =============================================================================

/// An immutable view of a cart at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartSnapshot {
    cart: Arc<Cart>,
    total_quantity: u64,
}

impl CartSnapshot {
    fn new(cart: Cart) -> Self {
        let total_quantity = cart.total_quantity();
        Self {
            cart: Arc::new(cart),
            total_quantity,
        }
    }

    /// Lines in the order they were first added.
    #[must_use]
    pub fn lines(&self) -> &[CartLineItem] {
        self.cart.lines()
    }

    /// Sum of all line quantities.
    #[must_use]
    pub const fn total_quantity(&self) -> u64 {
        self.total_quantity
    }

    /// Sum of line totals. `Ok(None)` for an empty cart.
    ///
    /// # Errors
    ///
    /// See [`Cart::subtotal`].
    pub fn subtotal(&self) -> Result<Option<Price>, CartError> {
        self.cart.subtotal()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }
}

// =============================================================================
// CartStore
// =============================================================================

/// A single visitor's cart.
///
/// Cheap to clone; clones share the same cart.
#[derive(Debug, Clone)]
pub struct CartStore {
    sender: Arc<watch::Sender<CartSnapshot>>,
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CartStore {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(CartSnapshot::default());
        Self {
            sender: Arc::new(sender),
        }
    }

    /// The current cart contents.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        self.sender.borrow().clone()
    }

    /// Receive every future snapshot.
    ///
    /// The receiver starts out holding the current snapshot, marked as seen.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.sender.subscribe()
    }

    /// Merge `item` into the cart and notify subscribers.
    ///
    /// Returns the snapshot produced by this write.
    pub fn add_to_cart(&self, item: CartLineItem) -> CartSnapshot {
        let mut updated = CartSnapshot::default();
        self.sender.send_modify(|current| {
            *current = CartSnapshot::new(current.cart.with_item(item));
            updated = current.clone();
        });

        tracing::debug!(
            lines = updated.lines().len(),
            total_quantity = updated.total_quantity(),
            "Cart updated"
        );

        updated
    }
}

// =============================================================================
// CartRegistry
// =============================================================================

/// All live carts, keyed by cart id.
///
/// Carts left untouched for longer than the idle timeout are dropped. There is
/// no count limit: a cart is only created by an add, and the session store
/// holding its id is bounded instead, so a cart never disappears while its
/// session is still in use.
#[derive(Clone)]
pub struct CartRegistry {
    carts: Cache<Uuid, CartStore>,
}

impl CartRegistry {
    #[must_use]
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            carts: Cache::builder().time_to_idle(idle_timeout).build(),
        }
    }

    /// The cart for `id`, created empty if it doesn't exist yet.
    pub async fn get_or_create(&self, id: Uuid) -> CartStore {
        self.carts.get_with(id, async { CartStore::new() }).await
    }

    /// The cart for `id`, if one exists.
    pub async fn get(&self, id: &Uuid) -> Option<CartStore> {
        self.carts.get(id).await
    }
}
