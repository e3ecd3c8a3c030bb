//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use massdata_core::categories::visible;
use massdata_core::{Category, primary_category};
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::routes::cart::cart_count;
use crate::routes::layout::{Layout, category_href, load_categories};
use crate::routes::product::{ProductCardView, product_cards};
use crate::state::AppState;

/// Products in the featured strip.
pub const FEATURED_LIMIT: u32 = 12;

pub const HOME_TITLE: &str = "Homepage - Massdata Commerce®";
pub const HOME_DESCRIPTION: &str = "Demo commerce frontend built with Next.js, GraphQL and MUI";

/// Hero call-to-action targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeroView {
    pub shop_href: String,
    pub browse_href: String,
}

impl HeroView {
    /// "Shop now" goes to the primary category, "Browse categories" to the
    /// second visible top-level one. Either falls back to `/`.
    #[must_use]
    pub fn new(categories: &[Category]) -> Self {
        Self {
            shop_href: primary_category(categories)
                .map_or_else(|| "/".to_string(), |c| category_href(&c.id)),
            browse_href: visible(categories)
                .nth(1)
                .map_or_else(|| "/".to_string(), |c| category_href(&c.id)),
        }
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub title: &'static str,
    pub meta_description: &'static str,
    pub hero: HeroView,
    pub featured: Vec<ProductCardView>,
}

/// Display the home page.
#[instrument(skip(state, session))]
pub async fn home(State(state): State<AppState>, session: Session) -> HomeTemplate {
    let categories = load_categories(&state).await;

    let featured = match visible(&categories).next() {
        Some(first) => match state
            .catalog()
            .products_by_category(&first.id, FEATURED_LIMIT)
            .await
        {
            Ok(products) => product_cards(&products),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load featured products");
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    HomeTemplate {
        layout: Layout::new(&categories, None, cart_count(&state, &session).await),
        title: HOME_TITLE,
        meta_description: HOME_DESCRIPTION,
        hero: HeroView::new(&categories),
        featured,
    }
}
