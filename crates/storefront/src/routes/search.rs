//! Search route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::routes::cart::cart_count;
use crate::routes::layout::{Layout, TITLE_SUFFIX, load_categories};
use crate::routes::product::{ProductCardView, product_cards};
use crate::state::AppState;

/// Maximum results shown.
pub const SEARCH_LIMIT: u32 = 24;

/// Search query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Search results page template.
#[derive(Template, WebTemplate)]
#[template(path = "search.html")]
pub struct SearchTemplate {
    pub layout: Layout,
    pub title: String,
    pub query: String,
    pub products: Vec<ProductCardView>,
}

/// Display search results. A blank query shows the empty form without
/// calling the catalog.
#[instrument(skip(state, session))]
pub async fn search(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<SearchQuery>,
) -> Result<SearchTemplate> {
    let query = params.q.trim().to_string();

    let products = if query.is_empty() {
        Vec::new()
    } else {
        product_cards(&state.catalog().search_products(&query, SEARCH_LIMIT).await?)
    };

    let categories = load_categories(&state).await;
    let layout = Layout::new(&categories, None, cart_count(&state, &session).await)
        .with_search_query(&query);

    let title = if query.is_empty() {
        format!("Search{TITLE_SUFFIX}")
    } else {
        format!("Search results for \"{query}\"{TITLE_SUFFIX}")
    };

    Ok(SearchTemplate {
        layout,
        title,
        query,
        products,
    })
}
