//! Category route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use massdata_core::{Category, CategoryContext, find_category_context, strip_html_opt};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::routes::cart::cart_count;
use crate::routes::layout::{Layout, TITLE_SUFFIX, category_href, load_categories};
use crate::routes::product::{ProductCardView, product_cards};
use crate::state::AppState;

/// Products shown on a category page.
pub const CATEGORY_PAGE_SIZE: u32 = 24;

/// A link in the sibling navigation under the category header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiblingLink {
    pub href: String,
    pub name: String,
    pub active: bool,
}

/// Category header display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryView {
    pub name: String,
    pub description: String,
    pub siblings: Vec<SiblingLink>,
    /// `<title>` including the site suffix.
    pub title: String,
    pub meta_description: String,
}

impl CategoryView {
    /// Build the header for `id`. Unknown ids render as `Category <id>`.
    #[must_use]
    pub fn new(context: &CategoryContext<'_>, id: &str) -> Self {
        let current = context.current;
        let name = current
            .map(|c| c.name.clone())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("Category {id}"));
        let description = strip_html_opt(current.and_then(|c| c.description.as_deref()));

        let meta_title = current
            .and_then(|c| c.meta_title.as_deref())
            .map(str::trim)
            .unwrap_or_default();
        let title = if meta_title.is_empty() {
            let audience = context.parent_name.unwrap_or(name.as_str()).to_lowercase();
            format!("Shop cool {name} Socks for {audience}{TITLE_SUFFIX}")
        } else {
            format!("{meta_title}{TITLE_SUFFIX}")
        };

        let meta_description = [
            strip_html_opt(current.and_then(|c| c.meta_description.as_deref())),
            description.clone(),
        ]
        .into_iter()
        .find(|d| !d.is_empty())
        .unwrap_or_else(|| format!("Browse products in {name}."));

        Self {
            siblings: context
                .siblings
                .iter()
                .filter(|c| !c.id.is_empty())
                .map(|c| sibling_link(c, id))
                .collect(),
            name,
            description,
            title,
            meta_description,
        }
    }
}

fn sibling_link(category: &Category, active_id: &str) -> SiblingLink {
    SiblingLink {
        href: category_href(&category.id),
        name: category.name.clone(),
        active: category.id == active_id,
    }
}

/// Category page template.
#[derive(Template, WebTemplate)]
#[template(path = "category.html")]
pub struct CategoryShowTemplate {
    pub layout: Layout,
    pub category: CategoryView,
    pub products: Vec<ProductCardView>,
}

/// Display a category with its products.
///
/// A failed product fetch renders an empty grid.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<CategoryShowTemplate> {
    let categories = load_categories(&state).await;
    let context = find_category_context(&categories, &id);
    let category = CategoryView::new(&context, &id);

    let products = match state
        .catalog()
        .products_by_category(&id, CATEGORY_PAGE_SIZE)
        .await
    {
        Ok(products) => product_cards(&products),
        Err(e) => {
            tracing::warn!(category_id = %id, error = %e, "Failed to load category products");
            Vec::new()
        }
    };

    let layout = Layout::new(&categories, Some(&id), cart_count(&state, &session).await);

    Ok(CategoryShowTemplate {
        layout,
        category,
        products,
    })
}
