//! Data shared by every full page: header navigation and the cart badge.

use std::sync::Arc;

use massdata_core::categories::visible;
use massdata_core::{Category, find_category_context, is_sale_category, is_visible_category};
use tower_sessions::Session;

use crate::routes::cart::cart_count;
use crate::state::AppState;

/// Suffix appended to every page title.
pub const TITLE_SUFFIX: &str = " - Massdata Commerce®";

/// A link in the category navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub href: String,
    pub name: String,
    pub is_sale: bool,
    pub active: bool,
}

impl NavLink {
    fn new(category: &Category, active_id: Option<&str>) -> Self {
        Self {
            href: category_href(&category.id),
            name: category.name.clone(),
            is_sale: is_sale_category(category),
            active: active_id == Some(category.id.as_str()),
        }
    }
}

/// Header and footer data.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    /// Visible top-level categories.
    pub nav: Vec<NavLink>,
    /// Visible children of the active top-level category.
    pub sub_nav: Vec<NavLink>,
    pub cart_count: u64,
    /// Prefills the header search box.
    pub search_query: String,
}

impl Layout {
    /// Build the navigation, highlighting the top-level category that is
    /// `active_id` or contains it.
    #[must_use]
    pub fn new(categories: &[Category], active_id: Option<&str>, cart_count: u64) -> Self {
        let nav = visible(categories)
            .map(|top| {
                let mut link = NavLink::new(top, active_id);
                link.active = link.active
                    || active_id.is_some_and(|id| top.children.iter().any(|c| c.id == id));
                link
            })
            .collect();

        let sub_nav = active_id
            .map(|id| find_category_context(categories, id))
            .map(|context| {
                context
                    .siblings
                    .into_iter()
                    .filter(|c| is_visible_category(c))
                    .map(|c| NavLink::new(c, active_id))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            nav,
            sub_nav,
            cart_count,
            search_query: String::new(),
        }
    }

    /// Load categories and the visitor's cart count, then build the layout.
    pub async fn load(state: &AppState, session: &Session, active_id: Option<&str>) -> Self {
        let categories = load_categories(state).await;
        Self::new(&categories, active_id, cart_count(state, session).await)
    }

    #[must_use]
    pub fn with_search_query(mut self, query: &str) -> Self {
        self.search_query = query.to_string();
        self
    }
}

/// Category tree, or an empty one if the catalog is unreachable.
pub async fn load_categories(state: &AppState) -> Arc<[Category]> {
    match state.catalog().categories().await {
        Ok(categories) => categories,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load categories, rendering empty navigation");
            Arc::from(Vec::new())
        }
    }
}

#[must_use]
pub fn category_href(id: &str) -> String {
    format!("/category/{}", urlencoding::encode(id))
}

#[must_use]
pub fn product_href(sku: &str) -> String {
    format!("/product/{}", urlencoding::encode(sku))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: &str, name: &str, url_key: &str, children: Vec<Category>) -> Category {
        Category {
            id: id.to_string(),
            name: name.to_string(),
            url_key: Some(url_key.to_string()),
            children,
            ..Category::default()
        }
    }

    fn tree() -> Vec<Category> {
        vec![
            category(
                "3",
                "Men",
                "men",
                vec![
                    category("31", "Crew", "crew", vec![]),
                    category("32", "Test Category", "test-category", vec![]),
                ],
            ),
            category("4", "Women", "women", vec![]),
            category("5", "Sale", "sale", vec![]),
            category("6", "Homepage Banner", "home-banner", vec![]),
        ]
    }

    #[test]
    fn test_nav_hides_invisible_categories() {
        let layout = Layout::new(&tree(), None, 0);
        let names: Vec<_> = layout.nav.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Men", "Women", "Sale"]);
        assert!(layout.nav[2].is_sale);
        assert!(layout.sub_nav.is_empty());
    }

    #[test]
    fn test_child_category_activates_parent() {
        let layout = Layout::new(&tree(), Some("31"), 2);
        assert!(layout.nav[0].active);
        assert!(!layout.nav[1].active);
        assert_eq!(layout.cart_count, 2);

        let sub: Vec<_> = layout.sub_nav.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(sub, vec!["Crew"]);
        assert!(layout.sub_nav[0].active);
    }

    #[test]
    fn test_hrefs_are_encoded() {
        assert_eq!(category_href("12"), "/category/12");
        assert_eq!(product_href("MS 01/blue"), "/product/MS%2001%2Fblue");
    }
}
