//! Category visibility and navigation helpers.

use crate::catalog::Category;

/// URL keys of categories that exist in the backend for testing only.
const HIDDEN_URL_KEYS: &[&str] = &["test-category", "example"];
/// Names of categories that exist in the backend for testing only.
const HIDDEN_NAMES: &[&str] = &["Test Category", "Examples"];
/// URL key prefixes of CMS landing categories.
const HIDDEN_URL_KEY_PREFIXES: &[&str] = &["home-"];
/// Lowercased name prefixes of CMS landing categories.
const HIDDEN_NAME_PREFIXES: &[&str] = &["homepage "];

/// Whether a category should appear in navigation.
#[must_use]
pub fn is_visible_category(category: &Category) -> bool {
    if category.id.is_empty() || category.name.is_empty() {
        return false;
    }

    let url_key = category
        .url_key
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();
    let name_lower = category.name.to_lowercase();

    if HIDDEN_URL_KEYS.contains(&url_key.as_str()) || HIDDEN_NAMES.contains(&category.name.as_str())
    {
        return false;
    }

    if HIDDEN_URL_KEY_PREFIXES
        .iter()
        .any(|prefix| url_key.starts_with(prefix))
    {
        return false;
    }

    !HIDDEN_NAME_PREFIXES
        .iter()
        .any(|prefix| name_lower.starts_with(prefix))
}

/// Whether a category is the sale category (highlighted in navigation).
#[must_use]
pub fn is_sale_category(category: &Category) -> bool {
    category.name.eq_ignore_ascii_case("sale")
        || category
            .url_key
            .as_deref()
            .is_some_and(|key| key.eq_ignore_ascii_case("sale"))
}

/// Visible categories, in order.
pub fn visible(categories: &[Category]) -> impl Iterator<Item = &Category> {
    categories.iter().filter(|c| is_visible_category(c))
}

/// The category landing the "shop now" call to action.
///
/// Prefers the `men` category, then `women`, then the first visible one.
#[must_use]
pub fn primary_category(top_level: &[Category]) -> Option<&Category> {
    visible_by_url_key(top_level, "men")
        .or_else(|| visible_by_url_key(top_level, "women"))
        .or_else(|| visible(top_level).next())
}

fn visible_by_url_key<'a>(categories: &'a [Category], key: &str) -> Option<&'a Category> {
    visible(categories).find(|c| c.url_key.as_deref() == Some(key))
}

/// Where a category sits in the two-level navigation tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryContext<'a> {
    /// The category itself, if found.
    pub current: Option<&'a Category>,
    /// Categories shown next to it: its children for a top-level match,
    /// otherwise the children of its parent.
    pub siblings: Vec<&'a Category>,
    /// Name of the top-level category the match was found under.
    pub parent_name: Option<&'a str>,
}

/// Locate `id` among the top-level categories and their direct children.
#[must_use]
pub fn find_category_context<'a>(top_level: &'a [Category], id: &str) -> CategoryContext<'a> {
    for top in top_level {
        if top.id.is_empty() {
            continue;
        }

        let siblings: Vec<&Category> = top.children.iter().collect();
        let parent_name = Some(top.name.as_str()).filter(|n| !n.is_empty());

        if top.id == id {
            return CategoryContext {
                current: Some(top),
                siblings,
                parent_name,
            };
        }

        if let Some(hit) = top.children.iter().find(|c| c.id == id) {
            return CategoryContext {
                current: Some(hit),
                siblings,
                parent_name,
            };
        }
    }

    CategoryContext::default()
}
