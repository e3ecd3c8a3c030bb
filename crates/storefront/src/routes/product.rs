//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use massdata_core::{
    OptionGroup, ProductDetail, ProductSummary, Selection, all_selected, extract_options,
    format_money, rating_out_of_five, resolve_selection, strip_html_opt,
};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::magento::CatalogClient;
use crate::routes::layout::{Layout, TITLE_SUFFIX, category_href, product_href};
use crate::state::AppState;

/// Query and form parameters carrying option choices are named
/// `option_<group id>`.
pub const OPTION_PARAM_PREFIX: &str = "option_";

/// Gallery images shown on the product page.
const GALLERY_SIZE: usize = 3;

// =============================================================================
// Views
// =============================================================================

/// Product tile used on listing pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCardView {
    pub href: Option<String>,
    pub name: String,
    pub image_url: Option<String>,
    pub image_alt: String,
    pub price: String,
    pub regular_price: Option<String>,
}

impl From<&ProductSummary> for ProductCardView {
    fn from(product: &ProductSummary) -> Self {
        let name = product.name.clone().unwrap_or_else(|| "Product".to_string());
        Self {
            href: product
                .sku
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(product_href),
            image_url: product.small_image.as_ref().map(|i| i.url.clone()),
            image_alt: product
                .small_image
                .as_ref()
                .and_then(|i| i.label.clone())
                .unwrap_or_else(|| name.clone()),
            price: format_money(product.price.display_price()),
            regular_price: product
                .price
                .is_discounted()
                .then(|| format_money(product.price.regular.as_ref())),
            name,
        }
    }
}

/// Convert a listing to cards.
pub fn product_cards(products: &[ProductSummary]) -> Vec<ProductCardView> {
    products.iter().map(ProductCardView::from).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryImageView {
    pub url: String,
    pub alt: String,
}

/// One choice in the option picker. Choosing it links to the page with
/// this value selected and every other group unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionValueView {
    pub label: String,
    pub href: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionGroupView {
    pub id: String,
    pub label: String,
    /// Value id currently selected, posted with the add-to-cart form.
    pub selected_id: String,
    pub selected_label: String,
    pub values: Vec<OptionValueView>,
}

/// Breadcrumb link to the product's main category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryLink {
    pub href: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecRow {
    pub label: &'static str,
    pub values: Vec<String>,
}

/// Product detail display data.
#[derive(Debug, Clone)]
pub struct ProductView {
    pub sku: String,
    pub name: String,
    pub short_description: String,
    pub description_html: Option<String>,
    pub price: String,
    pub regular_price: Option<String>,
    pub as_low_as: Option<String>,
    pub rating: Option<String>,
    pub review_count: Option<u32>,
    pub main_category: Option<CategoryLink>,
    pub gallery: Vec<GalleryImageView>,
    pub options: Vec<OptionGroupView>,
    pub specs: Vec<SpecRow>,
    pub can_add_to_cart: bool,
}

impl ProductView {
    /// Build the view for `product` with `user_selection` resolved against
    /// its option groups.
    #[must_use]
    pub fn new(product: &ProductDetail, user_selection: &Selection, catalog: &CatalogClient) -> Self {
        let sku = product.sku.clone().unwrap_or_default();
        let name = product.name.clone().unwrap_or_else(|| "Product".to_string());
        let options = extract_options(Some(product));
        let resolved = resolve_selection(&options, user_selection);

        let price = format_money(product.price.display_price());
        let gallery = product
            .gallery(GALLERY_SIZE)
            .filter_map(|entry| {
                let file = entry.file.as_deref()?;
                Some(GalleryImageView {
                    url: catalog.media_url(file),
                    alt: entry.label.clone().unwrap_or_else(|| name.clone()),
                })
            })
            .collect();

        let specs = vec![
            SpecRow {
                label: "SKU",
                values: vec![sku.clone()],
            },
            SpecRow {
                label: "Name",
                values: vec![name.clone()],
            },
            SpecRow {
                label: "Type",
                values: vec![product.kind.type_name().to_string()],
            },
            SpecRow {
                label: "Category",
                values: product.category_names().map(String::from).collect(),
            },
        ];

        Self {
            can_add_to_cart: !sku.is_empty() && all_selected(&options, &resolved),
            options: option_views(&sku, &options, &resolved),
            short_description: strip_html_opt(product.short_description_html.as_deref()),
            description_html: product
                .description_html
                .clone()
                .filter(|html| !html.trim().is_empty()),
            as_low_as: Some(price.clone()).filter(|p| !p.is_empty()),
            regular_price: product
                .price
                .is_discounted()
                .then(|| format_money(product.price.regular.as_ref())),
            price,
            rating: product.rating_summary.map(rating_out_of_five),
            review_count: product.review_count,
            main_category: product.main_category().and_then(|c| {
                Some(CategoryLink {
                    href: category_href(c.id.as_deref()?),
                    name: c.name.clone()?,
                })
            }),
            gallery,
            specs,
            sku,
            name,
        }
    }
}

fn option_views(sku: &str, options: &[OptionGroup], resolved: &Selection) -> Vec<OptionGroupView> {
    options
        .iter()
        .map(|group| {
            let selected_id = resolved.get(&group.id).cloned().unwrap_or_default();
            let values = group
                .values
                .iter()
                .map(|value| {
                    let mut choice = resolved.clone();
                    choice.insert(group.id.clone(), value.id.clone());
                    OptionValueView {
                        label: value.label.clone(),
                        href: selection_href(sku, options, &choice),
                        selected: value.id == selected_id,
                    }
                })
                .collect();

            OptionGroupView {
                id: group.id.clone(),
                label: group.label.clone(),
                selected_label: group
                    .value(&selected_id)
                    .map(|v| v.label.clone())
                    .unwrap_or_default(),
                selected_id,
                values,
            }
        })
        .collect()
}

/// Product page URL with `selection` encoded as query parameters, in option
/// group order.
fn selection_href(sku: &str, options: &[OptionGroup], selection: &Selection) -> String {
    let query: Vec<String> = options
        .iter()
        .filter_map(|group| {
            let value = selection.get(&group.id)?;
            Some(format!(
                "{OPTION_PARAM_PREFIX}{}={}",
                urlencoding::encode(&group.id),
                urlencoding::encode(value)
            ))
        })
        .collect();

    if query.is_empty() {
        product_href(sku)
    } else {
        format!("{}?{}", product_href(sku), query.join("&"))
    }
}

/// Collect `option_<group id>=<value id>` pairs into a selection.
///
/// Other parameters and blank values are ignored.
pub fn selection_from_params<'a>(params: impl IntoIterator<Item = &'a (String, String)>) -> Selection {
    params
        .into_iter()
        .filter_map(|(key, value)| {
            let group = key.strip_prefix(OPTION_PARAM_PREFIX)?;
            (!group.is_empty() && !value.is_empty()).then(|| (group.to_string(), value.clone()))
        })
        .collect()
}

// =============================================================================
// Templates
// =============================================================================

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "product.html")]
pub struct ProductShowTemplate {
    pub layout: Layout,
    pub title: String,
    pub meta_description: String,
    pub product: ProductView,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display product detail page.
#[instrument(skip(state, session, params))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(sku): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<ProductShowTemplate> {
    let product = state
        .catalog()
        .product_by_sku(&sku)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {sku}")))?;

    let selection = selection_from_params(&params);
    let view = ProductView::new(&product, &selection, state.catalog());

    let active_category = product.main_category().and_then(|c| c.id.clone());
    let layout = Layout::load(&state, &session, active_category.as_deref()).await;

    Ok(ProductShowTemplate {
        title: format!("{}{TITLE_SUFFIX}", view.name),
        meta_description: format!("Buy {}. {}", view.name, view.price).trim().to_string(),
        layout,
        product: view,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use massdata_core::{
        ConfigurableOptionRecord, ConfigurableValueRecord, CurrencyCode, MediaEntry, Price,
        PriceRange, ProductCategory, ProductKind,
    };
    use rust_decimal::Decimal;

    use super::*;
    use crate::test_support::magento_config;

    fn record(uid: &str, label: &str, values: &[(&str, &str)]) -> Option<ConfigurableOptionRecord> {
        Some(ConfigurableOptionRecord {
            uid: Some(uid.to_string()),
            label: Some(label.to_string()),
            values: values
                .iter()
                .map(|(id, label)| {
                    Some(ConfigurableValueRecord {
                        uid: Some((*id).to_string()),
                        label: Some((*label).to_string()),
                    })
                })
                .collect(),
        })
    }

    fn shirt() -> ProductDetail {
        ProductDetail {
            kind: ProductKind::Configurable,
            sku: Some("SHIRT-1".to_string()),
            name: Some("Shirt".to_string()),
            rating_summary: Some(90.0),
            categories: vec![ProductCategory {
                id: Some("3".to_string()),
                name: Some("Men".to_string()),
            }],
            media_gallery: (1..=5)
                .map(|i| MediaEntry {
                    id: Some(i.to_string()),
                    file: Some(format!("/s/h/shirt-{i}.jpg")),
                    label: None,
                })
                .collect(),
            price: PriceRange {
                regular: Some(Price::new(Decimal::new(2999, 2), CurrencyCode::USD)),
                final_price: Some(Price::new(Decimal::new(1999, 2), CurrencyCode::USD)),
            },
            configurable_options: vec![
                record("size", "Size", &[("s", "S"), ("m", "M"), ("l", "L")]),
                record("color", "Color", &[("red", "Red"), ("blue", "Blue")]),
            ],
            ..ProductDetail::default()
        }
    }

    fn catalog() -> CatalogClient {
        CatalogClient::new(&magento_config("http://127.0.0.1:9/graphql")).unwrap()
    }

    #[test]
    fn test_selection_from_params() {
        let params = vec![
            ("option_size".to_string(), "m".to_string()),
            ("option_color".to_string(), String::new()),
            ("option_".to_string(), "x".to_string()),
            ("quantity".to_string(), "2".to_string()),
        ];
        let selection = selection_from_params(&params);
        assert_eq!(selection.len(), 1);
        assert_eq!(selection.get("size").map(String::as_str), Some("m"));
    }

    #[test]
    fn test_view_resolves_defaults() {
        let view = ProductView::new(&shirt(), &Selection::new(), &catalog());

        assert!(view.can_add_to_cart);
        assert_eq!(view.options.len(), 2);
        assert_eq!(view.options[0].selected_label, "S");
        assert_eq!(view.options[1].selected_label, "Red");
        assert!(view.options[0].values[0].selected);
    }

    #[test]
    fn test_option_links_keep_other_groups() {
        let selection: Selection = [("color".to_string(), "blue".to_string())].into();
        let view = ProductView::new(&shirt(), &selection, &catalog());

        let large = &view.options[0].values[2];
        assert_eq!(large.label, "L");
        assert_eq!(large.href, "/product/SHIRT-1?option_size=l&option_color=blue");
    }

    #[test]
    fn test_view_prices_rating_and_gallery() {
        let view = ProductView::new(&shirt(), &Selection::new(), &catalog());

        assert_eq!(view.price, "$19.99");
        assert_eq!(view.as_low_as.as_deref(), Some("$19.99"));
        assert_eq!(view.regular_price.as_deref(), Some("$29.99"));
        assert_eq!(view.rating.as_deref(), Some("4.5"));
        assert_eq!(view.gallery.len(), 3);
        assert_eq!(
            view.gallery[0].url,
            "https://backend.reachdigital.dev/media/catalog/product/s/h/shirt-1.jpg"
        );
        let crumb = view.main_category.unwrap();
        assert_eq!(crumb.href, "/category/3");
        assert_eq!(crumb.name, "Men");
    }

    #[test]
    fn test_specs_table() {
        let view = ProductView::new(&shirt(), &Selection::new(), &catalog());
        let labels: Vec<_> = view.specs.iter().map(|r| r.label).collect();
        assert_eq!(labels, vec!["SKU", "Name", "Type", "Category"]);
        assert_eq!(view.specs[2].values, vec!["ConfigurableProduct"]);
        assert_eq!(view.specs[3].values, vec!["Men"]);
    }

    #[test]
    fn test_cannot_add_without_sku() {
        let product = ProductDetail {
            sku: None,
            ..shirt()
        };
        let view = ProductView::new(&product, &Selection::new(), &catalog());
        assert!(!view.can_add_to_cart);
    }

    #[test]
    fn test_card_from_summary() {
        let summary = ProductSummary {
            sku: Some("SOCK-RED".to_string()),
            name: Some("Red Sock".to_string()),
            price: PriceRange {
                regular: Some(Price::new(Decimal::new(999, 2), CurrencyCode::USD)),
                final_price: None,
            },
            ..ProductSummary::default()
        };
        let card = ProductCardView::from(&summary);

        assert_eq!(card.href.as_deref(), Some("/product/SOCK-RED"));
        assert_eq!(card.price, "$9.99");
        assert!(card.regular_price.is_none());
        assert_eq!(card.image_alt, "Red Sock");
    }
}
