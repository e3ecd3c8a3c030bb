//! Configurable product options.
//!
//! A configurable product declares option groups (size, color, ...) with
//! ordered values. The product page keeps a partial [`Selection`] of group id
//! to value id; these functions fill in defaults, check completeness and
//! project the selection onto the label map stored on a cart line.
//!
//! All functions are total. Incomplete API records are dropped rather than
//! reported.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cart::SelectedOptions;
use crate::catalog::{ConfigurableOptionRecord, ProductDetail, ProductKind};

/// Selection of option values: group id to value id.
pub type Selection = BTreeMap<String, String>;

/// A selectable value within an option group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionValue {
    pub id: String,
    pub label: String,
}

/// An option group with at least one value. The first value is the default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionGroup {
    pub id: String,
    pub label: String,
    pub values: Vec<OptionValue>,
}

impl OptionGroup {
    /// The default value (first declared).
    #[must_use]
    pub fn default_value(&self) -> Option<&OptionValue> {
        self.values.first()
    }

    /// Look up a value of this group by id.
    #[must_use]
    pub fn value(&self, id: &str) -> Option<&OptionValue> {
        self.values.iter().find(|v| v.id == id)
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

fn convert_group(record: &ConfigurableOptionRecord) -> Option<OptionGroup> {
    let id = non_empty(record.uid.as_ref())?;
    let label = non_empty(record.label.as_ref())?;

    let values: Vec<OptionValue> = record
        .values
        .iter()
        .flatten()
        .filter_map(|value| {
            Some(OptionValue {
                id: non_empty(value.uid.as_ref())?.to_owned(),
                label: non_empty(value.label.as_ref())?.to_owned(),
            })
        })
        .collect();

    if values.is_empty() {
        return None;
    }

    Some(OptionGroup {
        id: id.to_owned(),
        label: label.to_owned(),
        values,
    })
}

/// Extract the selectable option groups of a product.
///
/// Returns an empty list for `None` and for products that are not
/// configurable. Groups or values missing an id or label are skipped, and
/// groups left without values are dropped.
#[must_use]
pub fn extract_options(product: Option<&ProductDetail>) -> Vec<OptionGroup> {
    let Some(product) = product else {
        return Vec::new();
    };

    if product.kind != ProductKind::Configurable {
        return Vec::new();
    }

    product
        .configurable_options
        .iter()
        .flatten()
        .filter_map(convert_group)
        .collect()
}

/// Complete a partial selection.
///
/// Every group in `options` ends up with a value: the user's choice when it
/// names a value of that group, otherwise the group's first value. Entries
/// for unknown groups are carried over untouched. The input is not
/// modified.
#[must_use]
pub fn resolve_selection(options: &[OptionGroup], user_selection: &Selection) -> Selection {
    let mut resolved = user_selection.clone();

    for group in options {
        let chosen = resolved
            .get(&group.id)
            .and_then(|value_id| group.value(value_id));

        if chosen.is_none()
            && let Some(default) = group.default_value()
        {
            resolved.insert(group.id.clone(), default.id.clone());
        }
    }

    resolved
}

/// True when every group has a non-empty entry. Vacuously true with no groups.
#[must_use]
pub fn all_selected(options: &[OptionGroup], resolved: &Selection) -> bool {
    options.iter().all(|group| {
        resolved
            .get(&group.id)
            .is_some_and(|value_id| !value_id.is_empty())
    })
}

/// Project an id-based selection onto group label to value label.
///
/// Groups whose selected id is missing or unknown are left out.
#[must_use]
pub fn to_cart_option_labels(options: &[OptionGroup], resolved: &Selection) -> SelectedOptions {
    options
        .iter()
        .filter_map(|group| {
            let value = group.value(resolved.get(&group.id)?)?;
            Some((group.label.clone(), value.label.clone()))
        })
        .collect()
}
