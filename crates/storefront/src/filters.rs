//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Returns the stylesheet path, hashed at build time when available.
///
/// Usage in templates: `{{ "main"|css_path }}`
#[askama::filter_fn]
pub fn css_path(stem: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(asset_path("css", &stem.to_string(), env!("CSS_HASH")))
}

/// Returns the script path, hashed at build time when available.
///
/// Usage in templates: `{{ "cart"|js_path }}`
#[askama::filter_fn]
pub fn js_path(stem: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(asset_path("js", &stem.to_string(), env!("JS_HASH")))
}

fn asset_path(kind: &str, stem: &str, hash: &str) -> String {
    if hash.is_empty() {
        format!("/static/{kind}/{stem}.{kind}")
    } else {
        format!("/static/{kind}/derived/{stem}.{hash}.{kind}")
    }
}
