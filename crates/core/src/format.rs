//! Text and money formatting for display.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::types::Price;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("Invalid regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex"));

/// Reduce an HTML fragment to plain text.
///
/// Tags are removed, `&nbsp;` becomes a space, runs of whitespace collapse to
/// one space, and the result is trimmed.
#[must_use]
pub fn strip_html(html: &str) -> String {
    let without_tags = TAG_RE.replace_all(html, "");
    let without_nbsp = without_tags.replace("&nbsp;", " ");
    WHITESPACE_RE
        .replace_all(&without_nbsp, " ")
        .trim()
        .to_owned()
}

/// Same as [`strip_html`], treating `None` as empty.
#[must_use]
pub fn strip_html_opt(html: Option<&str>) -> String {
    html.map(strip_html).unwrap_or_default()
}

/// Format a price for display, e.g. `$1,234.50`.
///
/// Returns an empty string for `None`. Currencies without a known symbol are
/// rendered as `"<amount> <CODE>"`.
#[must_use]
pub fn format_money(price: Option<&Price>) -> String {
    let Some(price) = price else {
        return String::new();
    };

    match price.currency_code.symbol() {
        Some(symbol) => {
            let sign = if price.amount.is_sign_negative() && !price.amount.is_zero() {
                "-"
            } else {
                ""
            };
            format!("{sign}{symbol}{}", group_thousands(price.amount.abs()))
        }
        None => format!("{} {}", price.amount, price.currency_code),
    }
}

/// `1234.5` -> `1,234.50`
fn group_thousands(amount: Decimal) -> String {
    let fixed = format!("{:.2}", amount.round_dp(2));
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let digits: Vec<char> = integer.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*digit);
    }

    format!("{grouped}.{fraction}")
}

/// Convert a 0..100 rating summary to a score out of five, e.g. `"4.5"`.
#[must_use]
pub fn rating_out_of_five(rating_summary: f64) -> String {
    format!("{:.1}", rating_summary / 20.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CurrencyCode;

    fn price(amount: &str, code: CurrencyCode) -> Price {
        Price::new(amount.parse().expect("valid decimal"), code)
    }

    #[test]
    fn test_strip_html_removes_tags() {
        assert_eq!(strip_html("<p>Warm <b>wool</b> socks.</p>"), "Warm wool socks.");
    }

    #[test]
    fn test_strip_html_inline_tag_before_punctuation() {
        assert_eq!(strip_html("<p>Socks for <b>men</b>.</p>"), "Socks for men.");
        assert_eq!(strip_html("<em>Soft</em>, <i>warm</i>!"), "Soft, warm!");
    }

    #[test]
    fn test_strip_html_collapses_whitespace() {
        assert_eq!(
            strip_html("<p>Line one</p>\n\n<p>Line&nbsp;two</p>  "),
            "Line one Line two"
        );
    }

    #[test]
    fn test_strip_html_empty() {
        assert_eq!(strip_html(""), "");
        assert_eq!(strip_html_opt(None), "");
    }

    #[test]
    fn test_format_money_none() {
        assert_eq!(format_money(None), "");
    }

    #[test]
    fn test_format_money_usd() {
        assert_eq!(format_money(Some(&price("9.99", CurrencyCode::USD))), "$9.99");
        assert_eq!(format_money(Some(&price("42", CurrencyCode::USD))), "$42.00");
        assert_eq!(
            format_money(Some(&price("1234.5", CurrencyCode::USD))),
            "$1,234.50"
        );
        assert_eq!(
            format_money(Some(&price("1234567.891", CurrencyCode::USD))),
            "$1,234,567.89"
        );
    }

    #[test]
    fn test_format_money_other_symbols() {
        assert_eq!(format_money(Some(&price("9.99", CurrencyCode::EUR))), "€9.99");
        assert_eq!(format_money(Some(&price("100", CurrencyCode::GBP))), "£100.00");
    }

    #[test]
    fn test_format_money_negative() {
        assert_eq!(format_money(Some(&price("-5", CurrencyCode::USD))), "-$5.00");
    }

    #[test]
    fn test_format_money_unknown_currency() {
        let jpy = price("1500", CurrencyCode::Other("JPY".to_string()));
        assert_eq!(format_money(Some(&jpy)), "1500 JPY");
    }

    #[test]
    fn test_rating_out_of_five() {
        assert_eq!(rating_out_of_five(90.0), "4.5");
        assert_eq!(rating_out_of_five(0.0), "0.0");
        assert_eq!(rating_out_of_five(100.0), "5.0");
    }
}
