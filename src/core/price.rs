//! Price text parsing
//!
//! Storefront pages render prices in several shapes depending on the module
//! that happened to serve the element: `$1.29`, `$5`, a bare `1.29` inside a
//! longer label, or digits spaced around the decimal point. The patterns are
//! tried in that order and the first match inside the sanity bound wins.

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::round_cents;

/// Parsed prices outside `(MIN_PRICE, MAX_PRICE)` are rejected as implausible
/// for a single digital track or album.
pub const MIN_PRICE: f64 = 0.0;
pub const MAX_PRICE: f64 = 50.0;

/// The "no price" sentinel returned when nothing usable was found.
pub const NO_PRICE: f64 = 0.0;

lazy_static! {
    static ref CURRENCY_DECIMAL: Regex = Regex::new(r"[$£€]\s*([0-9]+\.[0-9]{2})").unwrap();
    static ref CURRENCY_INTEGER: Regex = Regex::new(r"[$£€]\s*([0-9]+)").unwrap();
    static ref BARE_DECIMAL: Regex = Regex::new(r"([0-9]+\.[0-9]{2})").unwrap();
    static ref SPACED_DECIMAL: Regex = Regex::new(r"([0-9]+)\s*\.\s*([0-9]{2})").unwrap();
}

/// Extract a plausible price from raw element text.
///
/// Returns the first matched value `v` with `MIN_PRICE < v < MAX_PRICE`,
/// rounded to cents, or `NO_PRICE` when no pattern yields one. Deterministic,
/// no side effects.
pub fn extract_price(text: &str) -> f64 {
    let cleaned: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return NO_PRICE;
    }

    for pattern in [&*CURRENCY_DECIMAL, &*CURRENCY_INTEGER, &*BARE_DECIMAL] {
        for captures in pattern.captures_iter(cleaned) {
            if let Some(value) = captures.get(1).and_then(|m| m.as_str().parse::<f64>().ok()) {
                if value > MIN_PRICE && value < MAX_PRICE {
                    return round_cents(value);
                }
            }
        }
    }

    // Digits split around the decimal point, e.g. "1 . 29"
    for captures in SPACED_DECIMAL.captures_iter(cleaned) {
        let joined = format!("{}.{}", &captures[1], &captures[2]);
        if let Ok(value) = joined.parse::<f64>() {
            if value > MIN_PRICE && value < MAX_PRICE {
                return round_cents(value);
            }
        }
    }

    NO_PRICE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_currency_price() {
        assert_eq!(extract_price("$1.29"), 1.29);
        assert_eq!(extract_price("  $9.49  "), 9.49);
        assert_eq!(extract_price("£3.99"), 3.99);
    }

    #[test]
    fn parses_price_embedded_in_text() {
        assert_eq!(extract_price("Order total: $12.50 due"), 12.5);
        assert_eq!(extract_price("MP3 Song, $0.99"), 0.99);
    }

    #[test]
    fn parses_integer_currency_price() {
        assert_eq!(extract_price("$5"), 5.0);
    }

    #[test]
    fn parses_bare_and_spaced_decimals() {
        assert_eq!(extract_price("1.29"), 1.29);
        assert_eq!(extract_price("9 . 49"), 9.49);
    }

    #[test]
    fn rejects_values_outside_sanity_bound() {
        // A $75 element is a bundle or an unrelated total, not a track
        assert_eq!(extract_price("$75.00"), NO_PRICE);
        assert_eq!(extract_price("$0.00"), NO_PRICE);
        assert_eq!(extract_price("$50.00"), NO_PRICE);
    }

    #[test]
    fn falls_past_out_of_bound_match_to_a_later_one() {
        assert_eq!(extract_price("was $75.00 now $5.99"), 5.99);
    }

    #[test]
    fn returns_sentinel_without_digits() {
        assert_eq!(extract_price("no digits here"), NO_PRICE);
        assert_eq!(extract_price(""), NO_PRICE);
        assert_eq!(extract_price("   \u{200b}  "), NO_PRICE);
    }

    #[test]
    fn strips_control_whitespace() {
        assert_eq!(extract_price("\u{0001}$1.29\n"), 1.29);
    }
}
