use once_cell::sync::Lazy;
use regex::Regex;

use super::registry::{Category, Unit};

static QUANTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([-+]?(?:[\d,]+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)\s*(.*?)\s*$")
        .expect("quantity regex is valid")
});

/// Parse the text of an input box into a number.
///
/// Grouping commas and surrounding whitespace are ignored. Empty or
/// non-numeric input, and anything that isn't finite, means "no result".
pub fn sanitize_numeric_input(input: &str) -> Option<f64> {
    let cleaned = input.replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Resolve a unit token within a category.
///
/// Tries, in order: exact name, exact symbol, then case-insensitive name,
/// singular name ("meter" for "Meters") and symbol.
pub fn resolve_unit<'a>(category: &'a Category, token: &str) -> Option<&'a Unit> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    if let Some(unit) = category.find_unit(token) {
        return Some(unit);
    }
    if let Some(unit) = category.units.iter().find(|u| u.symbol == token) {
        return Some(unit);
    }

    let lower = token.to_lowercase();
    category.units.iter().find(|u| {
        let name = u.name.to_lowercase();
        name == lower || name.trim_end_matches('s') == lower || u.symbol.to_lowercase() == lower
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuantity<'a> {
    pub value: f64,
    /// `None` when the text carried no unit suffix
    pub unit: Option<&'a Unit>,
}

/// Parse free text such as "12.5 km", "1,000ft" or "5" against a category.
///
/// Returns `None` when the number is unusable or a suffix is present but
/// doesn't name a unit of the category.
pub fn parse_quantity<'a>(text: &str, category: &'a Category) -> Option<ParsedQuantity<'a>> {
    let caps = QUANTITY_RE.captures(text)?;
    let value = sanitize_numeric_input(caps.get(1)?.as_str())?;
    let suffix = caps.get(2).map(|m| m.as_str()).unwrap_or("");

    if suffix.is_empty() {
        return Some(ParsedQuantity { value, unit: None });
    }

    let unit = resolve_unit(category, suffix)?;
    Some(ParsedQuantity { value, unit: Some(unit) })
}
