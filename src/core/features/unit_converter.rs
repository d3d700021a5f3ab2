//! Unit converter feature
//!
//! Conversion engine over the static [`registry`]. Every category carries its
//! [`ConversionStrategy`]; the engine dispatches on that, never on names.
//! Conversion is synchronous and never touches the network: currency reads
//! whatever rate snapshot the caller already holds.

pub mod format;
pub mod parsing;
pub mod registry;

pub use format::format_number;
pub use parsing::{parse_quantity, resolve_unit, sanitize_numeric_input, ParsedQuantity};
pub use registry::{
    categories, find_category, find_unit, Category, ConversionStrategy, TemperatureScale, Unit,
};

use crate::core::features::currency::{convert_currency, ExchangeRateSnapshot};

/// Linear and currency results keep six decimals
pub const DEFAULT_PRECISION: i32 = 6;
/// Temperature results keep two decimals
pub const TEMPERATURE_PRECISION: i32 = 2;

/// Round half up (toward positive infinity) to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor + 0.5).floor() / factor
}

/// Convert using static data only. Currency uses the registry's approximate factors.
pub fn convert(value: f64, from: &Unit, to: &Unit, category: &Category) -> f64 {
    convert_with_rates(value, from, to, category, None)
}

/// Convert `value` from one unit to another within `category`.
///
/// `from` and `to` must belong to `category`. Input isn't validated: NaN and
/// infinities pass straight through, so callers filter input first.
pub fn convert_with_rates(
    value: f64,
    from: &Unit,
    to: &Unit,
    category: &Category,
    rates: Option<&ExchangeRateSnapshot>,
) -> f64 {
    match category.strategy {
        ConversionStrategy::Linear => {
            round_to((value * from.factor) / to.factor, DEFAULT_PRECISION)
        }
        ConversionStrategy::Temperature => {
            round_to(convert_temperature(value, from, to), TEMPERATURE_PRECISION)
        }
        ConversionStrategy::Currency => {
            round_to(convert_currency(value, from, to, rates), DEFAULT_PRECISION)
        }
    }
}

// Temperature conversion goes through Celsius.
// Zero is not special: 0°C is 32°F.
fn convert_temperature(value: f64, from: &Unit, to: &Unit) -> f64 {
    let celsius = to_celsius(value, from.scale.unwrap_or(TemperatureScale::Celsius));
    from_celsius(celsius, to.scale.unwrap_or(TemperatureScale::Celsius))
}

fn to_celsius(value: f64, scale: TemperatureScale) -> f64 {
    match scale {
        TemperatureScale::Celsius => value,
        TemperatureScale::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
        TemperatureScale::Kelvin => value - 273.15,
    }
}

fn from_celsius(celsius: f64, scale: TemperatureScale) -> f64 {
    match scale {
        TemperatureScale::Celsius => celsius,
        TemperatureScale::Fahrenheit => (celsius * 9.0 / 5.0) + 32.0,
        TemperatureScale::Kelvin => celsius + 273.15,
    }
}

// ============================================================================
// Selection state - what the converter form currently shows
// ============================================================================

/// Category, units and raw input of one converter form.
#[derive(Debug, Clone)]
pub struct ConversionSelection {
    pub category: &'static Category,
    pub from: &'static Unit,
    pub to: &'static Unit,
    pub input: String,
}

impl ConversionSelection {
    pub fn new(category: &'static Category) -> Self {
        let (from, to) = category.default_units();
        Self {
            category,
            from,
            to,
            input: "1".to_string(),
        }
    }

    /// Switch category and reset units to its defaults. Unknown names are ignored.
    pub fn select_category(&mut self, name: &str) -> bool {
        match find_category(name) {
            Some(category) => {
                let (from, to) = category.default_units();
                self.category = category;
                self.from = from;
                self.to = to;
                true
            }
            None => false,
        }
    }

    pub fn select_from(&mut self, unit_name: &str) -> bool {
        match self.category.find_unit(unit_name) {
            Some(unit) => {
                self.from = unit;
                true
            }
            None => false,
        }
    }

    pub fn select_to(&mut self, unit_name: &str) -> bool {
        match self.category.find_unit(unit_name) {
            Some(unit) => {
                self.to = unit;
                true
            }
            None => false,
        }
    }

    pub fn value(&self) -> Option<f64> {
        sanitize_numeric_input(&self.input)
    }

    pub fn result(&self, rates: Option<&ExchangeRateSnapshot>) -> Option<f64> {
        self.value()
            .map(|value| convert_with_rates(value, self.from, self.to, self.category, rates))
    }

    /// Display string for the result; empty when there is none.
    pub fn formatted_result(&self, rates: Option<&ExchangeRateSnapshot>) -> String {
        self.result(rates).map(format_number).unwrap_or_default()
    }

    /// Swap units; the current result (as displayed) becomes the new input.
    pub fn swap(&mut self, rates: Option<&ExchangeRateSnapshot>) {
        let current = self.formatted_result(rates);
        std::mem::swap(&mut self.from, &mut self.to);
        if sanitize_numeric_input(&current).is_some() {
            self.input = current;
        }
    }

    pub fn clear(&mut self) {
        self.input.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;

    fn units(category: &str, from: &str, to: &str) -> (&'static Category, &'static Unit, &'static Unit) {
        let category = find_category(category).unwrap();
        (category, category.find_unit(from).unwrap(), category.find_unit(to).unwrap())
    }

    #[test]
    fn test_linear_examples() {
        let (length, km, m) = units("Length", "Kilometers", "Meters");
        assert_eq!(convert(1.0, km, m, length), 1000.0);

        let (weight, kg, lb) = units("Weight", "Kilograms", "Pounds");
        assert!((convert(1.0, kg, lb, weight) - 2.204623).abs() <= 2e-6);

        let (data, mb, gb) = units("Data", "Megabytes", "Gigabytes");
        assert_eq!(convert(1024.0, mb, gb, data), 1.0);
    }

    #[test]
    fn test_temperature_examples() {
        let (temp, c, f) = units("Temperature", "Celsius", "Fahrenheit");
        let k = temp.find_unit("Kelvin").unwrap();
        assert_eq!(convert(0.0, c, f, temp), 32.0);
        assert_eq!(convert(32.0, f, c, temp), 0.0);
        assert_eq!(convert(0.0, c, k, temp), 273.15);
        assert_eq!(convert(100.0, c, f, temp), 212.0);
        assert_eq!(convert(-40.0, c, f, temp), -40.0);
        assert_eq!(convert(0.0, k, c, temp), -273.15);
    }

    #[test]
    fn test_temperature_rounds_to_two_places() {
        let (temp, f, c) = units("Temperature", "Fahrenheit", "Celsius");
        // 100°F = 37.777...°C
        assert_eq!(convert(100.0, f, c, temp), 37.78);
    }

    #[test]
    fn test_zero_is_zero_for_linear() {
        for category in categories().iter().filter(|c| c.strategy == ConversionStrategy::Linear) {
            let (from, to) = category.default_units();
            assert_eq!(convert(0.0, from, to, category), 0.0);
        }
    }

    #[test]
    fn test_same_unit_is_identity_up_to_rounding() {
        let samples = [0.0, 1.0, -7.25, 3.14159265, 123456.789];
        for category in categories().iter().filter(|c| c.strategy == ConversionStrategy::Linear) {
            for unit in &category.units {
                for x in samples {
                    assert_eq!(
                        convert(x, unit, unit, category),
                        round_to(x, DEFAULT_PRECISION),
                        "{} -> {} for {}",
                        unit.name,
                        unit.name,
                        x
                    );
                }
            }
        }
    }

    #[test]
    fn test_round_trip_through_smaller_unit() {
        // Going to the finer unit first keeps the six-decimal rounding error below 1e-6
        let samples = [1.0, 123.456, 0.5];
        for category in categories().iter().filter(|c| c.strategy == ConversionStrategy::Linear) {
            for a in &category.units {
                for b in category.units.iter().filter(|b| a.factor >= b.factor) {
                    for x in samples {
                        let there = convert(x, a, b, category);
                        let back = convert(there, b, a, category);
                        assert!(
                            (back - x).abs() <= 1e-6 + 1e-9,
                            "{}: {} -> {} -> {} gave {}",
                            category.name,
                            a.name,
                            b.name,
                            a.name,
                            back
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_currency_without_snapshot_uses_static_factors() {
        let (currency, usd, eur) = units("Currency", "US Dollar", "Euro");
        assert_eq!(
            convert(100.0, usd, eur, currency),
            round_to(100.0 * usd.factor / eur.factor, DEFAULT_PRECISION)
        );
    }

    #[test]
    fn test_currency_with_snapshot() {
        let (currency, usd, eur) = units("Currency", "US Dollar", "Euro");
        let rates: HashMap<String, f64> = [("EUR".to_string(), 0.9)].into_iter().collect();
        let snapshot = ExchangeRateSnapshot::new(rates, Utc::now());
        assert_eq!(convert_with_rates(100.0, usd, eur, currency, Some(&snapshot)), 90.0);
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(-2.5, 0), -2.0);
        assert_eq!(round_to(1.23456789, 6), 1.234568);
    }

    #[test]
    fn test_selection_defaults_and_category_switch() {
        let mut selection = ConversionSelection::new(&categories()[0]);
        assert_eq!((selection.from.name, selection.to.name), ("Meters", "Kilometers"));
        assert_eq!(selection.formatted_result(None), "0.001");

        assert!(selection.select_category("Temperature"));
        assert_eq!((selection.from.name, selection.to.name), ("Celsius", "Fahrenheit"));
        assert!(!selection.select_category("Luminosity"));
        assert_eq!(selection.category.name, "Temperature");
    }

    #[test]
    fn test_selection_swap_moves_result_into_input() {
        let mut selection = ConversionSelection::new(find_category("Length").unwrap());
        assert!(selection.select_from("Kilometers"));
        assert!(selection.select_to("Meters"));
        selection.input = "2".to_string();

        selection.swap(None);
        assert_eq!((selection.from.name, selection.to.name), ("Meters", "Kilometers"));
        assert_eq!(selection.input, "2,000");
        assert_eq!(selection.result(None), Some(2.0));
    }

    #[test]
    fn test_selection_swap_without_result_keeps_input() {
        let mut selection = ConversionSelection::new(find_category("Length").unwrap());
        selection.input = "abc".to_string();
        selection.swap(None);
        assert_eq!(selection.input, "abc");
        assert_eq!(selection.from.name, "Kilometers");
    }

    #[test]
    fn test_selection_empty_input_has_no_result() {
        let mut selection = ConversionSelection::new(find_category("Length").unwrap());
        selection.clear();
        assert_eq!(selection.result(None), None);
        assert_eq!(selection.formatted_result(None), "");
    }
}
