// ============================================================================
// Unit Registry - immutable reference data, built once per process
// ============================================================================

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::shared::types::{CategoryDTO, UnitDTO};

/// How the engine converts between two units of a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionStrategy {
    /// `value * from.factor / to.factor`
    Linear,
    /// Affine, per-scale formulas through Celsius
    Temperature,
    /// Live USD-relative rates with the static factors as fallback
    Currency,
}

impl ConversionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversionStrategy::Linear => "linear",
            ConversionStrategy::Temperature => "temperature",
            ConversionStrategy::Currency => "currency",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureScale {
    Celsius,
    Fahrenheit,
    Kelvin,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    /// Unique within its category
    pub name: &'static str,
    /// Display label; not guaranteed unique (both gallons are "gal")
    pub symbol: &'static str,
    /// Base units per one of this unit. Placeholder for temperature; USD per unit for currency.
    pub factor: f64,
    pub scale: Option<TemperatureScale>,
}

impl Unit {
    const fn linear(name: &'static str, symbol: &'static str, factor: f64) -> Self {
        Self { name, symbol, factor, scale: None }
    }

    const fn temperature(name: &'static str, symbol: &'static str, scale: TemperatureScale) -> Self {
        Self { name, symbol, factor: 1.0, scale: Some(scale) }
    }

    pub fn to_dto(&self) -> UnitDTO {
        UnitDTO {
            name: self.name.to_string(),
            symbol: self.symbol.to_string(),
            factor: self.factor,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    /// Unique; doubles as the routing key
    pub name: &'static str,
    pub base_unit: &'static str,
    pub strategy: ConversionStrategy,
    /// At least two; the first two are the default from/to selection
    pub units: Vec<Unit>,
}

impl Category {
    fn new(
        name: &'static str,
        base_unit: &'static str,
        strategy: ConversionStrategy,
        units: Vec<Unit>,
    ) -> Self {
        debug_assert!(units.len() >= 2, "category {name} needs at least two units");
        Self { name, base_unit, strategy, units }
    }

    /// Exact match on the unit name.
    pub fn find_unit(&self, unit_name: &str) -> Option<&Unit> {
        self.units.iter().find(|unit| unit.name == unit_name)
    }

    pub fn default_units(&self) -> (&Unit, &Unit) {
        (&self.units[0], &self.units[1])
    }

    pub fn to_dto(&self) -> CategoryDTO {
        CategoryDTO {
            name: self.name.to_string(),
            base_unit: self.base_unit.to_string(),
            strategy: self.strategy.as_str().to_string(),
            units: self.units.iter().map(Unit::to_dto).collect(),
        }
    }
}

static CATEGORIES: Lazy<Vec<Category>> = Lazy::new(|| {
    use ConversionStrategy::{Currency, Linear, Temperature};
    use TemperatureScale::{Celsius, Fahrenheit, Kelvin};

    vec![
        // Length (base: meters)
        Category::new("Length", "meters", Linear, vec![
            Unit::linear("Meters", "m", 1.0),
            Unit::linear("Kilometers", "km", 1000.0),
            Unit::linear("Centimeters", "cm", 0.01),
            Unit::linear("Millimeters", "mm", 0.001),
            Unit::linear("Miles", "mi", 1609.344),
            Unit::linear("Feet", "ft", 0.3048),
            Unit::linear("Inches", "in", 0.0254),
            Unit::linear("Yards", "yd", 0.9144),
            Unit::linear("Nautical Miles", "nmi", 1852.0),
        ]),
        // Weight (base: kilograms)
        Category::new("Weight", "kilograms", Linear, vec![
            Unit::linear("Kilograms", "kg", 1.0),
            Unit::linear("Grams", "g", 0.001),
            Unit::linear("Pounds", "lbs", 0.453592),
            Unit::linear("Ounces", "oz", 0.0283495),
            Unit::linear("Tons", "t", 1000.0),
            Unit::linear("Stone", "st", 6.35029),
            Unit::linear("Milligrams", "mg", 0.000001),
        ]),
        // Temperature (factors unused)
        Category::new("Temperature", "celsius", Temperature, vec![
            Unit::temperature("Celsius", "°C", Celsius),
            Unit::temperature("Fahrenheit", "°F", Fahrenheit),
            Unit::temperature("Kelvin", "K", Kelvin),
        ]),
        // Volume (base: liters)
        Category::new("Volume", "liters", Linear, vec![
            Unit::linear("Liters", "L", 1.0),
            Unit::linear("Milliliters", "mL", 0.001),
            Unit::linear("Gallons (US)", "gal", 3.78541),
            Unit::linear("Gallons (UK)", "gal", 4.54609),
            Unit::linear("Cups", "cup", 0.236588),
            Unit::linear("Fluid Ounces", "fl oz", 0.0295735),
            Unit::linear("Pints", "pt", 0.473176),
            Unit::linear("Quarts", "qt", 0.946353),
            Unit::linear("Cubic Meters", "m³", 1000.0),
        ]),
        // Area (base: square meters)
        Category::new("Area", "square meters", Linear, vec![
            Unit::linear("Square Meters", "m²", 1.0),
            Unit::linear("Square Kilometers", "km²", 1_000_000.0),
            Unit::linear("Square Centimeters", "cm²", 0.0001),
            Unit::linear("Hectares", "ha", 10_000.0),
            Unit::linear("Acres", "ac", 4046.8564224),
            Unit::linear("Square Miles", "mi²", 2_589_988.110336),
            Unit::linear("Square Yards", "yd²", 0.83612736),
            Unit::linear("Square Feet", "ft²", 0.09290304),
            Unit::linear("Square Inches", "in²", 0.00064516),
        ]),
        // Speed (base: meters per second)
        Category::new("Speed", "meters per second", Linear, vec![
            Unit::linear("Meters per Second", "m/s", 1.0),
            Unit::linear("Kilometers per Hour", "km/h", 1000.0 / 3600.0),
            Unit::linear("Miles per Hour", "mph", 0.44704),
            Unit::linear("Feet per Second", "ft/s", 0.3048),
            Unit::linear("Knots", "kn", 1852.0 / 3600.0),
        ]),
        // Time (base: seconds)
        Category::new("Time", "seconds", Linear, vec![
            Unit::linear("Seconds", "s", 1.0),
            Unit::linear("Minutes", "min", 60.0),
            Unit::linear("Hours", "h", 3600.0),
            Unit::linear("Days", "d", 86_400.0),
            Unit::linear("Weeks", "wk", 604_800.0),
            Unit::linear("Months", "mo", 2_629_746.0),
            Unit::linear("Years", "yr", 31_556_952.0),
            Unit::linear("Milliseconds", "ms", 0.001),
        ]),
        // Data (base: bytes, binary prefixes)
        Category::new("Data", "bytes", Linear, vec![
            Unit::linear("Bytes", "B", 1.0),
            Unit::linear("Kilobytes", "KB", 1024.0),
            Unit::linear("Megabytes", "MB", 1_048_576.0),
            Unit::linear("Gigabytes", "GB", 1_073_741_824.0),
            Unit::linear("Terabytes", "TB", 1_099_511_627_776.0),
            Unit::linear("Bits", "bit", 0.125),
            Unit::linear("Kilobits", "Kb", 128.0),
            Unit::linear("Megabits", "Mb", 131_072.0),
        ]),
        // Data Rate (base: bits per second, decimal prefixes)
        Category::new("Data Rate", "bits per second", Linear, vec![
            Unit::linear("Bits per Second", "bps", 1.0),
            Unit::linear("Kilobits per Second", "Kbps", 1_000.0),
            Unit::linear("Megabits per Second", "Mbps", 1_000_000.0),
            Unit::linear("Gigabits per Second", "Gbps", 1_000_000_000.0),
            Unit::linear("Bytes per Second", "B/s", 8.0),
            Unit::linear("Kilobytes per Second", "KB/s", 8_000.0),
            Unit::linear("Megabytes per Second", "MB/s", 8_000_000.0),
        ]),
        // Pressure (base: pascals)
        Category::new("Pressure", "pascals", Linear, vec![
            Unit::linear("Pascals", "Pa", 1.0),
            Unit::linear("Kilopascals", "kPa", 1_000.0),
            Unit::linear("Bar", "bar", 100_000.0),
            Unit::linear("PSI", "psi", 6894.757293168),
            Unit::linear("Atmospheres", "atm", 101_325.0),
            Unit::linear("Millimeters of Mercury", "mmHg", 133.322387415),
            Unit::linear("Torr", "Torr", 101_325.0 / 760.0),
        ]),
        // Energy (base: joules)
        Category::new("Energy", "joules", Linear, vec![
            Unit::linear("Joules", "J", 1.0),
            Unit::linear("Kilojoules", "kJ", 1_000.0),
            Unit::linear("Calories", "cal", 4.184),
            Unit::linear("Kilocalories", "kcal", 4_184.0),
            Unit::linear("Watt-hours", "Wh", 3_600.0),
            Unit::linear("Kilowatt-hours", "kWh", 3_600_000.0),
            Unit::linear("British Thermal Units", "BTU", 1055.05585262),
            Unit::linear("Electronvolts", "eV", 1.602176634e-19),
        ]),
        // Currency (factor = USD per unit, approximate; live rates layered on top)
        Category::new("Currency", "US dollars", Currency, vec![
            Unit::linear("US Dollar", "USD", 1.0),
            Unit::linear("Euro", "EUR", 1.08),
            Unit::linear("British Pound", "GBP", 1.27),
            Unit::linear("Japanese Yen", "JPY", 0.0067),
            Unit::linear("Australian Dollar", "AUD", 0.66),
            Unit::linear("Canadian Dollar", "CAD", 0.73),
            Unit::linear("Swiss Franc", "CHF", 1.13),
            Unit::linear("Chinese Yuan", "CNY", 0.14),
            Unit::linear("Indian Rupee", "INR", 0.012),
            Unit::linear("Mexican Peso", "MXN", 0.058),
        ]),
    ]
});

/// All categories in display order.
pub fn categories() -> &'static [Category] {
    &CATEGORIES
}

/// Exact match on the category name.
pub fn find_category(name: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|category| category.name == name)
}

pub fn find_unit<'a>(category: &'a Category, unit_name: &str) -> Option<&'a Unit> {
    category.find_unit(unit_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_twelve_categories_in_order() {
        let names: Vec<&str> = categories().iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            vec![
                "Length", "Weight", "Temperature", "Volume", "Area", "Speed", "Time", "Data",
                "Data Rate", "Pressure", "Energy", "Currency",
            ]
        );
    }

    #[test]
    fn test_unit_names_unique_and_factors_positive() {
        for category in categories() {
            assert!(category.units.len() >= 2, "{} has too few units", category.name);
            let mut seen = HashSet::new();
            for unit in &category.units {
                assert!(seen.insert(unit.name), "duplicate unit {} in {}", unit.name, category.name);
                assert!(unit.factor > 0.0, "{} has non-positive factor", unit.name);
            }
        }
    }

    #[test]
    fn test_strategy_is_attached_to_category() {
        assert_eq!(find_category("Temperature").unwrap().strategy, ConversionStrategy::Temperature);
        assert_eq!(find_category("Currency").unwrap().strategy, ConversionStrategy::Currency);
        assert_eq!(find_category("Length").unwrap().strategy, ConversionStrategy::Linear);
        for unit in &find_category("Temperature").unwrap().units {
            assert!(unit.scale.is_some());
        }
    }

    #[test]
    fn test_lookups_are_exact() {
        assert!(find_category("length").is_none());
        let length = find_category("Length").unwrap();
        assert_eq!(find_unit(length, "Feet").map(|u| u.symbol), Some("ft"));
        assert!(find_unit(length, "feet").is_none());
        assert!(find_unit(length, "Kilograms").is_none());
    }

    #[test]
    fn test_default_units_are_first_two() {
        let (from, to) = find_category("Weight").unwrap().default_units();
        assert_eq!((from.name, to.name), ("Kilograms", "Grams"));
    }

    #[test]
    fn test_currency_symbols_are_iso_codes() {
        for unit in &find_category("Currency").unwrap().units {
            assert_eq!(unit.symbol.len(), 3);
            assert!(unit.symbol.chars().all(|c| c.is_ascii_uppercase()));
        }
    }
}
