//! Currency conversion
//!
//! Registry factors for currencies are USD per unit and frozen at build time.
//! Live snapshots are units per USD. Conversion prefers live data per side and
//! falls back to the static factor for whichever side the snapshot lacks.

pub mod service;
pub mod types;

pub use service::CurrencyRateService;
pub use types::{ExchangeRateSnapshot, BASE_CURRENCY};

use crate::core::features::unit_converter::registry::Unit;

/// Converts `value` between two currency units. Unrounded; the engine rounds.
///
/// Rates are looked up by unit symbol (the ISO code), not by unit name.
pub fn convert_currency(
    value: f64,
    from: &Unit,
    to: &Unit,
    snapshot: Option<&ExchangeRateSnapshot>,
) -> f64 {
    let Some(snapshot) = snapshot else {
        return (value * from.factor) / to.factor;
    };

    let value_in_usd = if from.symbol == BASE_CURRENCY {
        value
    } else {
        match snapshot.rate(from.symbol) {
            Some(rate) => value / rate,
            None => value * from.factor,
        }
    };

    if to.symbol == BASE_CURRENCY {
        value_in_usd
    } else {
        match snapshot.rate(to.symbol) {
            Some(rate) => value_in_usd * rate,
            None => value_in_usd / to.factor,
        }
    }
}
