use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::shared::error::AppError;
use crate::shared::types::RatesResponse;

pub const BASE_CURRENCY: &str = "USD";

pub type CurrencyResult<T> = Result<T, AppError>;

/// Point-in-time rates, expressed as units of each currency per 1 USD.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeRateSnapshot {
    pub base: String,
    pub rates: HashMap<String, f64>,
    pub fetched_at: DateTime<Utc>,
}

impl ExchangeRateSnapshot {
    pub fn new(mut rates: HashMap<String, f64>, fetched_at: DateTime<Utc>) -> Self {
        rates.insert(BASE_CURRENCY.to_string(), 1.0);
        Self {
            base: BASE_CURRENCY.to_string(),
            rates,
            fetched_at,
        }
    }

    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(&code.to_ascii_uppercase()).copied()
    }

    pub fn to_response(&self) -> RatesResponse {
        RatesResponse {
            available: true,
            base: self.base.clone(),
            fetched_at: Some(self.fetched_at.to_rfc3339()),
            rates: self.rates.clone(),
        }
    }
}

/// Payload from the primary endpoint: `{ "success": true, "rates": { ... } }`.
#[derive(Debug, Deserialize)]
pub struct PrimaryRatesPayload {
    #[serde(default)]
    pub success: bool,
    #[serde(default, deserialize_with = "deserialize_rates")]
    pub rates: HashMap<String, f64>,
}

/// Payload from the fallback endpoint: rates without a success flag.
#[derive(Debug, Deserialize)]
pub struct FallbackRatesPayload {
    #[serde(default, deserialize_with = "deserialize_rates")]
    pub rates: HashMap<String, f64>,
    pub time_last_updated: Option<i64>,
}

// ---- Serde helpers ----

/// Accepts numeric or string rates; drops anything that isn't a positive finite number.
fn deserialize_rates<'de, D>(deserializer: D) -> Result<HashMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<HashMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|(code, value)| {
            let rate = match value {
                Value::Number(num) => num.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            }?;
            (rate.is_finite() && rate > 0.0).then(|| (code.to_ascii_uppercase(), rate))
        })
        .collect())
}
