//! Currency commands

use axum::extract::State;
use axum::Json;
use std::collections::HashMap;

use crate::api::AppState;
use crate::core::features::currency::BASE_CURRENCY;
use crate::shared::types::RatesResponse;

/// Warm the rate snapshot and report what is available.
///
/// Never fails; `available: false` means conversions use the static factors.
pub async fn get_rates(State(state): State<AppState>) -> Json<RatesResponse> {
    let response = match state.rates.get_rates().await {
        Some(snapshot) => snapshot.to_response(),
        None => RatesResponse {
            available: false,
            base: BASE_CURRENCY.to_string(),
            fetched_at: None,
            rates: HashMap::new(),
        },
    };
    Json(response)
}
