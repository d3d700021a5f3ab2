//! Unit converter commands

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;

use crate::api::AppState;
use crate::core::features::unit_converter::{
    categories, convert_with_rates, find_category, format_number, sanitize_numeric_input,
    ConversionStrategy,
};
use crate::shared::error::{AppError, AppResult};
use crate::shared::types::{ConvertUnitsRequest, ConvertUnitsResponse, GetCategoriesResponse};

/// List every category with its units, in registry order
pub async fn get_categories() -> Json<GetCategoriesResponse> {
    Json(GetCategoriesResponse {
        categories: categories().iter().map(|c| c.to_dto()).collect(),
    })
}

/// Convert the raw input text between two units of one category.
///
/// Unusable input is not an error: it yields `result: null`. Currency uses
/// whatever snapshot is already cached and never waits on the network; a
/// missing snapshot is fetched in the background for later requests.
pub async fn convert_units(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<ConvertUnitsResponse>> {
    let request: ConvertUnitsRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(error = %e, "unparseable convert payload");
        AppError::Validation("Invalid request payload".into())
    })?;

    let category = find_category(&request.category_name).ok_or_else(|| {
        AppError::Validation(format!("Unknown category: {}", request.category_name))
    })?;
    let from = category.find_unit(&request.from_unit_name).ok_or_else(|| {
        AppError::Validation(format!("Unknown unit: {}", request.from_unit_name))
    })?;
    let to = category.find_unit(&request.to_unit_name).ok_or_else(|| {
        AppError::Validation(format!("Unknown unit: {}", request.to_unit_name))
    })?;

    let Some(value) = sanitize_numeric_input(&request.input) else {
        return Ok(Json(ConvertUnitsResponse {
            result: None,
            formatted: String::new(),
        }));
    };

    let rates = match category.strategy {
        ConversionStrategy::Currency => {
            state.rates.warm_up();
            state.rates.cached()
        }
        _ => None,
    };

    let result = convert_with_rates(value, from, to, category, rates);
    Ok(Json(ConvertUnitsResponse {
        result: Some(result),
        formatted: format_number(result),
    }))
}
