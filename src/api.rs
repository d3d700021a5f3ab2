//! HTTP surface
//!
//! Thin axum layer over the features. Handlers live in `commands`, one module
//! per feature; state is built once at startup and shared by reference.

pub mod commands;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::core::features::currency::CurrencyRateService;
use crate::core::features::fun_fact::FunFactService;
use crate::shared::error::AppResult;
use crate::shared::settings::AppSettings;

/// Process-scoped services shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub rates: Arc<CurrencyRateService>,
    pub facts: Arc<FunFactService>,
}

impl AppState {
    pub fn new(rates: CurrencyRateService, facts: FunFactService) -> Self {
        Self {
            rates: Arc::new(rates),
            facts: Arc::new(facts),
        }
    }

    pub fn from_settings(settings: &AppSettings) -> AppResult<Self> {
        Ok(Self::new(
            CurrencyRateService::new(&settings.currency)?,
            FunFactService::from_settings(&settings.fun_fact)?,
        ))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/categories", get(commands::units::get_categories))
        .route("/api/convert", post(commands::units::convert_units))
        .route("/api/rates", get(commands::currency::get_rates))
        .route(
            "/api/funfact",
            post(commands::fun_fact::get_fun_fact).fallback(method_not_allowed),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed" })),
    )
}
