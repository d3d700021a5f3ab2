//! Fun fact command

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;

use crate::api::AppState;
use crate::shared::error::{AppError, AppResult};
use crate::shared::types::{FunFactRequest, FunFactResponse};

/// Generate (or serve from cache) a fun fact about the source quantity.
///
/// The body is parsed by hand so that malformed JSON gets the same 400 as a
/// payload with missing fields.
pub async fn get_fun_fact(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<FunFactResponse>> {
    let request: FunFactRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(error = %e, "unparseable fun fact payload");
        AppError::Validation("Invalid request payload".into())
    })?;

    let fact = state.facts.fetch_fact(&request).await?;
    Ok(Json(FunFactResponse { fact }))
}
