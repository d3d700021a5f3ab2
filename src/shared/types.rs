//! Wire types shared with the browser UI.
//!
//! Field names follow the UI's camelCase convention. Bindings are exported with ts-rs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "api/")]
pub struct UnitDTO {
    pub name: String,
    pub symbol: String,
    pub factor: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "api/")]
pub struct CategoryDTO {
    pub name: String,
    pub base_unit: String,
    /// "linear", "temperature" or "currency"
    pub strategy: String,
    pub units: Vec<UnitDTO>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "api/")]
pub struct GetCategoriesResponse {
    pub categories: Vec<CategoryDTO>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "api/")]
pub struct ConvertUnitsRequest {
    pub category_name: String,
    pub from_unit_name: String,
    pub to_unit_name: String,
    /// Raw text from the input box; grouping commas are allowed
    pub input: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "api/")]
pub struct ConvertUnitsResponse {
    /// `None` when the input isn't a usable number
    pub result: Option<f64>,
    pub formatted: String,
}

/// Every field is optional on the wire so that missing fields reach validation
/// instead of failing deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export, export_to = "api/")]
pub struct FunFactRequest {
    pub value: Option<f64>,
    pub from_unit_name: Option<String>,
    pub from_unit_symbol: Option<String>,
    pub category_name: Option<String>,
    pub to_unit_name: Option<String>,
    pub to_unit_symbol: Option<String>,
    pub result_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "api/")]
pub struct FunFactResponse {
    pub fact: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "api/")]
pub struct RatesResponse {
    pub available: bool,
    pub base: String,
    pub fetched_at: Option<String>,
    pub rates: HashMap<String, f64>,
}
