//! Fun-fact annotation
//!
//! Read-through cache in front of a text-generation provider. Facts are about
//! the source quantity only, so the destination unit and result are not part
//! of the cache key.

pub mod cache;
pub mod debounce;
pub mod provider;

pub use cache::FactCache;
pub use debounce::{FactDisplay, FactTrigger};
pub use provider::{build_generator, FactProvider, TextGenerator};

use chrono::Utc;
use std::sync::{Arc, Mutex};

use crate::shared::error::{AppError, AppResult};
use crate::shared::settings::FunFactSettings;
use crate::shared::types::FunFactRequest;

pub const SYSTEM_PROMPT: &str = "Return one super random, factual fun fact (<=22 words). \
Focus on the input unit itself; use vivid comparisons; no conversions or instructions.";

const INVALID_PAYLOAD: &str = "Invalid request payload";
const GENERATION_FAILED: &str = "Failed to generate fun fact";

/// The validated part of a request that drives the prompt and the cache key.
#[derive(Debug, Clone, PartialEq)]
pub struct FactSubject<'a> {
    pub value: f64,
    pub from_unit_name: &'a str,
    pub from_unit_symbol: &'a str,
    pub category_name: &'a str,
}

impl<'a> FactSubject<'a> {
    /// Rejects a missing value or an empty unit or category name.
    pub fn from_request(request: &'a FunFactRequest) -> AppResult<Self> {
        let value = request
            .value
            .ok_or_else(|| AppError::Validation(INVALID_PAYLOAD.into()))?;
        let from_unit_name = non_empty(request.from_unit_name.as_deref())?;
        let category_name = non_empty(request.category_name.as_deref())?;

        Ok(Self {
            value,
            from_unit_name,
            from_unit_symbol: request.from_unit_symbol.as_deref().unwrap_or(""),
            category_name,
        })
    }

    /// `category|fromUnitName|fromUnitSymbol|value`
    ///
    /// `value` renders with `f64` `Display`: `5` and `0.25`, but `1e21` prints
    /// every digit and never switches to exponent form. A missing symbol is an
    /// empty segment, in both the key and the prompt.
    pub fn cache_key(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            self.category_name, self.from_unit_name, self.from_unit_symbol, self.value
        )
    }

    pub fn prompt(&self) -> String {
        format!(
            "Fun fact about {} {} ({}) in {}.",
            self.value, self.from_unit_name, self.from_unit_symbol, self.category_name
        )
    }
}

fn non_empty(field: Option<&str>) -> AppResult<&str> {
    field
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation(INVALID_PAYLOAD.into()))
}

pub struct FunFactService {
    generator: Option<Arc<dyn TextGenerator>>,
    cache: Mutex<FactCache>,
}

impl FunFactService {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self {
            generator,
            cache: Mutex::new(FactCache::new()),
        }
    }

    pub fn from_settings(settings: &FunFactSettings) -> AppResult<Self> {
        let generator = build_generator(settings)?;
        if generator.is_none() {
            tracing::warn!("FUN_FACT_API_KEY is not set; fun facts are disabled");
        }
        Ok(Self::new(generator))
    }

    pub fn is_configured(&self) -> bool {
        self.generator.is_some()
    }

    /// Fact for the request's source quantity, from cache or the provider.
    ///
    /// Validation runs before anything else, so a bad request never reaches
    /// the network.
    pub async fn fetch_fact(&self, request: &FunFactRequest) -> AppResult<String> {
        let subject = FactSubject::from_request(request)?;

        let generator = self
            .generator
            .as_ref()
            .ok_or_else(|| AppError::Configuration("Missing FUN_FACT_API_KEY".into()))?;

        let key = subject.cache_key();
        if let Some(fact) = self.cached(&key)? {
            tracing::debug!(%key, "fun fact cache hit");
            return Ok(fact);
        }
        tracing::debug!(%key, "fun fact cache miss");

        // The lock is not held across the provider call; concurrent misses on
        // one key may both call out, and the later insert wins.
        let fact = generator
            .generate(SYSTEM_PROMPT, &subject.prompt())
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "fun fact generation failed");
                AppError::Upstream(GENERATION_FAILED.into())
            })?;

        self.lock_cache()?.insert(key, fact.clone(), Utc::now());
        Ok(fact)
    }

    /// Fire-and-forget form: any failure becomes "no fact".
    pub async fn annotate(&self, request: &FunFactRequest) -> Option<String> {
        match self.fetch_fact(request).await {
            Ok(fact) => Some(fact),
            Err(e) => {
                tracing::debug!(error = %e, "no fun fact");
                None
            }
        }
    }

    pub fn cached_len(&self) -> usize {
        self.lock_cache().map(|cache| cache.len()).unwrap_or(0)
    }

    fn cached(&self, key: &str) -> AppResult<Option<String>> {
        let cache = self.lock_cache()?;
        Ok(cache.get(key, Utc::now()).map(str::to_string))
    }

    fn lock_cache(&self) -> AppResult<std::sync::MutexGuard<'_, FactCache>> {
        self.cache
            .lock()
            .map_err(|e| AppError::System(format!("fun fact cache poisoned: {}", e)))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Generator that counts calls and echoes the prompt back.
    #[derive(Default)]
    pub(crate) struct CountingGenerator {
        pub calls: AtomicUsize,
        pub fail: bool,
    }

    #[async_trait]
    impl TextGenerator for CountingGenerator {
        async fn generate(&self, _system: &str, prompt: &str) -> AppResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AppError::Upstream("provider returned 500".into()));
            }
            Ok(format!("fact for: {}", prompt))
        }
    }

    pub(crate) fn request(value: f64, unit: &str, symbol: &str, category: &str) -> FunFactRequest {
        FunFactRequest {
            value: Some(value),
            from_unit_name: Some(unit.to_string()),
            from_unit_symbol: Some(symbol.to_string()),
            category_name: Some(category.to_string()),
            ..FunFactRequest::default()
        }
    }

    fn service_with(generator: Arc<CountingGenerator>) -> FunFactService {
        FunFactService::new(Some(generator))
    }

    #[test]
    fn test_cache_key_and_prompt() {
        let req = request(5.0, "Meters", "m", "Length");
        let subject = FactSubject::from_request(&req).unwrap();
        assert_eq!(subject.cache_key(), "Length|Meters|m|5");
        assert_eq!(subject.prompt(), "Fun fact about 5 Meters (m) in Length.");

        let mut req = request(0.25, "Celsius", "", "Temperature");
        req.from_unit_symbol = None;
        let subject = FactSubject::from_request(&req).unwrap();
        assert_eq!(subject.cache_key(), "Temperature|Celsius||0.25");
    }

    #[test]
    fn test_value_rendering_in_key_and_prompt() {
        let req = request(1e21, "Meters", "m", "Length");
        let subject = FactSubject::from_request(&req).unwrap();
        assert_eq!(subject.cache_key(), "Length|Meters|m|1000000000000000000000");

        let mut req = request(-0.5, "Kelvin", "", "Temperature");
        req.from_unit_symbol = None;
        let subject = FactSubject::from_request(&req).unwrap();
        assert_eq!(subject.prompt(), "Fun fact about -0.5 Kelvin () in Temperature.");
    }

    #[test]
    fn test_validation_rejects_missing_fields() {
        let mut req = request(5.0, "Meters", "m", "Length");
        req.value = None;
        assert!(matches!(FactSubject::from_request(&req), Err(AppError::Validation(_))));

        let mut req = request(5.0, "", "m", "Length");
        assert!(matches!(FactSubject::from_request(&req), Err(AppError::Validation(_))));
        req.from_unit_name = Some("Meters".into());
        req.category_name = Some(String::new());
        assert!(matches!(FactSubject::from_request(&req), Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_identical_requests_call_provider_once() {
        let generator = Arc::new(CountingGenerator::default());
        let service = service_with(generator.clone());

        let first = service.fetch_fact(&request(5.0, "Meters", "m", "Length")).await.unwrap();
        let second = service.fetch_fact(&request(5.0, "Meters", "m", "Length")).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
        assert_eq!(service.cached_len(), 1);
    }

    #[tokio::test]
    async fn test_destination_unit_does_not_change_key() {
        let generator = Arc::new(CountingGenerator::default());
        let service = service_with(generator.clone());

        let mut to_feet = request(5.0, "Meters", "m", "Length");
        to_feet.to_unit_name = Some("Feet".into());
        let mut to_miles = request(5.0, "Meters", "m", "Length");
        to_miles.to_unit_name = Some("Miles".into());

        service.fetch_fact(&to_feet).await.unwrap();
        service.fetch_fact(&to_miles).await.unwrap();
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_category_rejected_before_any_call() {
        let generator = Arc::new(CountingGenerator::default());
        let service = service_with(generator.clone());

        let mut req = request(5.0, "Meters", "m", "Length");
        req.category_name = None;

        let err = service.fetch_fact(&req).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_key_is_configuration_error() {
        let service = FunFactService::new(None);
        let err = service
            .fetch_fact(&request(5.0, "Meters", "m", "Length"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_provider_failure_is_upstream_and_not_cached() {
        let generator = Arc::new(CountingGenerator {
            fail: true,
            ..CountingGenerator::default()
        });
        let service = service_with(generator.clone());

        let err = service
            .fetch_fact(&request(5.0, "Meters", "m", "Length"))
            .await
            .unwrap_err();
        assert_eq!(err.public_message(), "Failed to generate fun fact");
        assert_eq!(service.cached_len(), 0);
        assert!(service.annotate(&request(5.0, "Meters", "m", "Length")).await.is_none());
        assert_eq!(generator.calls.load(Ordering::SeqCst), 2);
    }
}
