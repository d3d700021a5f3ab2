use chrono::{TimeZone, Utc};
use reqwest::Client;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

use crate::shared::error::AppError;
use crate::shared::settings::CurrencySettings;

use super::types::{
    CurrencyResult, ExchangeRateSnapshot, FallbackRatesPayload, PrimaryRatesPayload,
};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Live exchange-rate source with a process-lifetime snapshot.
///
/// The first successful fetch is kept forever; there is no refresh. Until one
/// succeeds every call retries the endpoints, and callers fall back to the
/// static registry factors in the meantime.
pub struct CurrencyRateService {
    http: Client,
    primary_url: String,
    fallback_url: String,
    snapshot: OnceCell<ExchangeRateSnapshot>,
    warming: AtomicBool,
}

impl CurrencyRateService {
    pub fn new(settings: &CurrencySettings) -> CurrencyResult<Self> {
        let http = Client::builder()
            .user_agent("unitwise/currency")
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Network(e.to_string()))?;

        Ok(Self {
            http,
            primary_url: settings.primary_url.clone(),
            fallback_url: settings.fallback_url.clone(),
            snapshot: OnceCell::new(),
            warming: AtomicBool::new(false),
        })
    }

    /// Returns the cached snapshot, fetching it first if none exists yet.
    ///
    /// Failures are logged and swallowed; `None` means neither endpoint has answered.
    pub async fn get_rates(&self) -> Option<&ExchangeRateSnapshot> {
        match self
            .snapshot
            .get_or_try_init(|| self.fetch_first_available())
            .await
        {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!(error = %e, "no exchange rates available; using static factors");
                None
            }
        }
    }

    /// Snapshot if one was already fetched. Never suspends.
    pub fn cached(&self) -> Option<&ExchangeRateSnapshot> {
        self.snapshot.get()
    }

    /// Start fetching in the background unless a snapshot exists or a fetch
    /// is already running. Returns immediately.
    pub fn warm_up(self: &Arc<Self>) {
        if self.cached().is_some() || self.warming.swap(true, Ordering::AcqRel) {
            return;
        }

        let service = Arc::clone(self);
        tokio::spawn(async move {
            if service.get_rates().await.is_none() {
                tracing::debug!("rate warm-up finished without a snapshot");
            }
            service.warming.store(false, Ordering::Release);
        });
    }

    async fn fetch_first_available(&self) -> CurrencyResult<ExchangeRateSnapshot> {
        match self.fetch_primary().await {
            Ok(snapshot) => {
                tracing::info!(rates = snapshot.rates.len(), "exchange rates loaded from primary source");
                return Ok(snapshot);
            }
            Err(e) => tracing::warn!(url = %self.primary_url, error = %e, "primary rate source failed"),
        }

        let snapshot = self.fetch_fallback().await.map_err(|e| {
            tracing::warn!(url = %self.fallback_url, error = %e, "fallback rate source failed");
            e
        })?;
        tracing::info!(rates = snapshot.rates.len(), "exchange rates loaded from fallback source");
        Ok(snapshot)
    }

    async fn fetch_primary(&self) -> CurrencyResult<ExchangeRateSnapshot> {
        let resp = self.http.get(&self.primary_url).send().await?;

        if !resp.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Failed to fetch rates: {}",
                resp.status()
            )));
        }

        let json: PrimaryRatesPayload = resp
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Invalid response: {}", e)))?;

        if !json.success || json.rates.is_empty() {
            return Err(AppError::Upstream("API reported failure".into()));
        }

        Ok(ExchangeRateSnapshot::new(json.rates, Utc::now()))
    }

    async fn fetch_fallback(&self) -> CurrencyResult<ExchangeRateSnapshot> {
        let resp = self.http.get(&self.fallback_url).send().await?;

        if !resp.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Failed to fetch rates: {}",
                resp.status()
            )));
        }

        let json: FallbackRatesPayload = resp
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Invalid response: {}", e)))?;

        if json.rates.is_empty() {
            return Err(AppError::Upstream("Response carried no rates".into()));
        }

        let fetched_at = json
            .time_last_updated
            .and_then(|t| Utc.timestamp_opt(t, 0).single())
            .unwrap_or_else(Utc::now);

        Ok(ExchangeRateSnapshot::new(json.rates, fetched_at))
    }
}
