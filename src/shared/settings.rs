use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::shared::error::{AppError, AppResult};

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_PRIMARY_RATES_URL: &str = "https://api.exchangerate.host/latest?base=USD";
pub const DEFAULT_FALLBACK_RATES_URL: &str = "https://api.exchangerate-api.com/v4/latest/USD";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub server: ServerSettings,
    pub fun_fact: FunFactSettings,
    pub currency: CurrencySettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

/// Everything the fun-fact provider needs. Nothing else in the crate reads these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunFactSettings {
    pub api_key: Option<String>,
    pub provider: String,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencySettings {
    pub primary_url: String,
    pub fallback_url: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

impl Default for FunFactSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            provider: "openrouter".to_string(),
            base_url: None,
            model: None,
        }
    }
}

impl Default for CurrencySettings {
    fn default() -> Self {
        Self {
            primary_url: DEFAULT_PRIMARY_RATES_URL.to_string(),
            fallback_url: DEFAULT_FALLBACK_RATES_URL.to_string(),
        }
    }
}

impl AppSettings {
    pub fn get_settings_path() -> AppResult<PathBuf> {
        ProjectDirs::from("com", "antigravity", "unitwise")
            .map(|dirs| dirs.config_dir().join("settings.json"))
            .ok_or_else(|| AppError::System("Failed to determine config directory".to_string()))
    }

    /// Defaults, then the settings file (if any), then environment overrides.
    ///
    /// An explicit `path` must exist; the platform default path is optional.
    pub async fn load(path: Option<&Path>) -> AppResult<Self> {
        let mut settings = match path {
            Some(explicit) => Self::load_file(explicit).await?,
            None => match Self::get_settings_path() {
                Ok(default_path) if default_path.exists() => Self::load_file(&default_path).await?,
                _ => Self::default(),
            },
        };
        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    async fn load_file(path: &Path) -> AppResult<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::Configuration(format!(
                "Failed to read settings file {}: {}",
                path.display(),
                e
            ))
        })?;
        tracing::debug!(path = %path.display(), "loaded settings file");
        serde_json::from_str(&content).map_err(|e| {
            AppError::Configuration(format!("Failed to parse settings: {}", e))
        })
    }

    /// Apply environment overrides through `lookup` so tests don't touch the process env.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("FUN_FACT_API_KEY") {
            self.fun_fact.api_key = Some(key);
        }
        if let Some(provider) = non_empty("FUN_FACT_PROVIDER") {
            self.fun_fact.provider = provider;
        }
        if let Some(base) = non_empty("FUN_FACT_API_BASE") {
            self.fun_fact.base_url = Some(base);
        }
        if let Some(model) = non_empty("FUN_FACT_MODEL") {
            self.fun_fact.model = Some(model);
        }
        if let Some(bind) = non_empty("UNITWISE_BIND") {
            self.server.bind = bind;
        }
    }
}
