//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the services. Request
//! handling never reads environment variables; the binaries collect them once into [`EnvValues`]
//! and resolve them with [`CoreConfig::from_env_values`].

use std::path::PathBuf;
use std::sync::Arc;

use crate::analyzer::{AnalyzerConfig, ConflictAnalyzer};
use crate::catalog::DrugCatalog;
use crate::constants::{
    DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL,
    DEFAULT_MODEL_TIMEOUT_SECS, DEFAULT_OPENFDA_BASE_URL,
};
use crate::error::{ConfigError, ConfigResult};
use crate::gemini::GeminiClient;
use crate::label::OpenFdaClient;
use crate::report::ReportService;

/// Model service settings.
#[derive(Clone)]
pub struct GeminiSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for GeminiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiSettings")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Label service settings.
#[derive(Clone, Debug)]
pub struct OpenFdaSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for OpenFdaSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OPENFDA_BASE_URL.into(),
            api_key: None,
            timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    gemini: GeminiSettings,
    openfda: OpenFdaSettings,
    analyzer: AnalyzerConfig,
    catalog: Arc<DrugCatalog>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingApiKey` if the model API key is absent or blank.
    pub fn new(
        gemini_api_key: Option<String>,
        gemini_model: Option<String>,
        openfda: OpenFdaSettings,
        catalog: DrugCatalog,
    ) -> ConfigResult<Self> {
        let api_key = gemini_api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let model = non_empty(gemini_model).unwrap_or_else(|| DEFAULT_GEMINI_MODEL.into());

        Ok(Self {
            gemini: GeminiSettings {
                api_key,
                model,
                base_url: DEFAULT_GEMINI_BASE_URL.into(),
                timeout_secs: DEFAULT_MODEL_TIMEOUT_SECS,
            },
            openfda,
            analyzer: AnalyzerConfig::default(),
            catalog: Arc::new(catalog),
        })
    }

    /// Point the model client at a different base URL.
    pub fn with_gemini_base_url(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = non_empty(base_url) {
            self.gemini.base_url = url;
        }
        self
    }

    pub fn with_model_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.gemini.timeout_secs = timeout_secs;
        self
    }

    pub fn gemini(&self) -> &GeminiSettings {
        &self.gemini
    }

    pub fn openfda(&self) -> &OpenFdaSettings {
        &self.openfda
    }

    pub fn analyzer(&self) -> &AnalyzerConfig {
        &self.analyzer
    }

    pub fn catalog(&self) -> &DrugCatalog {
        &self.catalog
    }

    /// Build the production report service: openFDA for labels, Gemini for analysis.
    ///
    /// # Errors
    /// Returns `ConfigError::HttpClient` if either HTTP client cannot be built.
    pub fn build_report_service(&self) -> ConfigResult<ReportService> {
        let labels = OpenFdaClient::new(
            &self.openfda.base_url,
            self.openfda.timeout_secs,
            self.openfda.api_key.clone(),
        )?;
        let model = GeminiClient::new(
            &self.gemini.base_url,
            &self.gemini.model,
            &self.gemini.api_key,
            self.gemini.timeout_secs,
        )?;
        let analyzer = ConflictAnalyzer::new(Arc::new(model), self.analyzer.clone());

        Ok(ReportService::new(
            Arc::new(labels),
            analyzer,
            self.catalog.clone(),
        ))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a timeout in seconds from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns `default`.
pub fn timeout_secs_from_env_value(value: Option<String>, default: u64) -> ConfigResult<u64> {
    match non_empty(value) {
        None => Ok(default),
        Some(v) => match v.parse::<u64>() {
            Ok(0) => Err(ConfigError::InvalidInput("timeout must be at least 1 second".into())),
            Ok(secs) => Ok(secs),
            Err(_) => Err(ConfigError::InvalidInput(format!(
                "timeout must be a whole number of seconds, got {v:?}"
            ))),
        },
    }
}

/// Load the drug catalog from an optional file path.
///
/// If `value` is `None` or empty/whitespace, returns the built-in antihypertensive catalog.
pub fn catalog_from_env_value(value: Option<String>) -> ConfigResult<DrugCatalog> {
    match non_empty(value) {
        None => Ok(DrugCatalog::antihypertensives()),
        Some(path) => Ok(DrugCatalog::load(&PathBuf::from(path))?),
    }
}

/// Resolve the openFDA settings from optional string values.
pub fn openfda_from_env_values(
    base_url: Option<String>,
    api_key: Option<String>,
    timeout: Option<String>,
) -> ConfigResult<OpenFdaSettings> {
    Ok(OpenFdaSettings {
        base_url: non_empty(base_url).unwrap_or_else(|| DEFAULT_OPENFDA_BASE_URL.into()),
        api_key: non_empty(api_key),
        timeout_secs: timeout_secs_from_env_value(timeout, DEFAULT_FETCH_TIMEOUT_SECS)?,
    })
}

/// Raw configuration values as read from the process environment.
///
/// Every field is the unparsed variable; blank values count as unset.
#[derive(Clone, Debug, Default)]
pub struct EnvValues {
    pub gemini_api_key: Option<String>,
    pub gemini_model: Option<String>,
    pub gemini_base_url: Option<String>,
    pub openfda_base_url: Option<String>,
    pub openfda_api_key: Option<String>,
    pub fetch_timeout_secs: Option<String>,
    pub model_timeout_secs: Option<String>,
    pub catalog_path: Option<String>,
}

impl EnvValues {
    /// Read every drugcheck variable from the current process environment.
    pub fn from_process_env() -> Self {
        let var = |name: &str| std::env::var(name).ok();
        Self {
            gemini_api_key: var("GEMINI_API_KEY"),
            gemini_model: var("GEMINI_MODEL"),
            gemini_base_url: var("GEMINI_BASE_URL"),
            openfda_base_url: var("OPENFDA_BASE_URL"),
            openfda_api_key: var("OPENFDA_API_KEY"),
            fetch_timeout_secs: var("DRUGCHECK_FETCH_TIMEOUT_SECS"),
            model_timeout_secs: var("DRUGCHECK_MODEL_TIMEOUT_SECS"),
            catalog_path: var("DRUGCHECK_CATALOG_PATH"),
        }
    }

    pub fn openfda(&self) -> ConfigResult<OpenFdaSettings> {
        openfda_from_env_values(
            self.openfda_base_url.clone(),
            self.openfda_api_key.clone(),
            self.fetch_timeout_secs.clone(),
        )
    }

    pub fn catalog(&self) -> ConfigResult<DrugCatalog> {
        catalog_from_env_value(self.catalog_path.clone())
    }
}

impl CoreConfig {
    /// Resolve the full configuration from raw environment values.
    ///
    /// # Errors
    /// Returns a `ConfigError` if the API key is missing, a timeout is invalid, or the catalog
    /// file cannot be loaded.
    pub fn from_env_values(values: &EnvValues) -> ConfigResult<Self> {
        let model_timeout = timeout_secs_from_env_value(
            values.model_timeout_secs.clone(),
            DEFAULT_MODEL_TIMEOUT_SECS,
        )?;

        Ok(Self::new(
            values.gemini_api_key.clone(),
            values.gemini_model.clone(),
            values.openfda()?,
            values.catalog()?,
        )?
        .with_gemini_base_url(values.gemini_base_url.clone())
        .with_model_timeout_secs(model_timeout))
    }
}
