//! Constants used throughout the drugcheck core crate.
//!
//! Upstream endpoints, defaults and the fixed strings that appear in reports live here so that
//! the fetcher, analyzer and report service agree on them.

/// Default base URL of the openFDA API.
pub const DEFAULT_OPENFDA_BASE_URL: &str = "https://api.fda.gov";

/// Path of the openFDA drug label endpoint, relative to the base URL.
pub const OPENFDA_LABEL_PATH: &str = "/drug/label.json";

/// Default base URL of the Gemini REST API.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default Gemini model used for conflict analysis.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Default timeout for a single label lookup, in seconds.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Default timeout for a single model call, in seconds.
pub const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 60;

/// Placeholder used when a label section is missing or empty.
pub const NO_INFORMATION_LISTED: &str = "No information listed.";

/// Rendered in place of an empty profile field.
pub const NOT_AVAILABLE: &str = "N/A";

/// Drug class reported for ad-hoc single drug lookups.
pub const CUSTOM_DRUG_CLASS: &str = "Custom Search";

/// Maximum number of model attempts per drug.
pub const MAX_MODEL_ATTEMPTS: u32 = 3;

/// Backoff before the first retry, in seconds. Doubles after every wait.
pub const INITIAL_BACKOFF_SECS: u64 = 1;
