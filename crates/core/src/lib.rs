//! # drugcheck core
//!
//! Core logic for cross-referencing a patient profile against official drug label text:
//! - label lookup against openFDA ([`label`])
//! - profile rendering ([`profile`])
//! - model-driven conflict analysis with bounded retries ([`analyzer`], [`gemini`])
//! - per-drug report assembly over a fixed catalog ([`report`], [`catalog`])
//!
//! **No API concerns**: HTTP routing and status codes belong in `api-rest`.

pub mod analyzer;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod error;
pub mod gemini;
pub mod label;
pub mod profile;
pub mod prompt;
pub mod report;
pub mod types;
pub mod validation;

#[cfg(test)]
mod test_http;

pub use analyzer::{AnalyzerConfig, ConflictAnalyzer, ModelClient, ModelError, ModelRequest, RetryPolicy};
pub use catalog::{CatalogEntry, DrugCatalog};
pub use config::{CoreConfig, EnvValues, OpenFdaSettings};
pub use error::{CatalogError, ConfigError, ConfigResult};
pub use gemini::GeminiClient;
pub use label::{LabelSource, OpenFdaClient};
pub use profile::format_profile;
pub use report::ReportService;
pub use types::{Alert, AlertKind, DrugRecord, DrugReport, DrugStage, PatientProfile};
