//! Drug label lookup.
//!
//! [`LabelSource`] is the seam the report service fetches through. [`OpenFdaClient`] implements
//! it against the openFDA drug label endpoint: one exact-match query per drug, limited to the
//! first result, with every failure mapped to an absent record.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::constants::{NO_INFORMATION_LISTED, OPENFDA_LABEL_PATH};
use crate::types::DrugRecord;

/// Source of drug label data.
#[async_trait]
pub trait LabelSource: Send + Sync {
    /// Look up a drug by brand or generic name.
    ///
    /// Returns `None` when the drug cannot be resolved for any reason. Failures are logged by
    /// the implementation and never raised.
    async fn fetch(&self, drug_name: &str) -> Option<DrugRecord>;
}

/// Reasons a label lookup produced no record. Only ever logged.
#[derive(Debug, thiserror::Error)]
pub enum LabelError {
    #[error("request timed out after {0}s")]
    Timeout(u64),
    #[error("HTTP client error: {0}")]
    HttpClient(String),
    #[error("openFDA returned status {0}")]
    Status(u16),
    #[error("openFDA returned an error: {0}")]
    Upstream(String),
    #[error("failed to decode openFDA response: {0}")]
    Decode(String),
    #[error("no results found")]
    NoResults,
}

/// HTTP client for `GET /drug/label.json`.
pub struct OpenFdaClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl OpenFdaClient {
    /// Create a client for the openFDA instance at `base_url`.
    ///
    /// # Errors
    /// Returns the underlying `reqwest::Error` if the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        api_key: Option<String>,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            client,
            timeout_secs,
        })
    }

    async fn lookup(&self, drug_name: &str) -> Result<DrugRecord, LabelError> {
        let url = format!("{}{}", self.base_url, OPENFDA_LABEL_PATH);
        let mut query = vec![
            ("search", label_search_query(drug_name)),
            ("limit", "1".to_string()),
        ];
        if let Some(key) = &self.api_key {
            query.push(("api_key", key.clone()));
        }

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LabelError::Timeout(self.timeout_secs)
                } else {
                    LabelError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LabelError::Status(status.as_u16()));
        }

        let body: LabelResponse = response
            .json()
            .await
            .map_err(|e| LabelError::Decode(e.to_string()))?;

        record_from_response(drug_name, body)
    }
}

#[async_trait]
impl LabelSource for OpenFdaClient {
    async fn fetch(&self, drug_name: &str) -> Option<DrugRecord> {
        match self.lookup(drug_name).await {
            Ok(record) => {
                tracing::debug!(drug = %drug_name, generic = %record.generic_name, "label fetched");
                Some(record)
            }
            Err(e) => {
                tracing::warn!(drug = %drug_name, error = %e, "label lookup failed");
                None
            }
        }
    }
}

/// Search expression matching the drug against exact brand and generic name fields.
///
/// openFDA stores the exact fields upper-case, so upper-casing the query makes the match
/// case-insensitive. Double quotes are stripped so the name cannot close the phrase early.
pub fn label_search_query(drug_name: &str) -> String {
    let name = drug_name.trim().replace('"', "").to_uppercase();
    format!("(openfda.generic_name.exact:\"{name}\" OR openfda.brand_name.exact:\"{name}\")")
}

#[derive(Debug, Default, Deserialize)]
struct LabelResponse {
    #[serde(default)]
    results: Vec<LabelResult>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct LabelResult {
    #[serde(default)]
    openfda: OpenFdaNames,
    #[serde(default)]
    contraindications: Option<Value>,
    #[serde(default)]
    warnings_and_precautions: Option<Value>,
    #[serde(default)]
    drug_interactions: Option<Value>,
    #[serde(default)]
    adverse_reactions: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenFdaNames {
    #[serde(default)]
    brand_name: Vec<String>,
    #[serde(default)]
    generic_name: Vec<String>,
}

fn record_from_response(drug_name: &str, body: LabelResponse) -> Result<DrugRecord, LabelError> {
    if let Some(error) = body.error {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(LabelError::Upstream(message));
    }

    let label = body.results.into_iter().next().ok_or(LabelError::NoResults)?;

    Ok(DrugRecord {
        brand_name: names_or(&label.openfda.brand_name, drug_name),
        generic_name: names_or(&label.openfda.generic_name, drug_name),
        contraindications: section_text(label.contraindications.as_ref()),
        warnings_and_precautions: section_text(label.warnings_and_precautions.as_ref()),
        drug_interactions: section_text(label.drug_interactions.as_ref()),
        adverse_reactions: section_text(label.adverse_reactions.as_ref()),
    })
}

fn names_or(names: &[String], fallback: &str) -> String {
    let joined = names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    if joined.is_empty() {
        fallback.trim().to_string()
    } else {
        joined
    }
}

/// Join a label section into one lowercase blob, or the placeholder if there is nothing usable.
fn section_text(section: Option<&Value>) -> String {
    let parts: Vec<&str> = match section {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    };

    if parts.is_empty() {
        NO_INFORMATION_LISTED.to_string()
    } else {
        parts.join(" ").to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_http;
    use serde_json::json;

    fn parse(drug_name: &str, body: Value) -> Result<DrugRecord, LabelError> {
        record_from_response(drug_name, serde_json::from_value(body).unwrap())
    }

    #[test]
    fn test_label_search_query_is_exact_and_upper_case() {
        assert_eq!(
            label_search_query(" lisinopril "),
            "(openfda.generic_name.exact:\"LISINOPRIL\" OR openfda.brand_name.exact:\"LISINOPRIL\")"
        );
    }

    #[test]
    fn test_label_search_query_strips_quotes() {
        assert!(!label_search_query("ab\"c").contains("AB\"C"));
        assert!(label_search_query("ab\"c").contains("\"ABC\""));
    }

    #[test]
    fn test_record_joins_and_lowercases_sections() {
        let record = parse(
            "Lisinopril",
            json!({
                "results": [{
                    "openfda": {"brand_name": ["ZESTRIL"], "generic_name": ["LISINOPRIL"]},
                    "contraindications": ["4 CONTRAINDICATIONS", "Hereditary ANGIOEDEMA."],
                    "warnings_and_precautions": ["Hypotension"],
                    "drug_interactions": ["NSAIDs may reduce effect"],
                    "adverse_reactions": ["Cough"]
                }]
            }),
        )
        .unwrap();

        assert_eq!(record.brand_name, "ZESTRIL");
        assert_eq!(record.generic_name, "LISINOPRIL");
        assert_eq!(
            record.contraindications,
            "4 contraindications hereditary angioedema."
        );
        assert_eq!(record.drug_interactions, "nsaids may reduce effect");
    }

    #[test]
    fn test_missing_or_empty_sections_use_placeholder() {
        let record = parse(
            "Losartan",
            json!({
                "results": [{
                    "openfda": {"generic_name": ["LOSARTAN POTASSIUM"]},
                    "contraindications": [],
                    "warnings_and_precautions": "not a list",
                    "adverse_reactions": ["Dizziness"]
                }]
            }),
        )
        .unwrap();

        assert_eq!(record.contraindications, NO_INFORMATION_LISTED);
        assert_eq!(record.warnings_and_precautions, NO_INFORMATION_LISTED);
        assert_eq!(record.drug_interactions, NO_INFORMATION_LISTED);
        assert_eq!(record.adverse_reactions, "dizziness");
    }

    #[test]
    fn test_missing_names_fall_back_to_query() {
        let record = parse("Amlodipine", json!({"results": [{}]})).unwrap();
        assert_eq!(record.brand_name, "Amlodipine");
        assert_eq!(record.generic_name, "Amlodipine");
    }

    #[test]
    fn test_multiple_names_are_comma_joined() {
        let record = parse(
            "Metoprolol",
            json!({"results": [{"openfda": {"brand_name": ["LOPRESSOR", "TOPROL-XL"]}}]}),
        )
        .unwrap();
        assert_eq!(record.brand_name, "LOPRESSOR, TOPROL-XL");
    }

    #[test]
    fn test_empty_results_is_no_results() {
        let err = parse("Nope", json!({"results": []})).unwrap_err();
        assert!(matches!(err, LabelError::NoResults));
    }

    #[test]
    fn test_error_body_is_upstream_error() {
        let err = parse(
            "Nope",
            json!({"error": {"code": "NOT_FOUND", "message": "No matches found!"}}),
        )
        .unwrap_err();
        assert!(matches!(err, LabelError::Upstream(msg) if msg == "No matches found!"));
    }

    #[test]
    fn test_client_trims_trailing_slash_and_blank_key() {
        let client = OpenFdaClient::new("https://api.fda.gov/", 10, Some("  ".into())).unwrap();
        assert_eq!(client.base_url, "https://api.fda.gov");
        assert!(client.api_key.is_none());
        assert_eq!(client.timeout_secs, 10);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_absent() {
        let client = OpenFdaClient::new("http://127.0.0.1:9", 1, None).unwrap();
        assert!(client.fetch("Lisinopril").await.is_none());
    }

    #[tokio::test]
    async fn test_non_success_status_is_absent() {
        let (base_url, server) = test_http::serve(vec![
            (
                404,
                r#"{"error": {"code": "NOT_FOUND", "message": "No matches found!"}}"#,
            ),
            (500, r#"{"error": {"code": "SERVER_ERROR"}}"#),
        ])
        .await;
        let client = OpenFdaClient::new(&base_url, 5, None).unwrap();

        assert!(client.fetch("Notadrug").await.is_none());
        assert!(client.fetch("Lisinopril").await.is_none());

        let requests = server.await.unwrap();
        assert_eq!(requests.len(), 2);
    }

    #[tokio::test]
    async fn test_success_response_builds_record() {
        let (base_url, server) = test_http::serve(vec![(
            200,
            r#"{"results":[{"openfda":{"brand_name":["ZESTRIL"]},"contraindications":["PENICILLIN"]}]}"#,
        )])
        .await;
        let client = OpenFdaClient::new(&base_url, 5, Some("abc123".into())).unwrap();

        let record = client.fetch("lisinopril").await.unwrap();
        assert_eq!(
            record,
            DrugRecord {
                brand_name: "ZESTRIL".into(),
                generic_name: "lisinopril".into(),
                contraindications: "penicillin".into(),
                warnings_and_precautions: NO_INFORMATION_LISTED.into(),
                drug_interactions: NO_INFORMATION_LISTED.into(),
                adverse_reactions: NO_INFORMATION_LISTED.into(),
            }
        );

        let requests = server.await.unwrap();
        let request_line = requests[0].lines().next().unwrap();
        assert!(request_line.starts_with("GET /drug/label.json?"));
        assert!(request_line.contains("LISINOPRIL"));
        assert!(request_line.contains("limit=1"));
        assert!(request_line.contains("api_key=abc123"));
    }
}
