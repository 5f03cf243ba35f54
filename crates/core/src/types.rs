//! Wire and domain types shared by the fetcher, analyzer and report service.
//!
//! Everything here serialises with camelCase field names, which is the shape the REST API
//! returns.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;

/// Self-reported patient profile supplied with every request. Never stored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientProfile {
    #[serde(default, deserialize_with = "null_as_default")]
    pub vitals: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub allergies: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub meds: Vec<String>,
}

/// Label sections for one drug as returned by the label source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DrugRecord {
    pub brand_name: String,
    pub generic_name: String,
    pub contraindications: String,
    pub warnings_and_precautions: String,
    pub drug_interactions: String,
    pub adverse_reactions: String,
}

/// Category of a flagged finding.
///
/// The first five are the labels the model may emit. `Error` is only ever synthesised by this
/// service when a fetch or analysis fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    #[serde(alias = "🔴 CONTRAINDICATION")]
    Contraindication,
    #[serde(alias = "🟠 WARNING")]
    Warning,
    #[serde(alias = "🟡 INTERACTION")]
    Interaction,
    #[serde(alias = "SIDE EFFECT MATCH", alias = "🟠 SIDE EFFECT MATCH")]
    SideEffectMatch,
    #[serde(alias = "🟢 INFO")]
    Info,
    #[serde(alias = "🔴 ERROR")]
    Error,
}

impl AlertKind {
    /// Labels the model is allowed to produce, in the order they are described to it.
    pub const MODEL_LABELS: [&'static str; 5] = [
        "CONTRAINDICATION",
        "WARNING",
        "INTERACTION",
        "SIDE_EFFECT_MATCH",
        "INFO",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Contraindication => "CONTRAINDICATION",
            AlertKind::Warning => "WARNING",
            AlertKind::Interaction => "INTERACTION",
            AlertKind::SideEffectMatch => "SIDE_EFFECT_MATCH",
            AlertKind::Info => "INFO",
            AlertKind::Error => "ERROR",
        }
    }

    /// Whether the model is allowed to emit this kind.
    pub fn is_model_kind(&self) -> bool {
        !matches!(self, AlertKind::Error)
    }
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One flagged finding for a drug.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub finding: String,
}

impl Alert {
    pub fn new(kind: AlertKind, finding: impl Into<String>) -> Self {
        Self {
            kind,
            finding: finding.into(),
        }
    }

    pub fn error(finding: impl Into<String>) -> Self {
        Self::new(AlertKind::Error, finding)
    }
}

/// Result of analysing one drug against a profile.
///
/// `alerts` is never empty. `full_data` is `None` when the label lookup failed and then
/// serialises as an empty JSON object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DrugReport {
    pub generic_name: String,
    pub brand_name: String,
    pub drug_class: String,
    pub alerts: Vec<Alert>,
    #[serde(serialize_with = "none_as_empty_object")]
    #[schema(value_type = Object)]
    pub full_data: Option<DrugRecord>,
}

/// Progress of a single drug through the report flow. Used in log fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrugStage {
    Pending,
    Fetched,
    FetchFailed,
    Analyzed,
    Assembled,
}

impl std::fmt::Display for DrugStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DrugStage::Pending => "PENDING",
            DrugStage::Fetched => "FETCHED",
            DrugStage::FetchFailed => "FETCH_FAILED",
            DrugStage::Analyzed => "ANALYZED",
            DrugStage::Assembled => "ASSEMBLED",
        };
        f.write_str(s)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn none_as_empty_object<S>(value: &Option<DrugRecord>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    use serde::ser::SerializeMap;

    match value {
        Some(record) => record.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}
