//! Report assembly.
//!
//! Drives each drug through fetch, analysis and assembly, one drug at a time. A failure for one
//! drug only ever degrades that drug's report.

use std::sync::Arc;

use crate::analyzer::ConflictAnalyzer;
use crate::catalog::{CatalogEntry, DrugCatalog};
use crate::constants::{CUSTOM_DRUG_CLASS, NOT_AVAILABLE};
use crate::label::LabelSource;
use crate::profile::format_profile;
use crate::types::{Alert, DrugReport, DrugStage, PatientProfile};

/// Builds drug reports for a patient profile.
#[derive(Clone)]
pub struct ReportService {
    labels: Arc<dyn LabelSource>,
    analyzer: ConflictAnalyzer,
    catalog: Arc<DrugCatalog>,
}

impl ReportService {
    pub fn new(
        labels: Arc<dyn LabelSource>,
        analyzer: ConflictAnalyzer,
        catalog: Arc<DrugCatalog>,
    ) -> Self {
        Self {
            labels,
            analyzer,
            catalog,
        }
    }

    pub fn catalog(&self) -> &DrugCatalog {
        &self.catalog
    }

    /// Report on every catalog drug, in catalog order.
    ///
    /// Always returns exactly one report per catalog entry.
    pub async fn batch_report(&self, profile: &PatientProfile) -> Vec<DrugReport> {
        let profile_text = format_profile(profile);
        let mut reports = Vec::with_capacity(self.catalog.len());

        for CatalogEntry { drug_class, name } in self.catalog.entries() {
            let report = self
                .drug_report(&profile_text, name, drug_class, |name| {
                    format!("Could not fetch drug data from openFDA for '{name}'.")
                })
                .await;
            reports.push(report);
        }

        tracing::info!(drugs = reports.len(), "batch report complete");
        reports
    }

    /// Report on a single, arbitrary drug name.
    pub async fn single_report(&self, profile: &PatientProfile, drug_name: &str) -> DrugReport {
        let profile_text = format_profile(profile);
        self.drug_report(&profile_text, drug_name.trim(), CUSTOM_DRUG_CLASS, |name| {
            format!("Could not fetch drug data for '{name}'. Check spelling.")
        })
        .await
    }

    async fn drug_report(
        &self,
        profile_text: &str,
        drug_name: &str,
        drug_class: &str,
        fetch_failed: impl FnOnce(&str) -> String,
    ) -> DrugReport {
        tracing::debug!(drug = %drug_name, stage = %DrugStage::Pending);

        let Some(record) = self.labels.fetch(drug_name).await else {
            tracing::warn!(drug = %drug_name, stage = %DrugStage::FetchFailed, "no label data");
            return DrugReport {
                generic_name: drug_name.to_string(),
                brand_name: NOT_AVAILABLE.to_string(),
                drug_class: drug_class.to_string(),
                alerts: vec![Alert::error(fetch_failed(drug_name))],
                full_data: None,
            };
        };
        tracing::debug!(drug = %drug_name, stage = %DrugStage::Fetched);

        let mut alerts = self.analyzer.analyze(profile_text, &record).await;
        if alerts.is_empty() {
            alerts.push(Alert::error("Could not analyze drug: no alerts returned"));
        }
        tracing::info!(
            drug = %drug_name,
            stage = %DrugStage::Analyzed,
            alerts = alerts.len(),
            "drug analyzed"
        );

        let report = DrugReport {
            generic_name: record.generic_name.clone(),
            brand_name: record.brand_name.clone(),
            drug_class: drug_class.to_string(),
            alerts,
            full_data: Some(record),
        };
        tracing::debug!(drug = %drug_name, stage = %DrugStage::Assembled);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::test_support::{KeywordModel, ScriptedModel};
    use crate::analyzer::{AnalyzerConfig, ModelClient, ModelError};
    use crate::constants::NO_INFORMATION_LISTED;
    use crate::types::{AlertKind, DrugRecord};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory label source keyed by upper-cased drug name.
    struct StubLabels {
        records: HashMap<String, DrugRecord>,
        lookups: Mutex<Vec<String>>,
    }

    impl StubLabels {
        fn new(records: Vec<DrugRecord>) -> Self {
            Self {
                records: records
                    .into_iter()
                    .map(|r| (r.generic_name.to_uppercase(), r))
                    .collect(),
                lookups: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LabelSource for StubLabels {
        async fn fetch(&self, drug_name: &str) -> Option<DrugRecord> {
            self.lookups.lock().unwrap().push(drug_name.to_string());
            self.records.get(&drug_name.to_uppercase()).cloned()
        }
    }

    fn record(generic: &str, contraindications: &str) -> DrugRecord {
        DrugRecord {
            brand_name: format!("{generic} BRAND"),
            generic_name: generic.to_uppercase(),
            contraindications: contraindications.to_string(),
            warnings_and_precautions: NO_INFORMATION_LISTED.into(),
            drug_interactions: NO_INFORMATION_LISTED.into(),
            adverse_reactions: NO_INFORMATION_LISTED.into(),
        }
    }

    fn service(labels: Arc<StubLabels>, model: Arc<dyn ModelClient>) -> ReportService {
        ReportService::new(
            labels,
            ConflictAnalyzer::new(model, AnalyzerConfig::default()),
            Arc::new(DrugCatalog::antihypertensives()),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_report_one_per_entry_in_catalog_order() {
        let labels = Arc::new(StubLabels::new(vec![
            record("Lisinopril", "angioedema"),
            record("Amlodipine", "hypersensitivity"),
            record("Hydrochlorothiazide", "anuria"),
        ]));
        let svc = service(labels.clone(), Arc::new(KeywordModel));

        let reports = svc.batch_report(&PatientProfile::default()).await;

        let classes: Vec<&str> = reports.iter().map(|r| r.drug_class.as_str()).collect();
        assert_eq!(
            classes,
            [
                "ACE Inhibitor",
                "ARB",
                "Calcium Channel Blocker",
                "Beta-Blocker",
                "Diuretic"
            ]
        );
        assert_eq!(
            *labels.lookups.lock().unwrap(),
            ["Lisinopril", "Losartan", "Amlodipine", "Metoprolol", "Hydrochlorothiazide"]
        );
        assert!(reports.iter().all(|r| !r.alerts.is_empty()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_report_isolates_fetch_failures() {
        let labels = Arc::new(StubLabels::new(vec![record("Lisinopril", "angioedema")]));
        let svc = service(labels, Arc::new(KeywordModel));

        let reports = svc.batch_report(&PatientProfile::default()).await;

        assert_eq!(reports.len(), 5);
        assert_eq!(reports[0].full_data.as_ref().unwrap().generic_name, "LISINOPRIL");
        assert_eq!(reports[0].alerts[0].kind, AlertKind::Info);

        let losartan = &reports[1];
        assert_eq!(losartan.generic_name, "Losartan");
        assert_eq!(losartan.brand_name, "N/A");
        assert_eq!(losartan.drug_class, "ARB");
        assert_eq!(losartan.alerts.len(), 1);
        assert_eq!(losartan.alerts[0].kind, AlertKind::Error);
        assert!(losartan.alerts[0].finding.contains("Losartan"));
        assert!(losartan.full_data.is_none());
        assert_eq!(serde_json::to_value(losartan).unwrap()["fullData"], serde_json::json!({}));
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_report_continues_after_analysis_failure() {
        let labels = Arc::new(StubLabels::new(vec![
            record("Lisinopril", "a"),
            record("Losartan", "b"),
        ]));
        let model = Arc::new(ScriptedModel::new(vec![
            Err(ModelError::Api {
                status: 400,
                message: "bad request".into(),
            }),
            Ok(r#"[{"type": "WARNING", "finding": "Monitor potassium."}]"#.into()),
        ]));
        let svc = service(labels, model);

        let reports = svc.batch_report(&PatientProfile::default()).await;

        assert_eq!(reports[0].alerts[0].kind, AlertKind::Error);
        assert_eq!(reports[1].alerts[0].kind, AlertKind::Warning);
        assert!(reports[1].full_data.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_report_unknown_drug() {
        let labels = Arc::new(StubLabels::new(vec![]));
        let svc = service(labels, Arc::new(KeywordModel));

        let report = svc
            .single_report(&PatientProfile::default(), "Notadrugazol")
            .await;

        assert_eq!(report.drug_class, CUSTOM_DRUG_CLASS);
        assert_eq!(
            report.alerts,
            vec![Alert::error(
                "Could not fetch drug data for 'Notadrugazol'. Check spelling."
            )]
        );
        assert!(report.full_data.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_report_flags_allergy_in_contraindications() {
        let labels = Arc::new(StubLabels::new(vec![record(
            "Lisinopril",
            "do not use in patients allergic to penicillin",
        )]));
        let svc = service(labels, Arc::new(KeywordModel));
        let profile = PatientProfile {
            allergies: vec!["penicillin".into()],
            ..Default::default()
        };

        let report = svc.single_report(&profile, "Lisinopril").await;

        assert_eq!(report.drug_class, "Custom Search");
        assert_eq!(report.generic_name, "LISINOPRIL");
        assert!(report
            .alerts
            .iter()
            .any(|a| a.kind == AlertKind::Contraindication && a.finding.contains("penicillin")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_report_is_idempotent() {
        let labels = Arc::new(StubLabels::new(vec![record("Losartan", "pregnancy")]));
        let svc = service(labels, Arc::new(KeywordModel));
        let profile = PatientProfile {
            vitals: "BP 140/90".into(),
            allergies: vec!["sulfa".into()],
            ..Default::default()
        };

        let first = svc.single_report(&profile, " Losartan ").await;
        let second = svc.single_report(&profile, " Losartan ").await;

        assert_eq!(first, second);
    }
}
