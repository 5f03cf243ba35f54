//! Patient profile rendering.
//!
//! Turns a [`PatientProfile`] into the fixed text block embedded in every analysis prompt.

use crate::constants::NOT_AVAILABLE;
use crate::types::PatientProfile;

/// Render a profile as the four-line block used in prompts.
///
/// Blank text fields and empty lists render as `N/A`. List entries that are blank after trimming
/// are skipped. Never fails.
pub fn format_profile(profile: &PatientProfile) -> String {
    format!(
        "- Vitals: {}\n- Notes/History: {}\n- Allergies: {}\n- Other Medications: {}",
        text_or_na(&profile.vitals),
        text_or_na(&profile.notes),
        list_or_na(&profile.allergies),
        list_or_na(&profile.meds),
    )
}

fn text_or_na(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        NOT_AVAILABLE
    } else {
        trimmed
    }
}

fn list_or_na(items: &[String]) -> String {
    let joined = items
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    if joined.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        joined
    }
}
