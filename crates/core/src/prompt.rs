//! System instruction, response schema and user prompt for conflict analysis.

use serde_json::{json, Value};

use crate::types::{AlertKind, DrugRecord};

/// Fixed instruction sent with every analysis call.
pub const SYSTEM_INSTRUCTION: &str = "\
You are an expert clinical pharmacologist's assistant. Your sole purpose is to
read a patient's profile and cross-reference it with the full text of a drug's
official \"Contraindications\", \"Warnings\", \"Interactions\", and \"Adverse Reactions\".

You must be extremely thorough. Find every potential conflict, even minor ones.
- CONTRAINDICATION: A direct \"do not use\" situation. (e.g., a listed allergy, a pre-existing condition in contraindications).
- WARNING: A \"use with caution\" situation. (e.g., patient has 'diabetes' and the drug warns about 'diabetic patients').
- INTERACTION: A conflict with one of the patient's other medications.
- SIDE_EFFECT_MATCH: The patient's notes (symptoms) match a known adverse reaction.
- INFO: No conflicts found.

Each finding must be a single concise sentence.
If no conflicts are found, return exactly one INFO alert. Otherwise do not return any INFO alert.
You MUST respond only with the JSON schema provided.
Do not add any other text or explanation.
";

/// Response schema constraining the model to an array of `{type, finding}` objects.
pub fn response_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "type": {
                    "type": "STRING",
                    "enum": AlertKind::MODEL_LABELS,
                },
                "finding": {
                    "type": "STRING",
                    "description": "A concise, one-sentence explanation of the conflict, side effect, or interaction found."
                }
            },
            "required": ["type", "finding"]
        }
    })
}

/// Compose the user prompt for one drug. Deterministic for identical inputs.
pub fn build_prompt(profile_text: &str, drug: &DrugRecord) -> String {
    format!(
        "PATIENT PROFILE:\n\
         {profile_text}\n\
         \n\
         DRUG DATA FOR: {generic}\n\
         ---\n\
         CONTRAINDICATIONS:\n\
         {contraindications}\n\
         ---\n\
         WARNINGS AND PRECAUTIONS:\n\
         {warnings}\n\
         ---\n\
         DRUG INTERACTIONS:\n\
         {interactions}\n\
         ---\n\
         ADVERSE REACTIONS:\n\
         {adverse}\n\
         ---\n\
         ANALYZE and return all conflicts. If no conflicts are found, return a single \"INFO\" alert.\n",
        generic = drug.generic_name,
        contraindications = drug.contraindications,
        warnings = drug.warnings_and_precautions,
        interactions = drug.drug_interactions,
        adverse = drug.adverse_reactions,
    )
}
