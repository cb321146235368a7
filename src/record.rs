//! Assessment records: the shape a surrounding service stores for one
//! respondent. Nothing here persists anything.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::archetype::ArchetypeLibrary;
use crate::diagnosis::{DiagnoseRequest, Engine};
use crate::error::DiagnoseError;
use crate::normalize::RawResponses;
use crate::profile::{build_profile, Profile};
use crate::weighting::Meta;

fn default_consent() -> bool {
    true
}

/// Request to diagnose and record a respondent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentCreateRequest {
    #[serde(default)]
    pub profile_id: Option<String>,
    #[serde(default = "default_consent")]
    pub consent_research: bool,
    #[serde(default, alias = "meta")]
    pub meta_public: Meta,
    #[serde(default)]
    pub responses: Option<RawResponses>,
}

/// A diagnosed assessment. `responses_norm` is kept apart from `results`
/// so retention jobs can clear answers while keeping the diagnosis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub assessment_id: String,
    pub profile_id: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "default_consent")]
    pub consent_research: bool,
    #[serde(default)]
    pub meta_public: Meta,
    #[serde(default)]
    pub responses_norm: Value,
    #[serde(default)]
    pub results: Value,
}

impl AssessmentRecord {
    /// Diagnose the request and wrap the outcome in a fresh record.
    pub fn create(engine: &Engine, request: AssessmentCreateRequest) -> Result<Self, DiagnoseError> {
        let diagnosis = engine.diagnose_request(&DiagnoseRequest {
            meta: request.meta_public.clone(),
            responses: request.responses,
        })?;

        let responses_norm = serde_json::to_value(&diagnosis.responses_norm)?;
        let results = match diagnosis.to_value() {
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .filter(|(k, _)| k != "responses_norm")
                    .collect(),
            ),
            other => other,
        };

        Ok(Self {
            assessment_id: Uuid::new_v4().to_string(),
            profile_id: request
                .profile_id
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            created_at: Utc::now(),
            consent_research: request.consent_research,
            meta_public: request.meta_public,
            responses_norm,
            results,
        })
    }

    /// Profile for this record in `lang`.
    pub fn profile(&self, lang: &str, library: &ArchetypeLibrary) -> Profile {
        build_profile(
            &self.assessment_id,
            &self.profile_id,
            &self.meta_public,
            &self.results,
            lang,
            library,
        )
    }
}
