//! Weighting policies: per-domain capital multipliers and risk coefficients
//! derived from respondent metadata.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};

use crate::domain::{CapitalDomain, CapitalVector, RiskComponent};

/// Respondent metadata as supplied by the caller (sector, profession, ...).
pub type Meta = Map<String, Value>;

/// Coefficient per risk component in `V = Σ alpha_k * component_k`.
pub type RiskAlphas = BTreeMap<RiskComponent, f64>;

/// Chooses domain weights and risk coefficients for a respondent.
pub trait WeightingPolicy: Send + Sync {
    fn weights(&self, meta: &Meta) -> CapitalVector;

    fn risk_alphas(&self, meta: &Meta) -> RiskAlphas;

    fn describe(&self) -> Option<String> {
        None
    }
}

/// Sector/profession tag overrides on top of a neutral 1.0 base.
///
/// Tags match case-insensitively as substrings. The sector override runs
/// first; the profession override then replaces S and E only.
#[derive(Debug, Clone)]
pub struct SectorWeightingPolicy {
    pub sector_tags: Vec<String>,
    /// S, H, C, E, I weights when a sector tag matches.
    pub sector_weights: [f64; 5],
    pub profession_tags: Vec<String>,
    /// S and E weights when a profession tag matches.
    pub profession_social: f64,
    pub profession_economic: f64,
    pub alphas: [(RiskComponent, f64); 4],
}

impl Default for SectorWeightingPolicy {
    fn default() -> Self {
        Self {
            sector_tags: vec!["CCS".to_string(), "CREATIVE".to_string()],
            sector_weights: [0.8, 1.0, 1.2, 1.0, 0.9],
            profession_tags: vec!["entrepreneur".to_string(), "founder".to_string()],
            profession_social: 1.1,
            profession_economic: 1.1,
            alphas: [
                (RiskComponent::Precarity, 0.3),
                (RiskComponent::Burnout, 0.2),
                (RiskComponent::SupportAccess, 0.2),
                (RiskComponent::ShockExposure, 0.3),
            ],
        }
    }
}

impl SectorWeightingPolicy {
    fn matches_any(field: &str, tags: &[String]) -> bool {
        let field = field.to_lowercase();
        tags.iter().any(|t| field.contains(&t.to_lowercase()))
    }
}

impl WeightingPolicy for SectorWeightingPolicy {
    fn weights(&self, meta: &Meta) -> CapitalVector {
        let mut w = CapitalVector::repeat(1.0);
        if Self::matches_any(&meta_text(meta, "sector"), &self.sector_tags) {
            w = CapitalVector::from_column_slice(&self.sector_weights);
        }
        if Self::matches_any(&meta_text(meta, "profession"), &self.profession_tags) {
            w[CapitalDomain::Social.index()] = self.profession_social;
            w[CapitalDomain::Economic.index()] = self.profession_economic;
        }
        w
    }

    // Constant for now; takes metadata so per-segment coefficients can slot in.
    fn risk_alphas(&self, _meta: &Meta) -> RiskAlphas {
        self.alphas.iter().copied().collect()
    }

    fn describe(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl fmt::Display for SectorWeightingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SectorWeightingPolicy(sector_tags={:?}, profession_tags={:?})",
            self.sector_tags, self.profession_tags
        )
    }
}

/// Metadata field as text; missing and null read as empty.
pub fn meta_text(meta: &Meta, key: &str) -> String {
    match meta.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta(v: Value) -> Meta {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn base_case_is_neutral() {
        let w = SectorWeightingPolicy::default().weights(&Meta::new());
        assert!(w.iter().all(|&x| x == 1.0));
    }

    #[test]
    fn creative_sector_then_founder() {
        let policy = SectorWeightingPolicy::default();
        let w = policy.weights(&meta(json!({"sector": "Creative industries", "profession": "Co-Founder"})));
        assert_eq!(w.as_slice(), &[1.1, 1.0, 1.2, 1.1, 0.9]);

        let w = policy.weights(&meta(json!({"sector": "ccs"})));
        assert_eq!(w.as_slice(), &[0.8, 1.0, 1.2, 1.0, 0.9]);
    }

    #[test]
    fn non_string_metadata_does_not_match() {
        let w = SectorWeightingPolicy::default().weights(&meta(json!({"sector": 7, "profession": null})));
        assert!(w.iter().all(|&x| x == 1.0));
    }

    #[test]
    fn alphas_cover_every_component() {
        let alphas = SectorWeightingPolicy::default().risk_alphas(&Meta::new());
        assert_eq!(alphas.len(), RiskComponent::ALL.len());
        assert!((alphas.values().sum::<f64>() - 1.0).abs() < 1e-12);
    }
}
