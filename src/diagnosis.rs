//! End-to-end diagnosis: normalized answers → capital flow → score and
//! bottlenecks, serialized as the `results` map.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::bottleneck::{rank_bottlenecks, Bottleneck};
use crate::capital::{compute_capital_vector, compute_transfer_barrier, is_model_key};
use crate::config::EngineConfig;
use crate::domain::{domain_scores, round6, DomainScores, RiskComponent};
use crate::error::DiagnoseError;
use crate::flow::{composite_score, FlowState, RiskProfile};
use crate::normalize::{normalize, Normalization, RawResponses};
use crate::weighting::{Meta, RiskAlphas, SectorWeightingPolicy, WeightingPolicy};

/// Request document accepted at the boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagnoseRequest {
    #[serde(default, alias = "meta_public")]
    pub meta: Meta,
    /// `None` when the caller sent no answers at all.
    #[serde(default)]
    pub responses: Option<RawResponses>,
}

/// Risk block of the results map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    #[serde(rename = "V")]
    pub v: f64,
    pub lambda: f64,
    pub components: BTreeMap<RiskComponent, f64>,
    pub alphas: RiskAlphas,
}

/// The `results` map: the per-respondent diagnosis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub save_score: f64,
    pub responses_norm: BTreeMap<String, f64>,
    pub capital_vector: DomainScores,
    pub weights: DomainScores,
    pub risk: RiskReport,
    pub bottlenecks: Vec<Bottleneck>,
}

impl Diagnosis {
    /// Results map as JSON, for callers that store or forward it untyped.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Full-precision evaluation behind a [`Diagnosis`].
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub normalization: Normalization,
    pub flow: FlowState,
    pub risk: RiskProfile,
    pub bottlenecks: Vec<Bottleneck>,
    pub score: f64,
}

impl Evaluation {
    /// Round for output. Risk components, alphas and bottlenecks stay exact.
    pub fn into_diagnosis(self) -> Diagnosis {
        Diagnosis {
            save_score: round6(self.score),
            responses_norm: self
                .normalization
                .responses
                .iter()
                .map(|(k, &v)| (k.clone(), round6(v)))
                .collect(),
            capital_vector: domain_scores(&self.flow.capital, round6),
            weights: domain_scores(&self.flow.weights, round6),
            risk: RiskReport {
                v: round6(self.risk.v),
                lambda: self.risk.lambda,
                components: self.risk.components,
                alphas: self.risk.alphas,
            },
            bottlenecks: self.bottlenecks,
        }
    }
}

/// Diagnosis engine: configuration plus a weighting policy.
///
/// Stateless between calls; one engine can serve concurrent callers.
#[derive(Clone)]
pub struct Engine {
    config: EngineConfig,
    policy: Arc<dyn WeightingPolicy>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            policy: Arc::new(SectorWeightingPolicy::default()),
        }
    }

    pub fn with_policy(mut self, policy: Arc<dyn WeightingPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn evaluate(&self, meta: &Meta, responses: &RawResponses) -> Evaluation {
        let normalization = normalize(responses);
        let normed = &normalization.responses;

        let capital = compute_capital_vector(normed);
        let weights = self.policy.weights(meta);
        let (transfer, barrier) = compute_transfer_barrier(normed);
        let flow = FlowState::compute(capital, weights, transfer, barrier);

        let risk = RiskProfile::compute(normed, self.policy.risk_alphas(meta), self.config.lambda);
        let score = composite_score(flow.magnitude, &risk);
        let bottlenecks =
            rank_bottlenecks(&flow.adjusted, &flow.transfer, &flow.barrier, &flow.effective);

        debug!(
            answered = normed.len(),
            skipped = normalization.skipped.len(),
            unmapped = normed.keys().filter(|k| !is_model_key(k)).count(),
            flow_magnitude = flow.magnitude,
            risk_v = risk.v,
            score,
            "diagnosis computed"
        );

        Evaluation {
            normalization,
            flow,
            risk,
            bottlenecks,
            score,
        }
    }

    pub fn diagnose(&self, meta: &Meta, responses: &RawResponses) -> Diagnosis {
        self.evaluate(meta, responses).into_diagnosis()
    }

    /// Diagnose a boundary request; fails only when `responses` is missing.
    pub fn diagnose_request(&self, request: &DiagnoseRequest) -> Result<Diagnosis, DiagnoseError> {
        let responses = request
            .responses
            .as_ref()
            .ok_or(DiagnoseError::MissingResponses)?;
        Ok(self.diagnose(&request.meta, responses))
    }

    /// Diagnose an untyped request document.
    pub fn diagnose_value(&self, request: Value) -> Result<Diagnosis, DiagnoseError> {
        let request: DiagnoseRequest = serde_json::from_value(request)?;
        self.diagnose_request(&request)
    }
}

/// Diagnose with the default configuration and weighting policy.
pub fn diagnose(meta: &Meta, responses: &RawResponses) -> Diagnosis {
    Engine::default().diagnose(meta, responses)
}
