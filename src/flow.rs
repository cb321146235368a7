//! Flow & risk engine.
//!
//! - adjusted capital `A = C ⊙ w`
//! - effective transfer `T_eff = T ⊙ (1 − B)`
//! - flow vector `A^T · T_eff` (one value per target domain)
//! - flow magnitude `Σ |flow_j|`
//! - risk composite `V = Σ alpha_k · r_k`
//! - score `flow_magnitude − λ · V`
//!
//! Everything here runs at full precision; rounding happens only when the
//! diagnosis is serialized.

use crate::domain::{CapitalMatrix, CapitalVector, RiskComponent};
use crate::normalize::NormalizedResponses;
use crate::weighting::RiskAlphas;

use std::collections::BTreeMap;

/// Intermediate state of the capital-flow computation.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowState {
    pub capital: CapitalVector,
    pub weights: CapitalVector,
    pub adjusted: CapitalVector,
    pub transfer: CapitalMatrix,
    pub barrier: CapitalMatrix,
    pub effective: CapitalMatrix,
    /// Inflow per target domain.
    pub flow: CapitalVector,
    pub magnitude: f64,
}

impl FlowState {
    pub fn compute(
        capital: CapitalVector,
        weights: CapitalVector,
        transfer: CapitalMatrix,
        barrier: CapitalMatrix,
    ) -> Self {
        let adjusted = capital.component_mul(&weights);
        let effective = effective_transfer(&transfer, &barrier);
        let flow = (adjusted.transpose() * effective).transpose();
        let magnitude = flow.iter().map(|v| v.abs()).sum();
        Self {
            capital,
            weights,
            adjusted,
            transfer,
            barrier,
            effective,
            flow,
            magnitude,
        }
    }
}

/// `T ⊙ (1 − B)`.
pub fn effective_transfer(transfer: &CapitalMatrix, barrier: &CapitalMatrix) -> CapitalMatrix {
    transfer.zip_map(barrier, |t, b| t * (1.0 - b))
}

/// Risk components, coefficients, composite V and the damping λ.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskProfile {
    pub components: BTreeMap<RiskComponent, f64>,
    pub alphas: RiskAlphas,
    pub v: f64,
    pub lambda: f64,
}

impl RiskProfile {
    /// Components absent from the answers contribute 0.
    pub fn compute(normed: &NormalizedResponses, alphas: RiskAlphas, lambda: f64) -> Self {
        let mut components = BTreeMap::new();
        let mut v = 0.0;
        for component in RiskComponent::ALL {
            let value = normed.get(component.key()).copied().unwrap_or(0.0);
            components.insert(component, value);
            v += alphas.get(&component).copied().unwrap_or(0.0) * value;
        }
        Self {
            components,
            alphas,
            v,
            lambda,
        }
    }
}

/// `flow_magnitude − λ · V`.
pub fn composite_score(flow_magnitude: f64, risk: &RiskProfile) -> f64 {
    flow_magnitude - risk.lambda * risk.v
}
