//! Capital domains, risk components, and the fixed-size vector/matrix types
//! indexed by them.
//!
//! Domain order is S, H, C, E, I everywhere: it fixes matrix rows (source)
//! and columns (target), the order of serialized maps, and the iteration
//! order used for deterministic bottleneck tie-breaking.

use std::collections::BTreeMap;
use std::fmt;

use nalgebra::{SMatrix, SVector};
use serde::{Deserialize, Serialize};

/// Number of capital domains.
pub const DOMAIN_COUNT: usize = 5;

/// Per-domain column vector (capital stocks, weights, adjusted capital).
pub type CapitalVector = SVector<f64, DOMAIN_COUNT>;

/// Directed domain-to-domain matrix: `m[(source, target)]`.
pub type CapitalMatrix = SMatrix<f64, DOMAIN_COUNT, DOMAIN_COUNT>;

/// Ordered domain → value map used in serialized results.
pub type DomainScores = BTreeMap<CapitalDomain, f64>;

/// One of the five capital domains tracked by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CapitalDomain {
    #[serde(rename = "S")]
    Social,
    #[serde(rename = "H")]
    Human,
    #[serde(rename = "C")]
    Cultural,
    #[serde(rename = "E")]
    Economic,
    #[serde(rename = "I")]
    Institutional,
}

impl CapitalDomain {
    pub const ALL: [CapitalDomain; DOMAIN_COUNT] = [
        CapitalDomain::Social,
        CapitalDomain::Human,
        CapitalDomain::Cultural,
        CapitalDomain::Economic,
        CapitalDomain::Institutional,
    ];

    /// Row/column index in every vector and matrix.
    pub fn index(self) -> usize {
        match self {
            CapitalDomain::Social => 0,
            CapitalDomain::Human => 1,
            CapitalDomain::Cultural => 2,
            CapitalDomain::Economic => 3,
            CapitalDomain::Institutional => 4,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CapitalDomain::Social => "S",
            CapitalDomain::Human => "H",
            CapitalDomain::Cultural => "C",
            CapitalDomain::Economic => "E",
            CapitalDomain::Institutional => "I",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.symbol() == symbol)
    }

    /// Response-key prefix of this domain's stock items, e.g. `S_stock_`.
    pub fn stock_prefix(self) -> &'static str {
        match self {
            CapitalDomain::Social => "S_stock_",
            CapitalDomain::Human => "H_stock_",
            CapitalDomain::Cultural => "C_stock_",
            CapitalDomain::Economic => "E_stock_",
            CapitalDomain::Institutional => "I_stock_",
        }
    }
}

impl fmt::Display for CapitalDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Named risk components read straight from normalized responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskComponent {
    #[serde(rename = "R_precarity")]
    Precarity,
    #[serde(rename = "R_burnout")]
    Burnout,
    #[serde(rename = "R_support_access")]
    SupportAccess,
    #[serde(rename = "R_shock_exposure")]
    ShockExposure,
}

impl RiskComponent {
    pub const ALL: [RiskComponent; 4] = [
        RiskComponent::Precarity,
        RiskComponent::Burnout,
        RiskComponent::SupportAccess,
        RiskComponent::ShockExposure,
    ];

    /// Response key (and serialized name) of this component.
    pub fn key(self) -> &'static str {
        match self {
            RiskComponent::Precarity => "R_precarity",
            RiskComponent::Burnout => "R_burnout",
            RiskComponent::SupportAccess => "R_support_access",
            RiskComponent::ShockExposure => "R_shock_exposure",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }
}

impl fmt::Display for RiskComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Build an ordered domain map from a vector.
pub fn domain_scores(v: &CapitalVector, transform: impl Fn(f64) -> f64) -> DomainScores {
    CapitalDomain::ALL
        .into_iter()
        .map(|d| (d, transform(v[d.index()])))
        .collect()
}

/// Round to 6 decimal places for output.
///
/// Rounds the exact binary value of `x` (half to even) through decimal
/// formatting; scaling by 1e6 first would round twice.
pub fn round6(x: f64) -> f64 {
    format!("{x:.6}").parse().unwrap_or(x)
}
