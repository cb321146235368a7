//! Capital model: stock vector, transfer matrix T and barrier matrix B.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

use crate::domain::{CapitalDomain, CapitalMatrix, CapitalVector, RiskComponent};
use crate::normalize::NormalizedResponses;

use crate::domain::CapitalDomain::{
    Cultural as C, Economic as E, Human as H, Institutional as I, Social as S,
};

/// Transfer items: response key → (source, target). Several keys may share a cell.
pub const TRANSFER_TABLE: &[(&str, CapitalDomain, CapitalDomain)] = &[
    ("S_to_E_opps", S, E),
    ("S_to_H_mentoring", S, H),
    ("S_to_I_gatekeeper", S, I),
    ("H_to_E_pitch", H, E),
    ("H_to_E_negotiate", H, E),
    ("H_to_S_teamwork", H, S),
    ("H_to_I_documentation", H, I),
    ("C_to_S_storytelling", C, S),
    ("C_to_S_crossdiscipline", C, S),
    ("C_to_S_visibility", C, S),
    ("C_to_E_monetize", C, E),
    ("C_to_E_rights", C, E),
    ("C_to_E_adapt", C, E),
    ("E_to_S_invest_network", E, S),
    ("E_to_H_invest_learning", E, H),
    ("E_to_I_tax_admin_capacity", E, I),
    ("I_to_E_funding", I, E),
    ("I_to_S_participation", I, S),
    ("I_to_C_validation", I, C),
    ("I_to_C_access", I, C),
];

/// Barrier items: response key → every (source, target) it dampens.
pub const BARRIER_TABLE: &[(&str, &[(CapitalDomain, CapitalDomain)])] = &[
    (
        "B_institutional_complexity",
        &[(I, E), (I, S), (I, C), (I, H), (S, I), (H, I), (C, I), (E, I)],
    ),
    ("B_market_gatekeeping", &[(C, E), (S, E), (H, E)]),
    ("B_digital_divide", &[(S, I), (I, S), (H, E), (I, E), (E, I)]),
    ("B_discrimination_exclusion", &[(S, E), (H, E), (I, E), (I, S)]),
    ("B_CE_gatekeeping", &[(C, E)]),
];

static TRANSFER_LOOKUP: Lazy<HashMap<&'static str, (CapitalDomain, CapitalDomain)>> =
    Lazy::new(|| TRANSFER_TABLE.iter().map(|&(k, a, b)| (k, (a, b))).collect());

static BARRIER_KEYS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| BARRIER_TABLE.iter().map(|&(k, _)| k).collect());

/// Cell a transfer key feeds, if any.
pub fn transfer_pair(key: &str) -> Option<(CapitalDomain, CapitalDomain)> {
    TRANSFER_LOOKUP.get(key).copied()
}

/// Whether a response key feeds any part of the model.
pub fn is_model_key(key: &str) -> bool {
    CapitalDomain::ALL
        .iter()
        .any(|d| key.starts_with(d.stock_prefix()))
        || TRANSFER_LOOKUP.contains_key(key)
        || BARRIER_KEYS.contains(key)
        || RiskComponent::from_key(key).is_some()
}

/// Mean of each domain's stock answers; 0.0 for a domain with none.
pub fn compute_capital_vector(normed: &NormalizedResponses) -> CapitalVector {
    let mut cvec = CapitalVector::zeros();
    for domain in CapitalDomain::ALL {
        let prefix = domain.stock_prefix();
        let (sum, n) = normed
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .fold((0.0, 0usize), |(s, n), (_, &v)| (s + v, n + 1));
        if n > 0 {
            cvec[domain.index()] = sum / n as f64;
        }
    }
    cvec
}

/// Build T (mean per cell) and B (max per cell) from normalized answers.
pub fn compute_transfer_barrier(normed: &NormalizedResponses) -> (CapitalMatrix, CapitalMatrix) {
    let mut sums = CapitalMatrix::zeros();
    let mut counts = [[0usize; 5]; 5];
    for &(key, a, b) in TRANSFER_TABLE {
        if let Some(&v) = normed.get(key) {
            let (i, j) = (a.index(), b.index());
            sums[(i, j)] += v;
            counts[i][j] += 1;
        }
    }
    let mut t = CapitalMatrix::zeros();
    for i in 0..5 {
        for j in 0..5 {
            if counts[i][j] > 0 {
                t[(i, j)] = sums[(i, j)] / counts[i][j] as f64;
            }
        }
    }

    // A barrier's severity applies in full to every pair it affects.
    let mut b = CapitalMatrix::zeros();
    for &(key, affected) in BARRIER_TABLE {
        if let Some(&severity) = normed.get(key) {
            for &(src, dst) in affected {
                let cell = &mut b[(src.index(), dst.index())];
                *cell = cell.max(severity);
            }
        }
    }
    (t, b)
}
