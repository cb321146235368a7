//! Bottleneck ranking: strong source capital that fails to convert.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::domain::{CapitalDomain, CapitalMatrix, CapitalVector};

/// Number of bottlenecks kept after ranking.
pub const MAX_BOTTLENECKS: usize = 5;

/// One ranked transfer path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bottleneck {
    pub from: CapitalDomain,
    pub to: CapitalDomain,
    pub t: f64,
    pub barrier: f64,
    pub t_eff: f64,
    /// `adjusted[from] * (1 - t_eff)`.
    pub priority: f64,
}

/// Rank every off-diagonal pair with `T > 0` by descending priority.
///
/// The sort is stable over source-major, target-minor domain order, so ties
/// keep that order.
pub fn rank_bottlenecks(
    adjusted: &CapitalVector,
    transfer: &CapitalMatrix,
    barrier: &CapitalMatrix,
    effective: &CapitalMatrix,
) -> Vec<Bottleneck> {
    let mut out = Vec::new();
    for from in CapitalDomain::ALL {
        for to in CapitalDomain::ALL {
            let (i, j) = (from.index(), to.index());
            if i == j || transfer[(i, j)] <= 0.0 {
                continue;
            }
            out.push(Bottleneck {
                from,
                to,
                t: transfer[(i, j)],
                barrier: barrier[(i, j)],
                t_eff: effective[(i, j)],
                priority: adjusted[i] * (1.0 - effective[(i, j)]),
            });
        }
    }
    out.sort_by(|a, b| {
        b.priority
            .partial_cmp(&a.priority)
            .unwrap_or(Ordering::Equal)
    });
    out.truncate(MAX_BOTTLENECKS);
    out
}
