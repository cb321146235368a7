use save_model::capital::{compute_capital_vector, compute_transfer_barrier, BARRIER_TABLE, TRANSFER_TABLE};
use save_model::domain::CapitalDomain::{self, *};
use save_model::flow::effective_transfer;
use save_model::normalize::NormalizedResponses;

fn normed(pairs: &[(&str, f64)]) -> NormalizedResponses {
    pairs.iter().map(|&(k, v)| (k.to_string(), v)).collect()
}

fn cell(a: CapitalDomain, b: CapitalDomain) -> (usize, usize) {
    (a.index(), b.index())
}

#[test]
fn capital_vector_is_mean_of_stock_items() {
    let cvec = compute_capital_vector(&normed(&[
        ("S_stock_network", 1.0),
        ("S_stock_trust", 0.5),
        ("H_stock_skills", 0.4),
        ("H_to_E_pitch", 1.0),
        ("X_stock_other", 1.0),
    ]));
    assert_eq!(cvec[Social.index()], 0.75);
    assert_eq!(cvec[Human.index()], 0.4);
    assert_eq!(cvec[Cultural.index()], 0.0);
    assert_eq!(cvec[Economic.index()], 0.0);
    assert_eq!(cvec[Institutional.index()], 0.0);
}

#[test]
fn transfer_cells_average_shared_keys() {
    let (t, b) = compute_transfer_barrier(&normed(&[
        ("C_to_S_storytelling", 0.2),
        ("C_to_S_crossdiscipline", 0.4),
        ("C_to_S_visibility", 0.9),
        ("I_to_C_access", 0.6),
    ]));
    assert!((t[cell(Cultural, Social)] - 0.5).abs() < 1e-12);
    assert_eq!(t[cell(Institutional, Cultural)], 0.6);
    assert_eq!(t[cell(Social, Economic)], 0.0);
    assert!(b.iter().all(|&x| x == 0.0));
}

#[test]
fn barrier_severity_is_shared_and_maxed() {
    let (_, b) = compute_transfer_barrier(&normed(&[
        ("B_market_gatekeeping", 0.4),
        ("B_CE_gatekeeping", 0.9),
        ("B_discrimination_exclusion", 0.6),
    ]));
    // C->E: max(market 0.4, CE 0.9)
    assert_eq!(b[cell(Cultural, Economic)], 0.9);
    // S->E: max(market 0.4, discrimination 0.6)
    assert_eq!(b[cell(Social, Economic)], 0.6);
    // I->S only from discrimination
    assert_eq!(b[cell(Institutional, Social)], 0.6);
    assert_eq!(b[cell(Economic, Institutional)], 0.0);
}

#[test]
fn institutional_complexity_touches_every_institutional_edge() {
    let (_, b) = compute_transfer_barrier(&normed(&[("B_institutional_complexity", 0.7)]));
    for d in CapitalDomain::ALL {
        if d == Institutional {
            continue;
        }
        assert_eq!(b[cell(Institutional, d)], 0.7);
        assert_eq!(b[cell(d, Institutional)], 0.7);
    }
    assert_eq!(b[cell(Social, Economic)], 0.0);
}

#[test]
fn matrices_stay_in_unit_interval_and_t_eff_never_exceeds_t() {
    let mut pairs: Vec<(&str, f64)> = Vec::new();
    for (i, &(key, _, _)) in TRANSFER_TABLE.iter().enumerate() {
        pairs.push((key, (i % 6) as f64 / 5.0));
    }
    for (i, &(key, _)) in BARRIER_TABLE.iter().enumerate() {
        pairs.push((key, (i + 1) as f64 / 6.0));
    }
    let (t, b) = compute_transfer_barrier(&normed(&pairs));
    let t_eff = effective_transfer(&t, &b);
    for i in 0..5 {
        for j in 0..5 {
            for m in [&t, &b, &t_eff] {
                assert!((0.0..=1.0).contains(&m[(i, j)]));
            }
            assert!(t_eff[(i, j)] <= t[(i, j)]);
        }
    }
}
