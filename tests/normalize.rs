use save_model::normalize::{
    norm_0_5, normalize, normalize_responses, normalize_value, RawResponses, SkipReason,
    LEGACY_FUNDING_KEY,
};
use serde_json::{json, Value};

fn raw(v: Value) -> RawResponses {
    v.as_object().cloned().unwrap()
}

#[test]
fn numeric_scale_is_clamped_and_monotonic() {
    assert_eq!(norm_0_5(0.0), 0.0);
    assert_eq!(norm_0_5(5.0), 1.0);
    assert_eq!(norm_0_5(-2.0), 0.0);
    assert_eq!(norm_0_5(9.0), 1.0);

    let mut prev = -1.0;
    for step in 0..=50 {
        let x = step as f64 * 0.1;
        let y = normalize_value("S_stock_x", &json!(x)).unwrap();
        assert_eq!(y, x.clamp(0.0, 5.0) / 5.0);
        assert!(y >= prev);
        prev = y;
    }
}

#[test]
fn reverse_keys_invert() {
    for x in [0.0, 1.0, 2.5, 4.0, 5.0] {
        let plain = normalize_value("R_precarity", &json!(x)).unwrap();
        assert_eq!(normalize_value("R_support_access", &json!(x)).unwrap(), 1.0 - plain);
        assert_eq!(normalize_value("E_stock_debt_limits", &json!(x)).unwrap(), 1.0 - plain);
    }
}

#[test]
fn numeric_strings_and_yes_no_tokens() {
    let normed = normalize_responses(&raw(json!({
        "S_stock_a": "5",
        "S_stock_b": " 2.5 ",
        "E_stock_buffer": "Ναι",
        "E_stock_savings": "no / όχι",
        "R_support_access": "yes",
    })));
    assert_eq!(normed["S_stock_a"], 1.0);
    assert_eq!(normed["S_stock_b"], 0.5);
    assert_eq!(normed["E_stock_buffer"], 1.0);
    assert_eq!(normed["E_stock_savings"], 0.0);
    // yes = best support = lowest risk
    assert_eq!(normed["R_support_access"], 0.0);
}

#[test]
fn legacy_funding_categories() {
    let normed = normalize_responses(&raw(json!({
        LEGACY_FUNDING_KEY: "Sometimes",
    })));
    assert_eq!(normed[LEGACY_FUNDING_KEY], 0.6);

    for token in ["Not eligible/NA", "sometimes", "whatever"] {
        let out = normalize(&raw(json!({ LEGACY_FUNDING_KEY: token })));
        assert!(out.responses.is_empty(), "{token}");
        assert_eq!(
            out.skipped,
            vec![(LEGACY_FUNDING_KEY.to_string(), SkipReason::UnmappedCategory)]
        );
    }
}

// Garbled answers are dropped, never fatal; keep it that way.
#[test]
fn unparseable_answers_are_skipped_silently() {
    let out = normalize(&raw(json!({
        "S_stock_a": null,
        "S_stock_b": "",
        "S_stock_c": "   ",
        "S_stock_d": "lots",
        "S_stock_e": [1, 2],
        "S_stock_f": {"v": 3},
        "S_stock_g": 4,
    })));
    assert_eq!(out.responses.len(), 1);
    assert_eq!(out.responses["S_stock_g"], 0.8);

    let reasons: Vec<_> = out.skipped.iter().map(|(k, r)| (k.as_str(), *r)).collect();
    assert_eq!(
        reasons,
        vec![
            ("S_stock_a", SkipReason::Empty),
            ("S_stock_b", SkipReason::Empty),
            ("S_stock_c", SkipReason::NotNumeric),
            ("S_stock_d", SkipReason::NotNumeric),
            ("S_stock_e", SkipReason::NotNumeric),
            ("S_stock_f", SkipReason::NotNumeric),
        ]
    );
}

#[test]
fn nan_answers_read_as_the_top_of_the_scale() {
    let normed = normalize_responses(&raw(json!({
        "S_stock_a": "nan",
        "R_support_access": "NaN",
    })));
    assert_eq!(normed["S_stock_a"], 1.0);
    assert_eq!(normed["R_support_access"], 0.0);
}

#[test]
fn outputs_stay_in_unit_interval() {
    let normed = normalize_responses(&raw(json!({
        "a": -100, "b": 1e9, "c": "7", "d": "-3", "R_support_access": 12, "e": true, "f": "nan",
    })));
    assert_eq!(normed.len(), 7);
    assert!(normed.values().all(|v| (0.0..=1.0).contains(v)));
}
