//! Response normalization: raw answers of any shape onto a uniform [0, 1]
//! scale.
//!
//! The policy is permissive. Partial questionnaires are expected, so an
//! answer that cannot be read is dropped from the output instead of failing
//! the whole diagnosis. Dropped keys are reported in [`Normalization::skipped`]
//! for logging, never as errors.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

/// Raw answers keyed by response key.
pub type RawResponses = Map<String, Value>;

/// Normalized answers in [0, 1]. Unanswered keys are absent, not zero.
pub type NormalizedResponses = BTreeMap<String, f64>;

/// Upper end of the answer scale (0 minimum … 5 very good).
pub const SCALE_MAX: f64 = 5.0;

/// Field that still accepts legacy categorical answers.
pub const LEGACY_FUNDING_KEY: &str = "I_to_E_funding";

/// Higher answer means a better state, but the model reads a risk.
pub const REVERSE_KEYS: &[&str] = &["R_support_access"];

/// Stock items where a higher answer means a worse condition.
pub const STOCK_REVERSE_KEYS: &[&str] = &["E_stock_debt_limits"];

const YES_TOKENS: &[&str] = &["yes", "y", "nai", "ναι", "yes / ναι", "yes / ναi"];
const NO_TOKENS: &[&str] = &["no", "n", "oxi", "όχι", "οχι", "no / όχι", "no / οχι"];

/// Why an answer was left out of the normalized set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Null or empty string.
    Empty,
    /// Legacy categorical token with no numeric meaning.
    UnmappedCategory,
    /// Not coercible to a number.
    NotNumeric,
}

/// Output of [`normalize`].
#[derive(Debug, Clone, Default)]
pub struct Normalization {
    pub responses: NormalizedResponses,
    pub skipped: Vec<(String, SkipReason)>,
}

/// Clamp to the 0–5 scale and divide by 5. NaN reads as the top of the scale.
pub fn norm_0_5(x: f64) -> f64 {
    if x.is_nan() {
        return 1.0;
    }
    x.clamp(0.0, SCALE_MAX) / SCALE_MAX
}

/// Multilingual yes/no tokens onto the 0–5 scale (yes = 5, no = 0).
pub fn yes_no_score(raw: &str) -> Option<f64> {
    let token = raw.trim().to_lowercase();
    if YES_TOKENS.contains(&token.as_str()) {
        Some(SCALE_MAX)
    } else if NO_TOKENS.contains(&token.as_str()) {
        Some(0.0)
    } else {
        None
    }
}

/// Legacy categorical answers for the funding item. Exact, case-sensitive.
fn legacy_funding_score(raw: &str) -> Option<f64> {
    match raw {
        "Tried but failed" => Some(2.0),
        "Sometimes" => Some(3.0),
        "Often" => Some(4.0),
        // "Not eligible/NA" carries no signal either.
        _ => None,
    }
}

fn coerce_number(value: &Value) -> Option<f64> {
    let x = match value {
        Value::Number(n) => n.as_f64()?,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    Some(x)
}

fn is_reversed(key: &str) -> bool {
    REVERSE_KEYS.contains(&key) || STOCK_REVERSE_KEYS.contains(&key)
}

/// Normalize one answer.
pub fn normalize_value(key: &str, value: &Value) -> Result<f64, SkipReason> {
    let text = match value {
        Value::Null => return Err(SkipReason::Empty),
        Value::String(s) if s.is_empty() => return Err(SkipReason::Empty),
        Value::String(s) => Some(s.as_str()),
        _ => None,
    };

    let scaled = match text {
        Some(s) => match yes_no_score(s) {
            Some(score) => score,
            None if key == LEGACY_FUNDING_KEY => {
                // Legacy categories are already oriented; no inversion.
                return legacy_funding_score(s)
                    .map(norm_0_5)
                    .ok_or(SkipReason::UnmappedCategory);
            }
            None => coerce_number(value).ok_or(SkipReason::NotNumeric)?,
        },
        None => coerce_number(value).ok_or(SkipReason::NotNumeric)?,
    };

    let mut normalized = norm_0_5(scaled);
    if is_reversed(key) {
        normalized = 1.0 - normalized;
    }
    Ok(normalized)
}

/// Normalize every answer, recording what was dropped.
pub fn normalize(raw: &RawResponses) -> Normalization {
    let mut out = Normalization::default();
    for (key, value) in raw {
        match normalize_value(key, value) {
            Ok(v) => {
                out.responses.insert(key.clone(), v);
            }
            Err(reason) => out.skipped.push((key.clone(), reason)),
        }
    }
    out
}

pub fn normalize_responses(raw: &RawResponses) -> NormalizedResponses {
    normalize(raw).responses
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn yes_no_tokens_are_trimmed_and_case_insensitive() {
        assert_eq!(yes_no_score("  YES "), Some(5.0));
        assert_eq!(yes_no_score("ΝΑΙ"), Some(5.0));
        assert_eq!(yes_no_score("No / Όχι"), Some(0.0));
        assert_eq!(yes_no_score("maybe"), None);
    }

    #[test]
    fn legacy_funding_numbers_take_the_numeric_path() {
        assert_eq!(normalize_value(LEGACY_FUNDING_KEY, &json!(4)), Ok(0.8));
        assert_eq!(
            normalize_value(LEGACY_FUNDING_KEY, &json!("4")),
            Err(SkipReason::UnmappedCategory)
        );
        assert_eq!(normalize_value(LEGACY_FUNDING_KEY, &json!("yes")), Ok(1.0));
    }

    #[test]
    fn booleans_read_as_zero_or_one() {
        assert_eq!(normalize_value("S_stock_x", &json!(true)), Ok(0.2));
        assert_eq!(normalize_value("S_stock_x", &json!(false)), Ok(0.0));
    }

    #[test]
    fn non_finite_strings() {
        assert_eq!(normalize_value("S_stock_x", &json!("inf")), Ok(1.0));
        assert_eq!(normalize_value("S_stock_x", &json!("-inf")), Ok(0.0));
        assert_eq!(normalize_value("S_stock_x", &json!("NaN")), Ok(1.0));
        assert_eq!(normalize_value("S_stock_x", &json!(" nan ")), Ok(1.0));
        assert_eq!(normalize_value("R_support_access", &json!("nan")), Ok(0.0));
    }
}
