use save_model::diagnosis::Engine;
use save_model::error::DiagnoseError;
use save_model::record::{AssessmentCreateRequest, AssessmentRecord};
use save_model::ArchetypeLibrary;
use serde_json::json;
use uuid::Uuid;

fn request(v: serde_json::Value) -> AssessmentCreateRequest {
    serde_json::from_value(v).unwrap()
}

#[test]
fn create_splits_answers_from_results() {
    let engine = Engine::default();
    let record = AssessmentRecord::create(
        &engine,
        request(json!({
            "profile_id": "respondent-7",
            "meta_public": {"sector": "creative industries"},
            "responses": {"C_stock_a": 5, "C_to_E_monetize": 2, "R_burnout": 4},
        })),
    )
    .unwrap();

    assert!(Uuid::parse_str(&record.assessment_id).is_ok());
    assert_eq!(record.profile_id, "respondent-7");
    assert!(record.consent_research);
    assert_eq!(record.meta_public["sector"], json!("creative industries"));

    assert_eq!(record.responses_norm["C_stock_a"], json!(1.0));
    assert_eq!(record.responses_norm["R_burnout"], json!(0.8));
    assert!(record.results.get("responses_norm").is_none());
    assert_eq!(record.results["capital_vector"]["C"], json!(1.0));
    assert_eq!(record.results["weights"]["C"], json!(1.2));
    assert_eq!(record.results["bottlenecks"][0]["from"], json!("C"));

    let keys: Vec<&String> = record.results.as_object().unwrap().keys().collect();
    assert_eq!(keys, ["save_score", "capital_vector", "weights", "risk", "bottlenecks"]);
    let domains: Vec<&String> = record.results["capital_vector"].as_object().unwrap().keys().collect();
    assert_eq!(domains, ["S", "H", "C", "E", "I"]);
}

#[test]
fn blank_profile_id_gets_a_fresh_one() {
    let engine = Engine::default();
    let a = AssessmentRecord::create(
        &engine,
        request(json!({"profile_id": "  ", "consent_research": false, "responses": {}})),
    )
    .unwrap();
    let b = AssessmentRecord::create(&engine, request(json!({"responses": {}}))).unwrap();

    assert!(Uuid::parse_str(&a.profile_id).is_ok());
    assert!(!a.consent_research);
    assert_ne!(a.profile_id, b.profile_id);
    assert_ne!(a.assessment_id, b.assessment_id);
    assert_eq!(a.results["save_score"], json!(0.0));
}

#[test]
fn missing_responses_fails_creation() {
    let err = AssessmentRecord::create(&Engine::default(), request(json!({"meta": {}}))).unwrap_err();
    assert!(matches!(err, DiagnoseError::MissingResponses));
}

#[test]
fn stored_records_parse_leniently_and_profile() {
    let record: AssessmentRecord = serde_json::from_value(json!({
        "assessment_id": "a-9",
        "profile_id": "p-9",
        "results": {"capital_vector": {"S": 0.8, "E": 0.2}},
    }))
    .unwrap();
    assert!(record.consent_research);
    assert!(record.meta_public.is_empty());

    let lib = ArchetypeLibrary::builtin().unwrap();
    let profile = record.profile("en", &lib);
    assert_eq!(profile.data.assessment_id, "a-9");
    assert_eq!(profile.data.primary_archetype.as_deref(), Some("connected_undervalued"));
}
