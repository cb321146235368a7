#![forbid(unsafe_code)]

//! # save-model
//!
//! Capital-flow diagnosis from survey answers.
//!
//! Raw answers are normalized onto [0, 1] and folded into five capital
//! domains (Social, Human, Cultural, Economic, Institutional). Transfer
//! answers form a directed domain-to-domain matrix T, barrier answers a
//! matrix B that dampens it. Weighted capital pushed through `T ⊙ (1 − B)`
//! gives a flow magnitude; subtracting the damped risk composite yields the
//! score. The weakest high-value transfer paths are ranked as bottlenecks,
//! and a declarative archetype rule set turns stored results into a
//! localized profile.
//!
//! Everything is synchronous and side-effect free; one [`Engine`] can be
//! shared across threads.

pub mod archetype;
pub mod bottleneck;
pub mod capital;
pub mod config;
pub mod diagnosis;
pub mod domain;
pub mod error;
pub mod flow;
pub mod normalize;
pub mod profile;
pub mod record;
pub mod weighting;

pub use archetype::{ArchetypeLibrary, ArchetypeRegistry, MatchInput, Threshold};
pub use bottleneck::Bottleneck;
pub use config::EngineConfig;
pub use diagnosis::{diagnose, DiagnoseRequest, Diagnosis, Engine, Evaluation};
pub use domain::{CapitalDomain, CapitalMatrix, CapitalVector, RiskComponent};
pub use error::{ArchetypeError, ConfigError, DiagnoseError};
pub use normalize::{normalize_responses, NormalizedResponses, RawResponses};
pub use profile::{build_profile, render_profile_markdown, Profile};
pub use record::{AssessmentCreateRequest, AssessmentRecord};
pub use weighting::{Meta, SectorWeightingPolicy, WeightingPolicy};
