//! Narrative archetypes: declarative threshold rules over the capital vector
//! and risk components, loaded from a JSON rule file.
//!
//! Rule file shape:
//!
//! ```json
//! {"archetypes": [{
//!   "id": "hidden_creator",
//!   "label": {"en": "...", "el": "..."},
//!   "when": {
//!     "capital_vector": {"C": {"gte": 0.6}, "E": {"lte": 0.4}},
//!     "risk_components": {"R_precarity": {"gte": 0.5}}
//!   },
//!   "signals": {
//!     "opportunity": [{"code": "...", "en": "...", "el": "..."}],
//!     "risk": [...],
//!     "actions": [...]
//!   }
//! }]}
//! ```
//!
//! File order is match priority: the first matching archetype is primary.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::{Arc, OnceLock, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::diagnosis::Diagnosis;
use crate::domain::{CapitalDomain, RiskComponent};
use crate::error::ArchetypeError;

/// Rule set shipped with the crate.
const BUILTIN_RULES: &str = include_str!("../data/profile_archetypes.json");

/// Language used when a requested translation is missing.
pub const FALLBACK_LANG: &str = "en";

// ---------------------------------------------------------------------
//  Rule data
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArchetypeFile {
    #[serde(default)]
    pub archetypes: Vec<Archetype>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Archetype {
    pub id: String,
    #[serde(default)]
    pub label: LocalizedText,
    #[serde(default)]
    pub when: Conditions,
    #[serde(default)]
    pub signals: Signals,
}

/// Per-language strings; a null translation counts as missing.
pub type Translations = BTreeMap<String, Option<String>>;

/// Either a plain string or a per-language map.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocalizedText {
    Plain(String),
    ByLang(Translations),
}

impl Default for LocalizedText {
    fn default() -> Self {
        Self::ByLang(BTreeMap::new())
    }
}

impl LocalizedText {
    /// Text in `lang`, else English, else empty.
    pub fn resolve(&self, lang: &str) -> String {
        match self {
            Self::Plain(s) => s.clone(),
            Self::ByLang(map) => resolve_lang(map, lang),
        }
    }
}

fn resolve_lang(map: &Translations, lang: &str) -> String {
    [lang, FALLBACK_LANG]
        .iter()
        .filter_map(|l| map.get(*l).and_then(Option::as_deref))
        .find(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_default()
}

/// Conditions keyed by capital-domain symbol or risk-component key.
/// An absent key is unconstrained.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conditions {
    #[serde(default)]
    pub capital_vector: BTreeMap<String, Threshold>,
    #[serde(default)]
    pub risk_components: BTreeMap<String, Threshold>,
}

/// Inclusive bounds; either may be omitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gte: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lte: Option<f64>,
}

impl Threshold {
    pub fn between(gte: f64, lte: f64) -> Self {
        Self {
            gte: Some(gte),
            lte: Some(lte),
        }
    }

    /// A `None` value (null in the results) never satisfies a condition.
    pub fn check(&self, value: Option<f64>) -> bool {
        let Some(value) = value else {
            return false;
        };
        if let Some(gte) = self.gte {
            if !(value >= gte) {
                return false;
            }
        }
        if let Some(lte) = self.lte {
            if !(value <= lte) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Signals {
    #[serde(default)]
    pub opportunity: Vec<Signal>,
    #[serde(default)]
    pub risk: Vec<Signal>,
    #[serde(default)]
    pub actions: Vec<Signal>,
}

/// A coded signal with one text per language (`{"code": .., "en": .., "el": ..}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(flatten)]
    pub text: Translations,
}

impl Signal {
    pub fn text(&self, lang: &str) -> String {
        resolve_lang(&self.text, lang)
    }
}

// ---------------------------------------------------------------------
//  Matching
// ---------------------------------------------------------------------

/// Values the rules are evaluated against.
///
/// A key missing from a map reads as 0.0; a key present with a null or
/// non-numeric value reads as `None` and fails every condition on it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchInput {
    pub capital_vector: BTreeMap<String, Option<f64>>,
    pub risk_components: BTreeMap<String, Option<f64>>,
}

impl MatchInput {
    pub fn from_diagnosis(diagnosis: &Diagnosis) -> Self {
        Self {
            capital_vector: diagnosis
                .capital_vector
                .iter()
                .map(|(d, &v)| (d.symbol().to_string(), Some(v)))
                .collect(),
            risk_components: diagnosis
                .risk
                .components
                .iter()
                .map(|(c, &v)| (c.key().to_string(), Some(v)))
                .collect(),
        }
    }

    /// Read a stored `results` map; absent sections read as empty.
    pub fn from_results(results: &Value) -> Self {
        let numbers = |v: Option<&Value>| -> BTreeMap<String, Option<f64>> {
            v.and_then(Value::as_object)
                .map(|m| m.iter().map(|(k, v)| (k.clone(), v.as_f64())).collect())
                .unwrap_or_default()
        };
        Self {
            capital_vector: numbers(results.get("capital_vector")),
            risk_components: numbers(results.get("risk").and_then(|r| r.get("components"))),
        }
    }

    fn lookup(map: &BTreeMap<String, Option<f64>>, key: &str) -> Option<f64> {
        match map.get(key) {
            None => Some(0.0),
            Some(v) => *v,
        }
    }
}

impl Archetype {
    /// All declared conditions must hold.
    pub fn matches(&self, input: &MatchInput) -> bool {
        self.when
            .capital_vector
            .iter()
            .all(|(k, rule)| rule.check(MatchInput::lookup(&input.capital_vector, k)))
            && self
                .when
                .risk_components
                .iter()
                .all(|(k, rule)| rule.check(MatchInput::lookup(&input.risk_components, k)))
    }
}

// ---------------------------------------------------------------------
//  Library
// ---------------------------------------------------------------------

/// Validated, immutable archetype rule set.
#[derive(Debug, Clone)]
pub struct ArchetypeLibrary {
    archetypes: Vec<Archetype>,
    digest: String,
}

impl ArchetypeLibrary {
    /// The rule set embedded in the crate.
    pub fn builtin() -> Result<Self, ArchetypeError> {
        Self::from_json_str(BUILTIN_RULES)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ArchetypeError> {
        let file: ArchetypeFile = serde_json::from_str(raw)?;
        let mut library = Self::from_archetypes(file.archetypes)?;
        library.digest = blake3::hash(raw.as_bytes()).to_hex().to_string();
        Ok(library)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ArchetypeError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ArchetypeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Build from in-memory rules (digest covers their canonical JSON).
    pub fn from_archetypes(archetypes: Vec<Archetype>) -> Result<Self, ArchetypeError> {
        validate_archetypes(&archetypes)?;
        let canonical = serde_json::to_vec(&archetypes)?;
        Ok(Self {
            archetypes,
            digest: blake3::hash(&canonical).to_hex().to_string(),
        })
    }

    pub fn archetypes(&self) -> &[Archetype] {
        &self.archetypes
    }

    pub fn get(&self, id: &str) -> Option<&Archetype> {
        self.archetypes.iter().find(|a| a.id == id)
    }

    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }

    /// blake3 of the rule source, for provenance of a profile.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Every matching archetype, in file order.
    pub fn match_archetypes(&self, input: &MatchInput) -> Vec<&Archetype> {
        self.archetypes.iter().filter(|a| a.matches(input)).collect()
    }

    pub fn primary(&self, input: &MatchInput) -> Option<&Archetype> {
        self.archetypes.iter().find(|a| a.matches(input))
    }
}

fn validate_archetypes(archetypes: &[Archetype]) -> Result<(), ArchetypeError> {
    let mut seen = HashSet::new();
    for (idx, a) in archetypes.iter().enumerate() {
        if a.id.trim().is_empty() {
            return Err(ArchetypeError::invalid(format!("archetype #{idx} has an empty id")));
        }
        if !seen.insert(a.id.as_str()) {
            return Err(ArchetypeError::invalid(format!("duplicate archetype id '{}'", a.id)));
        }
        let rules = a
            .when
            .capital_vector
            .iter()
            .chain(a.when.risk_components.iter());
        for (key, rule) in rules {
            let finite = rule.gte.map_or(true, f64::is_finite) && rule.lte.map_or(true, f64::is_finite);
            if !finite {
                return Err(ArchetypeError::invalid(format!(
                    "archetype '{}': bound on '{key}' must be finite",
                    a.id
                )));
            }
        }
        // Unknown keys still evaluate (missing values read as 0.0), so only warn.
        for key in a.when.capital_vector.keys() {
            if CapitalDomain::from_symbol(key).is_none() {
                warn!(archetype = %a.id, key = %key, "condition on unknown capital domain");
            }
        }
        for key in a.when.risk_components.keys() {
            if RiskComponent::from_key(key).is_none() {
                warn!(archetype = %a.id, key = %key, "condition on unknown risk component");
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------
//  Registry
// ---------------------------------------------------------------------

/// Holder of the active rule set. Readers take a cheap [`Arc`] snapshot;
/// `reload` swaps in a new set without disturbing snapshots in use.
#[derive(Debug)]
pub struct ArchetypeRegistry {
    current: RwLock<Arc<ArchetypeLibrary>>,
}

impl ArchetypeRegistry {
    pub fn new(library: ArchetypeLibrary) -> Self {
        Self {
            current: RwLock::new(Arc::new(library)),
        }
    }

    pub fn snapshot(&self) -> Arc<ArchetypeLibrary> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Replace the active rule set; returns the previous one.
    pub fn reload(&self, library: ArchetypeLibrary) -> Arc<ArchetypeLibrary> {
        let next = Arc::new(library);
        info!(archetypes = next.len(), digest = %next.digest(), "archetype library reloaded");
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::replace(&mut *guard, next)
    }

    /// Reload from a rule file. On error the active set is left unchanged.
    pub fn reload_from_path(&self, path: impl AsRef<Path>) -> Result<Arc<ArchetypeLibrary>, ArchetypeError> {
        let library = ArchetypeLibrary::from_path(path)?;
        Ok(self.reload(library))
    }
}

static GLOBAL_REGISTRY: OnceLock<ArchetypeRegistry> = OnceLock::new();

/// Install the process-wide registry. Call once at startup.
pub fn init_global(library: ArchetypeLibrary) -> Result<&'static ArchetypeRegistry, ArchetypeError> {
    let (count, digest) = (library.len(), library.digest().to_string());
    let mut installed = false;
    let registry = GLOBAL_REGISTRY.get_or_init(|| {
        installed = true;
        ArchetypeRegistry::new(library)
    });
    if !installed {
        return Err(ArchetypeError::AlreadyInitialized);
    }
    info!(archetypes = count, digest = %digest, "archetype library installed");
    Ok(registry)
}

/// The process-wide registry, if [`init_global`] has run.
pub fn global() -> Option<&'static ArchetypeRegistry> {
    GLOBAL_REGISTRY.get()
}
