//! Profile assembly: a stored `results` map plus matched archetypes turned
//! into a localized, UI-ready profile.
//!
//! The diagnosis is never recomputed here. Missing pieces of `results`
//! degrade to empty cards and null chart values.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::archetype::{Archetype, ArchetypeLibrary, MatchInput, Signal};
use crate::domain::CapitalDomain;
use crate::weighting::Meta;

pub const MAX_OPPORTUNITY_CARDS: usize = 4;
pub const MAX_RISK_CARDS: usize = 4;
pub const MAX_ACTION_CARDS: usize = 6;
pub const MAX_BOTTLENECK_CARDS: usize = 5;

/// Paths named in the summary sentence.
const SUMMARY_PATHS: usize = 3;

/// Built-in text templates. Anything other than Greek renders in English.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    En,
    El,
}

impl Locale {
    pub fn from_tag(lang: &str) -> Self {
        if lang == "el" {
            Locale::El
        } else {
            Locale::En
        }
    }

    fn generic_headline(self) -> &'static str {
        match self {
            Locale::En => "SAVE Profile (generic)",
            Locale::El => "Προφίλ SAVE (γενικό)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub ui: ProfileUi,
    pub data: ProfileData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileUi {
    pub headline: String,
    pub summary: String,
    pub cards: ProfileCards,
    pub charts: ProfileCharts,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileCards {
    pub opportunities: Vec<SignalCard>,
    pub risks: Vec<SignalCard>,
    pub actions: Vec<SignalCard>,
    pub bottlenecks: Vec<BottleneckCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalCard {
    pub code: Option<String>,
    pub text: String,
}

/// Bottleneck echoed from stored results; fields missing there stay null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BottleneckCard {
    #[serde(rename = "type")]
    pub kind: String,
    pub from: Value,
    pub to: Value,
    pub t: Value,
    pub barrier: Value,
    pub t_eff: Value,
    pub priority: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileCharts {
    pub radar: RadarChart,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarChart {
    pub labels: Vec<String>,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileData {
    pub assessment_id: String,
    pub profile_id: String,
    pub meta_public: Meta,
    pub primary_archetype: Option<String>,
    pub matched_archetypes: Vec<String>,
    pub capital_vector: Value,
    pub risk: Value,
    pub bottlenecks: Vec<Value>,
}

fn section(results: &Value, key: &str) -> Value {
    match results.get(key) {
        Some(v) if !v.is_null() => v.clone(),
        _ => Value::Object(Default::default()),
    }
}

fn signal_cards(signals: &[Signal], cap: usize, lang: &str) -> Vec<SignalCard> {
    signals
        .iter()
        .take(cap)
        .map(|s| SignalCard {
            code: s.code.clone(),
            text: s.text(lang),
        })
        .collect()
}

fn bottleneck_card(b: &Value) -> BottleneckCard {
    let field = |k: &str| b.get(k).cloned().unwrap_or(Value::Null);
    BottleneckCard {
        kind: "bottleneck".to_string(),
        from: field("from"),
        to: field("to"),
        t: field("t"),
        barrier: field("barrier"),
        t_eff: field("t_eff"),
        priority: field("priority"),
    }
}

fn display_value(v: Option<&Value>) -> String {
    match v {
        None | Some(Value::Null) => "n/a".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn capitals_text(cv: &Value) -> String {
    CapitalDomain::ALL
        .iter()
        .map(|d| format!("{}={}", d.symbol(), display_value(cv.get(d.symbol()))))
        .collect::<Vec<_>>()
        .join(", ")
}

fn paths_text(bottlenecks: &[Value]) -> String {
    let paths: Vec<String> = bottlenecks
        .iter()
        .take(SUMMARY_PATHS)
        .map(|b| format!("{}→{}", display_value(b.get("from")), display_value(b.get("to"))))
        .collect();
    if paths.is_empty() {
        "-".to_string()
    } else {
        paths.join(", ")
    }
}

/// The primary archetype's label (empty if it has none), else the generic title.
fn render_headline(primary: Option<&Archetype>, lang: &str) -> String {
    match primary {
        Some(a) => a.label.resolve(lang),
        None => Locale::from_tag(lang).generic_headline().to_string(),
    }
}

fn render_summary(locale: Locale, headline: &str, cv: &Value, risk: &Value, bottlenecks: &[Value]) -> String {
    let capitals = capitals_text(cv);
    let v = display_value(risk.get("V"));
    let paths = paths_text(bottlenecks);
    match locale {
        Locale::El => format!(
            "Κύρια εικόνα: {headline}. Κεφάλαια (S,H,C,E,I): {capitals}. \
             Συνολικός κίνδυνος V={v}. Κύρια μονοπάτια βελτίωσης: {paths}."
        ),
        Locale::En => format!(
            "Primary pattern: {headline}. Capitals (S,H,C,E,I): {capitals}. \
             Overall risk V={v}. Top improvement paths: {paths}."
        ),
    }
}

/// Build the profile for a stored assessment.
pub fn build_profile(
    assessment_id: &str,
    profile_id: &str,
    meta_public: &Meta,
    results: &Value,
    lang: &str,
    library: &ArchetypeLibrary,
) -> Profile {
    let cv = section(results, "capital_vector");
    let risk = section(results, "risk");
    let bottlenecks: Vec<Value> = results
        .get("bottlenecks")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let matched = library.match_archetypes(&MatchInput::from_results(results));
    let primary = matched.first().copied();

    let mut cards = ProfileCards::default();
    if let Some(p) = primary {
        cards.opportunities = signal_cards(&p.signals.opportunity, MAX_OPPORTUNITY_CARDS, lang);
        cards.risks = signal_cards(&p.signals.risk, MAX_RISK_CARDS, lang);
        cards.actions = signal_cards(&p.signals.actions, MAX_ACTION_CARDS, lang);
    }
    cards.bottlenecks = bottlenecks
        .iter()
        .take(MAX_BOTTLENECK_CARDS)
        .map(bottleneck_card)
        .collect();

    let headline = render_headline(primary, lang);
    let summary = render_summary(Locale::from_tag(lang), &headline, &cv, &risk, &bottlenecks);

    let radar = RadarChart {
        labels: CapitalDomain::ALL.iter().map(|d| d.symbol().to_string()).collect(),
        values: CapitalDomain::ALL
            .iter()
            .map(|d| cv.get(d.symbol()).and_then(Value::as_f64))
            .collect(),
    };

    Profile {
        ui: ProfileUi {
            headline,
            summary,
            cards,
            charts: ProfileCharts { radar },
        },
        data: ProfileData {
            assessment_id: assessment_id.to_string(),
            profile_id: profile_id.to_string(),
            meta_public: meta_public.clone(),
            primary_archetype: primary.map(|a| a.id.clone()),
            matched_archetypes: matched.iter().map(|a| a.id.clone()).collect(),
            capital_vector: cv,
            risk,
            bottlenecks,
        },
    }
}

/// Plain markdown rendering for review outside the UI.
pub fn render_profile_markdown(profile: &Profile) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}\n\n", profile.ui.headline));
    out.push_str(&format!("{}\n\n", profile.ui.summary));
    out.push_str(&format!("- Assessment: `{}`\n", profile.data.assessment_id));
    out.push_str(&format!("- Profile: `{}`\n", profile.data.profile_id));
    if let Some(primary) = &profile.data.primary_archetype {
        out.push_str(&format!("- Primary archetype: `{primary}`\n"));
    }
    if !profile.data.matched_archetypes.is_empty() {
        out.push_str(&format!(
            "- Matched archetypes: {}\n",
            profile.data.matched_archetypes.join(", ")
        ));
    }

    let lists = [
        ("Opportunities", &profile.ui.cards.opportunities),
        ("Risks", &profile.ui.cards.risks),
        ("Actions", &profile.ui.cards.actions),
    ];
    for (title, cards) in lists {
        if cards.is_empty() {
            continue;
        }
        out.push_str(&format!("\n## {title}\n\n"));
        for card in cards {
            match &card.code {
                Some(code) => out.push_str(&format!("- {} (`{code}`)\n", card.text)),
                None => out.push_str(&format!("- {}\n", card.text)),
            }
        }
    }

    if !profile.ui.cards.bottlenecks.is_empty() {
        out.push_str("\n## Bottlenecks\n\n");
        out.push_str("| from | to | t | barrier | t_eff | priority |\n");
        out.push_str("|---|---|---|---|---|---|\n");
        for b in &profile.ui.cards.bottlenecks {
            out.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} |\n",
                display_value(Some(&b.from)),
                display_value(Some(&b.to)),
                display_value(Some(&b.t)),
                display_value(Some(&b.barrier)),
                display_value(Some(&b.t_eff)),
                display_value(Some(&b.priority)),
            ));
        }
    }

    out
}
