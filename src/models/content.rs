//! Models for the content tree document.
//!
//! The content tree is a JSON file with a top-level `parts` list. Each part
//! carries a theme plus a `content` mapping of recognized single-value and
//! list fields, all optional. Quotes for the daily rotation are derived
//! from it by `rotation::flatten`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentTree {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    pub id: String,
    pub theme: String,
    #[serde(default)]
    pub content: PartContent,
}

/// The recognized content fields of a part. Anything else in the document
/// is ignored rather than rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consequences: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preservation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_damage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_damage: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quotes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub questions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conclusions: Vec<String>,
}

/// Which field of a part a quote was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteKind {
    Statement,
    Problem,
    Consequences,
    Preservation,
    SelfDamage,
    ExternalDamage,
    Quote,
    Question,
    Conclusion,
}

impl QuoteKind {
    pub fn label(&self) -> &'static str {
        match self {
            QuoteKind::Statement => "statement",
            QuoteKind::Problem => "problem",
            QuoteKind::Consequences => "consequences",
            QuoteKind::Preservation => "preservation",
            QuoteKind::SelfDamage => "self_damage",
            QuoteKind::ExternalDamage => "external_damage",
            QuoteKind::Quote => "quote",
            QuoteKind::Question => "question",
            QuoteKind::Conclusion => "conclusion",
        }
    }
}

/// A single displayable quote, immutable once derived from the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteItem {
    pub theme: String,
    pub text: String,
    pub kind: QuoteKind,
    pub theme_id: String,
}
