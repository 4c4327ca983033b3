//! verdict.rs: request input (Document) and the engine's output shape (Verdict).
//!
//! A Verdict is built once per request and never mutated afterwards; callers
//! own it for display and persistence. Field names below are the wire format
//! used by the HTTP layer.

use serde::{Deserialize, Serialize};

use crate::credibility::CredibilityBand;
use crate::model::Label;
use crate::trust::{FeedBadge, TrustTier};

/// Where the text came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Provenance {
    Typed,
    Url { domain: String },
    Feed { source: String },
}

/// Raw text plus provenance, alive for one classification request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub text: String,
    pub provenance: Provenance,
}

impl Document {
    pub fn typed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            provenance: Provenance::Typed,
        }
    }

    pub fn from_url(text: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            provenance: Provenance::Url {
                domain: domain.into(),
            },
        }
    }

    pub fn from_feed(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            provenance: Provenance::Feed {
                source: source.into(),
            },
        }
    }
}

/// A vocabulary word and its learned coefficient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordContribution {
    pub word: String,
    pub score: f64,
}

impl WordContribution {
    pub fn new(word: impl Into<String>, score: f64) -> Self {
        Self {
            word: word.into(),
            score,
        }
    }
}

/// Content-independent domain prior, attached for URL-origin input only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCredibility {
    pub domain: String,
    /// 0..=100
    pub score: u8,
    pub band: CredibilityBand,
}

/// Recoverable conditions absorbed into the verdict instead of failing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Advisory {
    /// Blank text, or nothing left after normalization.
    EmptyInput,
    /// No token matched the vocabulary; zero-signal policy applied.
    LowData,
    /// Stop-word / lemma resources missing; identity normalization used.
    DegradedNormalization,
    /// The scorer exposes no coefficients; no contributing words.
    ExplainabilityUnsupported,
}

pub const NOTE_MODEL_ANALYSIS: &str = "Model Analysis";
pub const NOTE_LOW_DATA: &str = "Low data / Unverified";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    #[serde(rename = "prediction")]
    pub label: Label,
    /// Winning-class probability in percent, unrounded.
    pub confidence: f64,
    #[serde(rename = "display_status")]
    pub trust_tier: TrustTier,
    #[serde(rename = "reasoning")]
    pub rationale: String,
    pub note: String,
    pub contributing_words: Vec<WordContribution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_credibility: Option<SourceCredibility>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub advisories: Vec<Advisory>,
}

impl Verdict {
    pub fn is_low_data(&self) -> bool {
        self.advisories.contains(&Advisory::LowData)
    }
}

/// One item of a news feed or query result, classified on its concatenated text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedArticle {
    pub source: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
}

impl FeedArticle {
    pub fn full_text(&self) -> String {
        format!("{} {} {}", self.title, self.description, self.content)
    }

    pub fn to_document(&self) -> Document {
        Document::from_feed(self.full_text(), self.source.clone())
    }
}

/// Compact per-article result for feed / batch listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedResult {
    pub title: String,
    pub source: String,
    pub prediction: Label,
    pub confidence: f64,
    pub badge: FeedBadge,
}

impl FeedResult {
    pub fn from_verdict(article: &FeedArticle, v: &Verdict) -> Self {
        Self {
            title: article.title.clone(),
            source: article.source.clone(),
            prediction: v.label,
            confidence: v.confidence,
            badge: FeedBadge::for_score(v.label, v.confidence),
        }
    }
}
