//! # Trust classifier
//!
//! Pure decision table over `(label, confidence%)`:
//!
//! | label | confidence  | tier                      |
//! |-------|-------------|---------------------------|
//! | REAL  | (90, 100]   | True News                 |
//! | REAL  | (80, 90]    | Most Probable True        |
//! | REAL  | [0, 80]     | Not Sure / Unverified     |
//! | FAKE  | (90, 100]   | Critical Misinformation   |
//! | FAKE  | (80, 90]    | Likely Fabricated         |
//! | FAKE  | [0, 80]     | Not Sure / Inconclusive   |
//!
//! Bands are exclusive below, inclusive at the upper threshold: 90.0 is in
//! (80, 90], 80.0 is in [0, 80].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::Label;
use crate::verdict::WordContribution;

const HIGH_BAND: f64 = 90.0;
const MID_BAND: f64 = 80.0;

/// Placeholder used in the rationale when no word could be surfaced.
pub const NO_WORDS_PLACEHOLDER: &str = "identified terms";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrustTier {
    #[serde(rename = "True News")]
    TrueNews,
    #[serde(rename = "Most Probable True")]
    MostProbableTrue,
    #[serde(rename = "Not Sure / Unverified")]
    NotSureUnverified,
    #[serde(rename = "Critical Misinformation")]
    CriticalMisinformation,
    #[serde(rename = "Likely Fabricated")]
    LikelyFabricated,
    #[serde(rename = "Not Sure / Inconclusive")]
    NotSureInconclusive,
}

impl TrustTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrustTier::TrueNews => "True News",
            TrustTier::MostProbableTrue => "Most Probable True",
            TrustTier::NotSureUnverified => "Not Sure / Unverified",
            TrustTier::CriticalMisinformation => "Critical Misinformation",
            TrustTier::LikelyFabricated => "Likely Fabricated",
            TrustTier::NotSureInconclusive => "Not Sure / Inconclusive",
        }
    }

    /// Opening sentence of the rationale for this tier.
    pub fn lead_in(&self) -> &'static str {
        match self {
            TrustTier::TrueNews => "High Confidence Verification.",
            TrustTier::MostProbableTrue => "Strong Credibility Signals.",
            TrustTier::NotSureUnverified => "Ambiguous Patterns Detected.",
            TrustTier::CriticalMisinformation => "High Confidence Anomaly.",
            TrustTier::LikelyFabricated => "Suspicious Patterns.",
            TrustTier::NotSureInconclusive => "Evaluated with Low Certainty.",
        }
    }
}

impl fmt::Display for TrustTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn classify_trust(label: Label, confidence: f64) -> TrustTier {
    match label {
        Label::Real if confidence > HIGH_BAND => TrustTier::TrueNews,
        Label::Real if confidence > MID_BAND => TrustTier::MostProbableTrue,
        Label::Real => TrustTier::NotSureUnverified,
        Label::Fake if confidence > HIGH_BAND => TrustTier::CriticalMisinformation,
        Label::Fake if confidence > MID_BAND => TrustTier::LikelyFabricated,
        Label::Fake => TrustTier::NotSureInconclusive,
    }
}

/// `"<lead-in> AI analysis ... identifies '<w1, w2, w3>' as key factors. ..."`
pub fn rationale(
    tier: TrustTier,
    confidence: f64,
    words: &[WordContribution],
    max_words: usize,
) -> String {
    let top: Vec<&str> = words
        .iter()
        .take(max_words)
        .map(|w| w.word.as_str())
        .collect();
    let joined = if top.is_empty() {
        NO_WORDS_PLACEHOLDER.to_string()
    } else {
        top.join(", ")
    };
    format!(
        "{} AI analysis based on semantic vectorization identifies '{}' as key factors. \
         The model confidence of {:.1}% suggests this content is {}.",
        tier.lead_in(),
        joined,
        confidence,
        tier
    )
}

/// Compact badge shown next to feed / batch results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedBadge {
    #[serde(rename = "Verified")]
    Verified,
    #[serde(rename = "Likely Real")]
    LikelyReal,
    #[serde(rename = "High Risk")]
    HighRisk,
    #[serde(rename = "Suspicious")]
    Suspicious,
}

impl FeedBadge {
    pub fn for_score(label: Label, confidence: f64) -> Self {
        match (label, confidence > MID_BAND) {
            (Label::Real, true) => FeedBadge::Verified,
            (Label::Real, false) => FeedBadge::LikelyReal,
            (Label::Fake, true) => FeedBadge::HighRisk,
            (Label::Fake, false) => FeedBadge::Suspicious,
        }
    }
}
