//! # Explainer
//!
//! Ranks the distinct vocabulary words of an input by the magnitude of their
//! learned coefficient. The coefficient is reported raw: it reflects the
//! word's global polarity, not how often it occurs in this document.

use std::collections::HashSet;

use crate::model::Model;
use crate::normalize::Normalizer;
use crate::verdict::WordContribution;

pub const DEFAULT_TOP_N: usize = 5;

/// Top `top_n` contributing words of `text`, sorted by descending `|score|`.
///
/// Re-normalizes with the same normalizer the scorer uses so both agree on
/// token membership. Returns an empty list when the model exposes no
/// coefficients or no input word is in the vocabulary.
pub fn explain(
    normalizer: &Normalizer,
    model: &Model,
    text: &str,
    top_n: usize,
) -> Vec<WordContribution> {
    if !model.supports_explanation() || top_n == 0 {
        return Vec::new();
    }

    let tokens = normalizer.normalize(text);
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out: Vec<WordContribution> = tokens
        .iter()
        .filter(|w| seen.insert(*w))
        .filter_map(|w| model.coefficient(w).map(|c| WordContribution::new(w, c)))
        .collect();

    // Stable: equal magnitudes keep first-encounter order.
    out.sort_by(|a, b| b.score.abs().total_cmp(&a.score.abs()));
    out.truncate(top_n);
    out
}
