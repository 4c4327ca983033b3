//! # Normalizer
//!
//! Deterministic text → token pipeline shared by the scorer and the explainer.
//!
//! Steps, in order:
//! 1. lowercase,
//! 2. drop every character that is not an ASCII letter or whitespace
//!    (digits, punctuation, URLs, emoji all disappear),
//! 3. split on whitespace,
//! 4. drop stop words (checked on the surface form),
//! 5. map each remaining token to its dictionary lemma (identity when absent).
//!
//! When the lexical resources cannot be loaded the normalizer runs in a
//! declared degraded mode: steps 4 and 5 are skipped and
//! [`Normalizer::is_degraded`] reports it.

use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::warn;

const BUILTIN_STOPWORDS: &str = include_str!("../resources/stopwords_en.txt");
const BUILTIN_LEMMAS: &str = include_str!("../resources/lemmas_en.tsv");

static NON_ALPHA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z\s]").expect("non-alpha regex"));

/// Ordered lowercase alphabetic tokens, stop words removed, lemmatized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedTokens(Vec<String>);

impl NormalizedTokens {
    pub fn new(tokens: Vec<String>) -> Self {
        Self(tokens)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Space-joined form, as fed to the offline trainer.
    pub fn joined(&self) -> String {
        self.0.join(" ")
    }
}

/// Stop-word set plus lemma dictionary. Immutable once built.
#[derive(Debug, Clone)]
pub struct LexicalResources {
    stop_words: HashSet<String>,
    lemmas: HashMap<String, String>,
}

impl LexicalResources {
    /// English resources compiled into the binary.
    pub fn builtin() -> Self {
        Self {
            stop_words: parse_stopwords(BUILTIN_STOPWORDS),
            lemmas: parse_lemmas(BUILTIN_LEMMAS),
        }
    }

    /// Load both resources from disk. Either file failing fails the whole load.
    pub fn load(stopwords_path: &Path, lemmas_path: &Path) -> anyhow::Result<Self> {
        let sw = fs::read_to_string(stopwords_path)
            .with_context(|| format!("reading stop words at {}", stopwords_path.display()))?;
        let lm = fs::read_to_string(lemmas_path)
            .with_context(|| format!("reading lemmas at {}", lemmas_path.display()))?;
        let lemmas = parse_lemmas(&lm);
        if lemmas.is_empty() {
            anyhow::bail!("lemma dictionary at {} is empty", lemmas_path.display());
        }
        Ok(Self {
            stop_words: parse_stopwords(&sw),
            lemmas,
        })
    }

    pub fn from_parts<S, L>(stop_words: S, lemmas: L) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
        L: IntoIterator<Item = (String, String)>,
    {
        Self {
            stop_words: stop_words.into_iter().map(Into::into).collect(),
            lemmas: lemmas.into_iter().collect(),
        }
    }

    pub fn is_stop_word(&self, w: &str) -> bool {
        self.stop_words.contains(w)
    }

    pub fn lemma<'a>(&'a self, w: &'a str) -> &'a str {
        self.lemmas.get(w).map(String::as_str).unwrap_or(w)
    }
}

fn parse_stopwords(raw: &str) -> HashSet<String> {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}

fn parse_lemmas(raw: &str) -> HashMap<String, String> {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .filter_map(|l| {
            let (form, lemma) = l.split_once('\t')?;
            let (form, lemma) = (form.trim(), lemma.trim());
            if form.is_empty() || lemma.is_empty() {
                None
            } else {
                Some((form.to_string(), lemma.to_string()))
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct Normalizer {
    resources: Option<LexicalResources>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(LexicalResources::builtin())
    }
}

impl Normalizer {
    pub fn new(resources: LexicalResources) -> Self {
        Self {
            resources: Some(resources),
        }
    }

    /// Degraded mode: no stop-word removal, no lemmatization.
    pub fn identity() -> Self {
        Self { resources: None }
    }

    /// Built-in resources unless both paths are given; on a failed load the
    /// normalizer degrades instead of failing.
    pub fn from_paths(stopwords: Option<&Path>, lemmas: Option<&Path>) -> Self {
        match (stopwords, lemmas) {
            (None, None) => Self::default(),
            (Some(sw), Some(lm)) => match LexicalResources::load(sw, lm) {
                Ok(res) => Self::new(res),
                Err(e) => {
                    warn!(target: "truthlens", error = %format!("{e:#}"), "lexical resources unavailable; normalization degraded");
                    Self::identity()
                }
            },
            _ => {
                warn!(target: "truthlens", "only one lexicon path configured; normalization degraded");
                Self::identity()
            }
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.resources.is_none()
    }

    pub fn normalize(&self, text: &str) -> NormalizedTokens {
        let lowered = text.to_lowercase();
        let stripped = NON_ALPHA.replace_all(&lowered, "");
        let words = stripped.split_whitespace();

        let tokens = match &self.resources {
            Some(res) => words
                .filter(|w| !res.is_stop_word(w))
                .map(|w| res.lemma(w).to_string())
                .collect(),
            None => words.map(str::to_string).collect(),
        };
        NormalizedTokens(tokens)
    }

    /// Soft failure on non-text input: invalid UTF-8 yields no tokens.
    pub fn normalize_bytes(&self, raw: &[u8]) -> NormalizedTokens {
        match std::str::from_utf8(raw) {
            Ok(s) => self.normalize(s),
            Err(_) => NormalizedTokens::default(),
        }
    }
}
