//! # Vocabulary-weighted model
//!
//! Adapter over the frozen artifact produced by the offline trainer: a TF-IDF
//! vectorizer over a fixed vocabulary plus a binary scorer. The scorer is a
//! trait object so each supported model family gets its own adapter; only
//! linear families expose per-feature coefficients for explanations.
//!
//! Artifact JSON shape:
//! ```json
//! {
//!   "version": "v1",
//!   "classes": ["FAKE", "REAL"],
//!   "vectorizer": { "vocabulary": {"hoax": 0}, "idf": [1.7], "norm": "l2", "ngram_max": 1 },
//!   "scorer": { "family": "logistic_regression", "coefficients": [-2.1], "intercept": 0.1 }
//! }
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::normalize::NormalizedTokens;

/// Confidence emitted when no input token is in the vocabulary.
pub const ZERO_SIGNAL_CONFIDENCE: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Label {
    Real,
    Fake,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Real => "REAL",
            Label::Fake => "FAKE",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "REAL" => Ok(Label::Real),
            "FAKE" => Ok(Label::Fake),
            other => anyhow::bail!("unknown class label `{other}`"),
        }
    }
}

/// Token → feature index, fixed at training time.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    index: HashMap<String, usize>,
}

impl Vocabulary {
    pub fn new(index: HashMap<String, usize>) -> Self {
        Self { index }
    }

    pub fn get(&self, token: &str) -> Option<usize> {
        self.index.get(token).copied()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.index.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn max_index(&self) -> Option<usize> {
        self.index.values().copied().max()
    }
}

impl<S: Into<String>> FromIterator<(S, usize)> for Vocabulary {
    fn from_iter<I: IntoIterator<Item = (S, usize)>>(iter: I) -> Self {
        Self {
            index: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Sparse feature index → weight. Ordered so dot products are reproducible.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVector(BTreeMap<usize, f64>);

impl FeatureVector {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn nnz(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, idx: usize) -> Option<f64> {
        self.0.get(&idx).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.0.iter().map(|(&i, &w)| (i, w))
    }

    /// Sparse dot product; indices past the end of `dense` contribute nothing.
    pub fn dot(&self, dense: &[f64]) -> f64 {
        self.iter()
            .filter_map(|(i, w)| dense.get(i).map(|c| c * w))
            .sum()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum Norm {
    #[serde(rename = "l1")]
    L1,
    #[default]
    #[serde(rename = "l2")]
    L2,
    #[serde(rename = "none")]
    Unnormalized,
}

/// Term counts over the vocabulary, optionally IDF-weighted and normalized.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: Vocabulary,
    idf: Option<Vec<f64>>,
    norm: Norm,
    ngram_max: usize,
}

impl TfidfVectorizer {
    pub fn new(vocabulary: Vocabulary, idf: Option<Vec<f64>>, norm: Norm, ngram_max: usize) -> Self {
        Self {
            vocabulary,
            idf,
            norm,
            ngram_max: ngram_max.clamp(1, 2),
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn transform(&self, tokens: &NormalizedTokens) -> FeatureVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();

        for t in tokens.iter() {
            if let Some(i) = self.vocabulary.get(t) {
                *counts.entry(i).or_insert(0.0) += 1.0;
            }
        }

        if self.ngram_max >= 2 {
            // Single-character tokens never formed n-grams at training time.
            let grams: Vec<&str> = tokens.iter().filter(|t| t.len() >= 2).collect();
            for pair in grams.windows(2) {
                let bigram = format!("{} {}", pair[0], pair[1]);
                if let Some(i) = self.vocabulary.get(&bigram) {
                    *counts.entry(i).or_insert(0.0) += 1.0;
                }
            }
        }

        if let Some(idf) = &self.idf {
            for (i, w) in counts.iter_mut() {
                *w *= idf.get(*i).copied().unwrap_or(1.0);
            }
        }

        let denom = match self.norm {
            Norm::L2 => counts.values().map(|w| w * w).sum::<f64>().sqrt(),
            Norm::L1 => counts.values().map(|w| w.abs()).sum::<f64>(),
            Norm::Unnormalized => 1.0,
        };
        if denom > 0.0 && denom != 1.0 {
            for w in counts.values_mut() {
                *w /= denom;
            }
        }

        FeatureVector(counts)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFamily {
    LogisticRegression,
    MultinomialNb,
}

/// One adapter per supported model family.
pub trait Scorer: Send + Sync + fmt::Debug {
    fn family(&self) -> ModelFamily;

    /// Number of features the scorer was trained on.
    fn n_features(&self) -> usize;

    /// Posterior probabilities, aligned with the model's class order.
    fn posterior(&self, features: &FeatureVector) -> [f64; 2];

    /// Per-feature coefficients; `None` for families that are not linear.
    /// Positive values favor the second class.
    fn coefficients(&self) -> Option<&[f64]> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct LogisticScorer {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LogisticScorer {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
        }
    }
}

impl Scorer for LogisticScorer {
    fn family(&self) -> ModelFamily {
        ModelFamily::LogisticRegression
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn posterior(&self, features: &FeatureVector) -> [f64; 2] {
        let z = features.dot(&self.coefficients) + self.intercept;
        let p = sigmoid(z);
        [1.0 - p, p]
    }

    fn coefficients(&self) -> Option<&[f64]> {
        Some(&self.coefficients)
    }
}

#[derive(Debug, Clone)]
pub struct NaiveBayesScorer {
    class_log_prior: [f64; 2],
    feature_log_prob: [Vec<f64>; 2],
}

impl NaiveBayesScorer {
    pub fn new(class_log_prior: [f64; 2], feature_log_prob: [Vec<f64>; 2]) -> Self {
        Self {
            class_log_prior,
            feature_log_prob,
        }
    }
}

impl Scorer for NaiveBayesScorer {
    fn family(&self) -> ModelFamily {
        ModelFamily::MultinomialNb
    }

    fn n_features(&self) -> usize {
        self.feature_log_prob[0].len()
    }

    fn posterior(&self, features: &FeatureVector) -> [f64; 2] {
        let jll = [
            features.dot(&self.feature_log_prob[0]) + self.class_log_prior[0],
            features.dot(&self.feature_log_prob[1]) + self.class_log_prior[1],
        ];
        let m = jll[0].max(jll[1]);
        let e0 = (jll[0] - m).exp();
        let e1 = (jll[1] - m).exp();
        let s = e0 + e1;
        [e0 / s, e1 / s]
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Whether the score came from the model or from the zero-signal policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Model,
    LowData,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub label: Label,
    /// Winning-class probability × 100, not rounded.
    pub confidence: f64,
    pub signal: Signal,
}

impl Score {
    pub fn zero_signal() -> Self {
        Self {
            label: Label::Real,
            confidence: ZERO_SIGNAL_CONFIDENCE,
            signal: Signal::LowData,
        }
    }
}

/// Vectorizer + scorer + class order. Immutable once built.
#[derive(Debug)]
pub struct Model {
    version: String,
    classes: [Label; 2],
    vectorizer: TfidfVectorizer,
    scorer: Box<dyn Scorer>,
}

impl Model {
    /// Validates that the vectorizer and scorer agree on the feature space.
    pub fn new(
        version: impl Into<String>,
        classes: [Label; 2],
        vectorizer: TfidfVectorizer,
        scorer: Box<dyn Scorer>,
    ) -> anyhow::Result<Self> {
        if classes[0] == classes[1] {
            anyhow::bail!("model classes must be distinct, got {:?}", classes);
        }
        let n = scorer.n_features();
        if let Some(max) = vectorizer.vocabulary.max_index() {
            if max >= n {
                anyhow::bail!("vocabulary index {max} out of range for {n} features");
            }
        }
        if let Some(idf) = &vectorizer.idf {
            if idf.len() != n {
                anyhow::bail!("idf has {} entries, expected {n}", idf.len());
            }
        }
        Ok(Self {
            version: version.into(),
            classes,
            vectorizer,
            scorer,
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading model artifact at {}", path.display()))?;
        Self::from_json_str(&raw)
            .with_context(|| format!("parsing model artifact at {}", path.display()))
    }

    pub fn from_json_str(raw: &str) -> anyhow::Result<Self> {
        let art: ModelArtifact = serde_json::from_str(raw)?;
        art.build()
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn classes(&self) -> [Label; 2] {
        self.classes
    }

    pub fn family(&self) -> ModelFamily {
        self.scorer.family()
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        self.vectorizer.vocabulary()
    }

    pub fn supports_explanation(&self) -> bool {
        self.scorer.coefficients().is_some()
    }

    /// Raw learned coefficient for a vocabulary word, if the family exposes one.
    pub fn coefficient(&self, word: &str) -> Option<f64> {
        let idx = self.vectorizer.vocabulary.get(word)?;
        self.scorer.coefficients()?.get(idx).copied()
    }

    pub fn vectorize(&self, tokens: &NormalizedTokens) -> FeatureVector {
        self.vectorizer.transform(tokens)
    }

    /// Posterior aligned with [`Model::classes`]; `None` when no token is in
    /// the vocabulary.
    pub fn posterior(&self, tokens: &NormalizedTokens) -> Option<[f64; 2]> {
        let features = self.vectorize(tokens);
        if features.is_empty() {
            return None;
        }
        Some(self.scorer.posterior(&features))
    }

    pub fn predict(&self, tokens: &NormalizedTokens) -> Label {
        self.score(tokens).label
    }

    /// Label and confidence for normalized tokens, applying the zero-signal
    /// policy when no token is in the vocabulary.
    pub fn score(&self, tokens: &NormalizedTokens) -> Score {
        let Some(p) = self.posterior(tokens) else {
            return Score::zero_signal();
        };
        // Ties go to the first class, as an argmax over the class list would.
        let winner = if p[1] > p[0] { 1 } else { 0 };
        Score {
            label: self.classes[winner],
            confidence: (p[winner] * 100.0).clamp(0.0, 100.0),
            signal: Signal::Model,
        }
    }
}

/* ----------------------------
Artifact schema (JSON)
---------------------------- */

#[derive(Debug, Deserialize)]
struct ModelArtifact {
    #[serde(default)]
    version: Option<String>,
    classes: Vec<String>,
    vectorizer: VectorizerArtifact,
    scorer: ScorerArtifact,
}

#[derive(Debug, Deserialize)]
struct VectorizerArtifact {
    vocabulary: HashMap<String, usize>,
    #[serde(default)]
    idf: Option<Vec<f64>>,
    #[serde(default)]
    norm: Norm,
    #[serde(default = "default_ngram_max")]
    ngram_max: usize,
}

fn default_ngram_max() -> usize {
    1
}

#[derive(Debug, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
enum ScorerArtifact {
    LogisticRegression {
        coefficients: Vec<f64>,
        #[serde(default)]
        intercept: f64,
    },
    MultinomialNb {
        class_log_prior: [f64; 2],
        feature_log_prob: [Vec<f64>; 2],
    },
}

impl ModelArtifact {
    fn build(self) -> anyhow::Result<Model> {
        let classes = match self.classes.as_slice() {
            [a, b] => [a.parse::<Label>()?, b.parse::<Label>()?],
            other => anyhow::bail!("expected exactly 2 classes, got {}", other.len()),
        };

        let scorer: Box<dyn Scorer> = match self.scorer {
            ScorerArtifact::LogisticRegression {
                coefficients,
                intercept,
            } => Box::new(LogisticScorer::new(coefficients, intercept)),
            ScorerArtifact::MultinomialNb {
                class_log_prior,
                feature_log_prob,
            } => {
                if feature_log_prob[0].len() != feature_log_prob[1].len() {
                    anyhow::bail!(
                        "feature_log_prob rows differ in length ({} vs {})",
                        feature_log_prob[0].len(),
                        feature_log_prob[1].len()
                    );
                }
                Box::new(NaiveBayesScorer::new(class_log_prior, feature_log_prob))
            }
        };

        let v = self.vectorizer;
        if v.vocabulary.is_empty() {
            anyhow::bail!("vocabulary is empty");
        }
        let vectorizer = TfidfVectorizer::new(Vocabulary::new(v.vocabulary), v.idf, v.norm, v.ngram_max);

        Model::new(
            self.version.unwrap_or_else(|| "unversioned".to_string()),
            classes,
            vectorizer,
            scorer,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::Normalizer;

    fn toks(s: &str) -> NormalizedTokens {
        Normalizer::default().normalize(s)
    }

    fn lr_model() -> Model {
        Model::from_json_str(
            r#"{
                "version": "t1",
                "classes": ["FAKE", "REAL"],
                "vectorizer": { "vocabulary": {"hoax": 0, "senate": 1, "shocking": 2}, "norm": "none" },
                "scorer": { "family": "logistic_regression", "coefficients": [-3.0, 2.0, -1.0], "intercept": 0.0 }
            }"#,
        )
        .expect("valid test model")
    }

    #[test]
    fn out_of_vocabulary_input_is_zero_signal() {
        let m = lr_model();
        let s = m.score(&toks("completely unrelated words here"));
        assert_eq!(s, Score::zero_signal());
        assert_eq!(s.label, Label::Real);
        assert_eq!(s.confidence, 50.0);
    }

    #[test]
    fn logistic_picks_the_more_probable_class() {
        let m = lr_model();
        let s = m.score(&toks("shocking hoax"));
        assert_eq!(s.label, Label::Fake);
        let expected = (1.0 - sigmoid(-4.0)) * 100.0;
        assert!((s.confidence - expected).abs() < 1e-9);

        let s = m.score(&toks("senate"));
        assert_eq!(s.label, Label::Real);
        assert!((s.confidence - sigmoid(2.0) * 100.0).abs() < 1e-9);
    }

    #[test]
    fn posterior_is_aligned_with_class_order() {
        let m = lr_model();
        assert_eq!(m.posterior(&toks("nothing known")), None);
        let p = m.posterior(&toks("senate")).unwrap();
        assert!((p[0] + p[1] - 1.0).abs() < 1e-12);
        assert!(p[1] > p[0]);
        assert_eq!(m.classes()[1], Label::Real);
        assert_eq!(m.predict(&toks("senate")), Label::Real);
        assert_eq!(m.predict(&toks("hoax")), Label::Fake);
    }

    #[test]
    fn exact_tie_goes_to_first_class() {
        let m = lr_model();
        // 2*2 - 3 - 1 = 0
        let s = m.score(&toks("senate senate hoax shocking"));
        assert_eq!(s.label, Label::Fake);
        assert_eq!(s.confidence, 50.0);
    }

    #[test]
    fn l2_tfidf_vector_has_unit_norm() {
        let v = TfidfVectorizer::new(
            [("alpha", 0usize), ("beta", 1)].into_iter().collect(),
            Some(vec![2.0, 1.0]),
            Norm::L2,
            1,
        );
        let fv = v.transform(&NormalizedTokens::new(vec![
            "alpha".into(),
            "beta".into(),
            "beta".into(),
            "gamma".into(),
        ]));
        assert_eq!(fv.nnz(), 2);
        let norm: f64 = fv.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-12);
        // alpha: 1*2, beta: 2*1 → equal weights after normalization
        assert!((fv.get(0).unwrap() - fv.get(1).unwrap()).abs() < 1e-12);
    }

    #[test]
    fn bigrams_count_when_enabled() {
        let v = TfidfVectorizer::new(
            [("deep", 0usize), ("deep state", 1)].into_iter().collect(),
            None,
            Norm::Unnormalized,
            2,
        );
        let fv = v.transform(&NormalizedTokens::new(vec!["deep".into(), "state".into()]));
        assert_eq!(fv.get(0), Some(1.0));
        assert_eq!(fv.get(1), Some(1.0));
    }

    #[test]
    fn naive_bayes_has_no_coefficients() {
        let m = Model::from_json_str(
            r#"{
                "classes": ["FAKE", "REAL"],
                "vectorizer": { "vocabulary": {"hoax": 0, "senate": 1}, "norm": "none" },
                "scorer": {
                    "family": "multinomial_nb",
                    "class_log_prior": [-0.6931, -0.6931],
                    "feature_log_prob": [[-0.2, -2.0], [-2.0, -0.2]]
                }
            }"#,
        )
        .expect("valid nb model");
        assert_eq!(m.family(), ModelFamily::MultinomialNb);
        assert!(!m.supports_explanation());
        assert_eq!(m.coefficient("hoax"), None);
        assert_eq!(m.score(&toks("hoax")).label, Label::Fake);
        assert_eq!(m.score(&toks("senate")).label, Label::Real);
    }

    #[test]
    fn rejects_inconsistent_artifacts() {
        let bad_index = r#"{
            "classes": ["FAKE", "REAL"],
            "vectorizer": { "vocabulary": {"hoax": 5} },
            "scorer": { "family": "logistic_regression", "coefficients": [1.0] }
        }"#;
        assert!(Model::from_json_str(bad_index).is_err());

        let bad_classes = r#"{
            "classes": ["REAL", "REAL"],
            "vectorizer": { "vocabulary": {"hoax": 0} },
            "scorer": { "family": "logistic_regression", "coefficients": [1.0] }
        }"#;
        assert!(Model::from_json_str(bad_classes).is_err());

        let unknown_family = r#"{
            "classes": ["FAKE", "REAL"],
            "vectorizer": { "vocabulary": {"hoax": 0} },
            "scorer": { "family": "svm", "coefficients": [1.0] }
        }"#;
        assert!(Model::from_json_str(unknown_family).is_err());
    }

    #[test]
    fn rejects_idf_of_the_wrong_length() {
        let short_idf = r#"{
            "classes": ["FAKE", "REAL"],
            "vectorizer": { "vocabulary": {"hoax": 0, "senate": 1}, "idf": [1.5] },
            "scorer": { "family": "logistic_regression", "coefficients": [-1.0, 1.0] }
        }"#;
        let err = Model::from_json_str(short_idf).unwrap_err();
        assert!(format!("{err:#}").contains("idf has 1 entries, expected 2"));
    }

    #[test]
    fn rejects_unequal_naive_bayes_rows() {
        let ragged = r#"{
            "classes": ["FAKE", "REAL"],
            "vectorizer": { "vocabulary": {"hoax": 0, "senate": 1} },
            "scorer": {
                "family": "multinomial_nb",
                "class_log_prior": [-0.6931, -0.6931],
                "feature_log_prob": [[-0.2, -2.0], [-2.0]]
            }
        }"#;
        let err = Model::from_json_str(ragged).unwrap_err();
        assert!(format!("{err:#}").contains("feature_log_prob rows differ in length"));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Model::load("/nonexistent/model.json").is_err());
    }
}
