//! # Classification engine
//! Single entry point shared by every input channel (typed text, URL, feed).
//!
//! Resources (model artifact, lexical resources, credibility lists) are loaded
//! once at construction and never mutated, so an `Arc<Engine>` can be used
//! from any number of request handlers without locking. A failed model load
//! puts the engine in a permanent offline state: every scoring call returns
//! [`EngineError::ModelUnavailable`] until the process is restarted.

use metrics::{counter, gauge};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::EngineConfig;
use crate::credibility::{normalize_domain, CredibilityBand, CredibilityHeuristic, MatchStrategy};
use crate::error::EngineError;
use crate::explain::{self, DEFAULT_TOP_N};
use crate::model::{Model, ModelFamily, Score, Signal};
use crate::normalize::Normalizer;
use crate::trust::{classify_trust, rationale};
use crate::verdict::{
    Advisory, Document, FeedArticle, FeedResult, Provenance, SourceCredibility, Verdict,
    WordContribution, NOTE_LOW_DATA, NOTE_MODEL_ANALYSIS,
};

pub type EngineHandle = Arc<Engine>;

#[derive(Debug)]
enum ModelState {
    Ready(Model),
    Offline { reason: String },
}

/// What the running engine can do; exposed for health checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub model_ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_family: Option<ModelFamily>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
    pub vocabulary_size: usize,
    pub explainability: bool,
    /// False in degraded normalization mode (covers stop-word removal too).
    pub lemmatization: bool,
    pub credibility_match: MatchStrategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offline_reason: Option<String>,
}

#[derive(Debug)]
pub struct Engine {
    normalizer: Normalizer,
    model: ModelState,
    credibility: CredibilityHeuristic,
    top_n: usize,
    rationale_words: usize,
}

impl Engine {
    /// Takes the model load result as-is; an `Err` becomes the offline state.
    pub fn new(
        normalizer: Normalizer,
        model: anyhow::Result<Model>,
        credibility: CredibilityHeuristic,
    ) -> Self {
        let model = match model {
            Ok(m) => {
                info!(
                    target: "truthlens",
                    family = ?m.family(),
                    version = m.version(),
                    vocabulary = m.vocabulary().len(),
                    "model loaded"
                );
                gauge!("truthlens_model_ready").set(1.0);
                ModelState::Ready(m)
            }
            Err(e) => {
                let reason = format!("{e:#}");
                error!(target: "truthlens", %reason, "model offline; restart required after fixing the artifact");
                gauge!("truthlens_model_ready").set(0.0);
                ModelState::Offline { reason }
            }
        };
        if normalizer.is_degraded() {
            warn!(target: "truthlens", "normalization degraded: no stop-word removal, no lemmatization");
        }
        Self {
            normalizer,
            model,
            credibility,
            top_n: DEFAULT_TOP_N,
            rationale_words: 3,
        }
    }

    pub fn from_config(cfg: &EngineConfig) -> Self {
        let normalizer = Normalizer::from_paths(
            cfg.lexicon.stopwords_path.as_deref(),
            cfg.lexicon.lemmas_path.as_deref(),
        );
        let model = Model::load(&cfg.model.path);
        Self::new(
            normalizer,
            model,
            CredibilityHeuristic::new(&cfg.credibility),
        )
        .with_explain_settings(cfg.explain.top_n, cfg.explain.rationale_words)
    }

    pub fn with_explain_settings(mut self, top_n: usize, rationale_words: usize) -> Self {
        self.top_n = top_n.max(1);
        self.rationale_words = rationale_words.min(self.top_n);
        self
    }

    pub fn into_handle(self) -> EngineHandle {
        Arc::new(self)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.model, ModelState::Ready(_))
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn capabilities(&self) -> Capabilities {
        let (ready, family, version, vocab, explainability, offline_reason) = match &self.model {
            ModelState::Ready(m) => (
                true,
                Some(m.family()),
                Some(m.version().to_string()),
                m.vocabulary().len(),
                m.supports_explanation(),
                None,
            ),
            ModelState::Offline { reason } => (false, None, None, 0, false, Some(reason.clone())),
        };
        Capabilities {
            model_ready: ready,
            model_family: family,
            model_version: version,
            vocabulary_size: vocab,
            explainability,
            lemmatization: !self.normalizer.is_degraded(),
            credibility_match: self.credibility.strategy(),
            offline_reason,
        }
    }

    fn model(&self) -> Result<&Model, EngineError> {
        match &self.model {
            ModelState::Ready(m) => Ok(m),
            ModelState::Offline { reason } => {
                counter!("truthlens_model_unavailable_total").increment(1);
                Err(EngineError::model_unavailable(reason.clone()))
            }
        }
    }

    /// Label and confidence only, zero-signal policy applied.
    pub fn score(&self, text: &str) -> Result<Score, EngineError> {
        let model = self.model()?;
        Ok(model.score(&self.normalizer.normalize(text)))
    }

    /// Contributing words for `text`; empty when the model family exposes no
    /// coefficients.
    pub fn explain(&self, text: &str, top_n: usize) -> Result<Vec<WordContribution>, EngineError> {
        let model = self.model()?;
        Ok(explain::explain(&self.normalizer, model, text, top_n))
    }

    /// Domain prior for URL-origin input. Needs no model.
    pub fn source_credibility(&self, domain: &str) -> SourceCredibility {
        let score = self.credibility.score(domain);
        SourceCredibility {
            domain: normalize_domain(domain),
            score,
            band: CredibilityBand::for_score(score),
        }
    }

    pub fn classify(&self, raw_text: &str) -> Result<Verdict, EngineError> {
        let model = self.model()?;
        Ok(self.build_verdict(model, raw_text, None))
    }

    /// Same verdict as [`Engine::classify`] plus the domain's credibility; the
    /// credibility never feeds back into label or confidence.
    pub fn classify_with_credibility(
        &self,
        raw_text: &str,
        domain: &str,
    ) -> Result<Verdict, EngineError> {
        let model = self.model()?;
        let cred = self.source_credibility(domain);
        Ok(self.build_verdict(model, raw_text, Some(cred)))
    }

    pub fn classify_document(&self, doc: &Document) -> Result<Verdict, EngineError> {
        match &doc.provenance {
            Provenance::Url { domain } => self.classify_with_credibility(&doc.text, domain),
            Provenance::Typed | Provenance::Feed { .. } => self.classify(&doc.text),
        }
    }

    /// Full verdict plus the compact listing row for one feed article.
    pub fn classify_feed_item(
        &self,
        article: &FeedArticle,
    ) -> Result<(Verdict, FeedResult), EngineError> {
        let v = self.classify_document(&article.to_document())?;
        let row = FeedResult::from_verdict(article, &v);
        Ok((v, row))
    }

    fn build_verdict(
        &self,
        model: &Model,
        raw_text: &str,
        source_credibility: Option<SourceCredibility>,
    ) -> Verdict {
        let tokens = self.normalizer.normalize(raw_text);
        let score = model.score(&tokens);
        let contributing_words = explain::explain(&self.normalizer, model, raw_text, self.top_n);

        let mut advisories = Vec::new();
        if tokens.is_empty() {
            advisories.push(Advisory::EmptyInput);
        }
        if score.signal == Signal::LowData {
            advisories.push(Advisory::LowData);
        }
        if self.normalizer.is_degraded() {
            advisories.push(Advisory::DegradedNormalization);
        }
        if !model.supports_explanation() {
            advisories.push(Advisory::ExplainabilityUnsupported);
        }

        let tier = classify_trust(score.label, score.confidence);
        let note = match score.signal {
            Signal::Model => NOTE_MODEL_ANALYSIS,
            Signal::LowData => NOTE_LOW_DATA,
        };

        counter!("truthlens_classifications_total", "label" => score.label.as_str()).increment(1);
        if score.signal == Signal::LowData {
            counter!("truthlens_zero_signal_total").increment(1);
        }
        debug!(
            target: "truthlens",
            id = %text_fingerprint(raw_text),
            label = %score.label,
            confidence = score.confidence,
            tier = %tier,
            tokens = tokens.len(),
            "classified"
        );

        Verdict {
            label: score.label,
            confidence: score.confidence,
            trust_tier: tier,
            rationale: rationale(tier, score.confidence, &contributing_words, self.rationale_words),
            note: note.to_string(),
            contributing_words,
            source_credibility,
            advisories,
        }
    }
}

/// Short anonymized id for logs and history; raw text is never logged.
pub fn text_fingerprint(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    digest[..6].iter().map(|b| format!("{b:02x}")).collect()
}
