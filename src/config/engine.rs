// src/config/engine.rs
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::credibility::{CredibilityConfig, MatchStrategy};
use crate::explain::DEFAULT_TOP_N;

pub const DEFAULT_CONFIG_PATH: &str = "config/truthlens.toml";
pub const DEFAULT_MODEL_PATH: &str = "models/model_v1.json";

pub const ENV_CONFIG_PATH: &str = "TRUTHLENS_CONFIG_PATH";
pub const ENV_MODEL_PATH: &str = "TRUTHLENS_MODEL_PATH";
pub const ENV_TOP_N: &str = "TRUTHLENS_TOP_N";
pub const ENV_CREDIBILITY_MATCH: &str = "TRUTHLENS_CREDIBILITY_MATCH";

const MAX_TOP_N: usize = 50;

fn default_model_path() -> PathBuf {
    PathBuf::from(DEFAULT_MODEL_PATH)
}
fn default_top_n() -> usize {
    DEFAULT_TOP_N
}
fn default_rationale_words() -> usize {
    3
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelSection {
    #[serde(default = "default_model_path")]
    pub path: PathBuf,
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            path: default_model_path(),
        }
    }
}

/// Both paths absent → built-in English resources.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LexiconSection {
    #[serde(default)]
    pub stopwords_path: Option<PathBuf>,
    #[serde(default)]
    pub lemmas_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExplainSection {
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Words quoted in the rationale sentence.
    #[serde(default = "default_rationale_words")]
    pub rationale_words: usize,
}

impl Default for ExplainSection {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            rationale_words: default_rationale_words(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub model: ModelSection,
    #[serde(default)]
    pub lexicon: LexiconSection,
    #[serde(default)]
    pub explain: ExplainSection,
    #[serde(default)]
    pub credibility: CredibilityConfig,
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: EngineConfig = toml::from_str(s)?;
        cfg.sanitize();
        Ok(cfg)
    }

    /// Load from an explicit path. A missing file yields defaults; a file that
    /// exists but does not parse is an error.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(target: "truthlens", path = %path.display(), "config file not found; using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading engine config from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing engine config at {}", path.display()))
    }

    /// Resolve the path from `TRUTHLENS_CONFIG_PATH` (or the default), load it,
    /// then apply env overrides.
    pub fn from_env() -> Result<Self> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        let mut cfg = Self::load_from_file(&path)?;
        cfg.apply_env_overrides()?;
        Ok(cfg)
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(p) = std::env::var(ENV_MODEL_PATH) {
            if !p.trim().is_empty() {
                self.model.path = PathBuf::from(p.trim());
            }
        }
        if let Some(n) = parse_top_n_env(std::env::var(ENV_TOP_N).ok()) {
            self.explain.top_n = n;
        }
        if let Ok(s) = std::env::var(ENV_CREDIBILITY_MATCH) {
            self.credibility.match_strategy = s
                .parse::<MatchStrategy>()
                .with_context(|| format!("invalid {ENV_CREDIBILITY_MATCH}"))?;
        }
        self.sanitize();
        Ok(())
    }

    fn sanitize(&mut self) {
        self.explain.top_n = self.explain.top_n.clamp(1, MAX_TOP_N);
        self.explain.rationale_words = self.explain.rationale_words.min(self.explain.top_n);
    }
}

// parse optional integer env and clamp to 1..=MAX_TOP_N
fn parse_top_n_env(raw: Option<String>) -> Option<usize> {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .map(|v| v.clamp(1, MAX_TOP_N))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let c = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(c.model.path, PathBuf::from(DEFAULT_MODEL_PATH));
        assert_eq!(c.explain.top_n, 5);
        assert_eq!(c.explain.rationale_words, 3);
        assert_eq!(c.credibility.trusted_score, 90);
        assert!(c.lexicon.stopwords_path.is_none());
    }

    #[test]
    fn sections_override_defaults() {
        let c = EngineConfig::from_toml_str(
            r#"
[model]
path = "/srv/models/m.json"

[explain]
top_n = 2
rationale_words = 3

[credibility]
match_strategy = "suffix"
trusted = ["example.org"]
"#,
        )
        .unwrap();
        assert_eq!(c.model.path, PathBuf::from("/srv/models/m.json"));
        assert_eq!(c.explain.top_n, 2);
        assert_eq!(c.explain.rationale_words, 2, "capped by top_n");
        assert_eq!(c.credibility.match_strategy, MatchStrategy::Suffix);
        assert_eq!(c.credibility.trusted, vec!["example.org".to_string()]);
        assert!(!c.credibility.suspicious.is_empty(), "unset list keeps seed");
    }

    #[test]
    fn top_n_env_parsing() {
        assert_eq!(parse_top_n_env(Some(" 7 ".into())), Some(7));
        assert_eq!(parse_top_n_env(Some("0".into())), Some(1));
        assert_eq!(parse_top_n_env(Some("999".into())), Some(MAX_TOP_N));
        assert_eq!(parse_top_n_env(Some("many".into())), None);
        assert_eq!(parse_top_n_env(None), None);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(EngineConfig::from_toml_str("[model\npath=").is_err());
    }
}
