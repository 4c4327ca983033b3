//! # Source credibility
//!
//! Content-independent prior trust score for a source domain, in `[0, 100]`.
//! Advisory only: it is attached to a verdict but never changes the model's
//! label or confidence.
//!
//! - Domain is lowercased and a leading `www.` is stripped.
//! - Neutral default 50.
//! - Contains a trusted entry → 90; contains a suspicious entry → 20
//!   (suspicious is checked second and wins when both match).
//! - Ends with `.gov` / `.edu` → 95, overriding everything above.
//!
//! Known limitation of the default `substring` strategy: an unrelated domain
//! that happens to contain a listed name (e.g. "snprints.com" contains "npr")
//! is classified as that source. The `suffix` strategy only matches the
//! listed domain itself or its subdomains.

use serde::{Deserialize, Serialize};

/// How list entries are matched against a domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    #[default]
    Substring,
    Suffix,
}

impl std::str::FromStr for MatchStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "substring" => Ok(Self::Substring),
            "suffix" => Ok(Self::Suffix),
            other => anyhow::bail!("unknown credibility match strategy `{other}`"),
        }
    }
}

/// Display band derived from a credibility score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CredibilityBand {
    #[serde(rename = "High Trust")]
    HighTrust,
    #[serde(rename = "Neutral")]
    Neutral,
    #[serde(rename = "Low Trust")]
    LowTrust,
}

impl CredibilityBand {
    pub fn for_score(score: u8) -> Self {
        if score >= 80 {
            Self::HighTrust
        } else if score <= 30 {
            Self::LowTrust
        } else {
            Self::Neutral
        }
    }
}

/// Lists and scores for the heuristic, loaded from config or the built-in seed.
#[derive(Debug, Clone, Deserialize)]
pub struct CredibilityConfig {
    #[serde(default)]
    pub match_strategy: MatchStrategy,
    #[serde(default = "default_trusted")]
    pub trusted: Vec<String>,
    #[serde(default = "default_suspicious")]
    pub suspicious: Vec<String>,
    #[serde(default = "default_neutral_score")]
    pub neutral_score: u8,
    #[serde(default = "default_trusted_score")]
    pub trusted_score: u8,
    #[serde(default = "default_suspicious_score")]
    pub suspicious_score: u8,
    #[serde(default = "default_institutional_score")]
    pub institutional_score: u8,
}

fn default_neutral_score() -> u8 {
    50
}
fn default_trusted_score() -> u8 {
    90
}
fn default_suspicious_score() -> u8 {
    20
}
fn default_institutional_score() -> u8 {
    95
}

fn default_trusted() -> Vec<String> {
    [
        "bbc.co.uk",
        "bbc.com",
        "reuters.com",
        "apnews.com",
        "npr.org",
        "nytimes.com",
        "theguardian.com",
        "washingtonpost.com",
        "wsj.com",
        "bloomberg.com",
        "economist.com",
        "ft.com",
        "aljazeera.com",
        "pbs.org",
        "nature.com",
        "who.int",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_suspicious() -> Vec<String> {
    [
        "infowars",
        "naturalnews",
        "beforeitsnews",
        "worldnewsdailyreport",
        "yournewswire",
        "newspunch",
        "theonion",
        "clickhole",
        "empirenews",
        "nationalreport",
        "babylonbee",
        "dailybuzzlive",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for CredibilityConfig {
    fn default() -> Self {
        Self::default_seed()
    }
}

impl CredibilityConfig {
    /// Built-in lists of well-known outlets and known fabricated/satire sites.
    pub fn default_seed() -> Self {
        Self {
            match_strategy: MatchStrategy::Substring,
            trusted: default_trusted(),
            suspicious: default_suspicious(),
            neutral_score: default_neutral_score(),
            trusted_score: default_trusted_score(),
            suspicious_score: default_suspicious_score(),
            institutional_score: default_institutional_score(),
        }
    }
}

/// Compiled heuristic: lists lowercased once at build time.
#[derive(Debug, Clone)]
pub struct CredibilityHeuristic {
    strategy: MatchStrategy,
    trusted: Vec<String>,
    suspicious: Vec<String>,
    neutral_score: u8,
    trusted_score: u8,
    suspicious_score: u8,
    institutional_score: u8,
}

impl Default for CredibilityHeuristic {
    fn default() -> Self {
        Self::new(&CredibilityConfig::default_seed())
    }
}

impl CredibilityHeuristic {
    pub fn new(cfg: &CredibilityConfig) -> Self {
        let clean = |v: &[String]| -> Vec<String> {
            v.iter()
                .map(|s| s.trim().to_ascii_lowercase())
                .filter(|s| !s.is_empty())
                .collect()
        };
        Self {
            strategy: cfg.match_strategy,
            trusted: clean(&cfg.trusted),
            suspicious: clean(&cfg.suspicious),
            neutral_score: cfg.neutral_score.min(100),
            trusted_score: cfg.trusted_score.min(100),
            suspicious_score: cfg.suspicious_score.min(100),
            institutional_score: cfg.institutional_score.min(100),
        }
    }

    pub fn strategy(&self) -> MatchStrategy {
        self.strategy
    }

    pub fn score(&self, domain: &str) -> u8 {
        let d = normalize_domain(domain);

        if d.ends_with(".gov") || d.ends_with(".edu") {
            return self.institutional_score;
        }

        let mut score = self.neutral_score;
        if self.trusted.iter().any(|t| self.matches(&d, t)) {
            score = self.trusted_score;
        }
        if self.suspicious.iter().any(|s| self.matches(&d, s)) {
            score = self.suspicious_score;
        }
        score
    }

    fn matches(&self, domain: &str, entry: &str) -> bool {
        match self.strategy {
            MatchStrategy::Substring => domain.contains(entry),
            MatchStrategy::Suffix => {
                domain == entry
                    || domain
                        .strip_suffix(entry)
                        .is_some_and(|head| head.ends_with('.'))
            }
        }
    }
}

/// Lowercase, trim, strip one leading `www.` and a trailing dot.
pub fn normalize_domain(domain: &str) -> String {
    let d = domain.trim().to_ascii_lowercase();
    let d = d.strip_prefix("www.").unwrap_or(&d);
    d.strip_suffix('.').unwrap_or(d).to_string()
}

/// Host part of a URL: scheme, userinfo, port, path, query and fragment
/// removed. `None` when nothing host-like remains.
pub fn domain_from_url(url: &str) -> Option<String> {
    let s = url.trim();
    let rest = match s.find("://") {
        Some(i) => &s[i + 3..],
        None => s.strip_prefix("//").unwrap_or(s),
    };
    let authority = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    let host_port = authority.rsplit('@').next().unwrap_or_default();
    let host = if host_port.starts_with('[') {
        // IPv6 literal
        host_port.split(']').next().map(|h| &h[1..]).unwrap_or_default()
    } else {
        host_port.split(':').next().unwrap_or_default()
    };
    let host = host.trim().to_ascii_lowercase();
    if host.is_empty() || host.chars().any(char::is_whitespace) {
        None
    } else {
        Some(host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h() -> CredibilityHeuristic {
        CredibilityHeuristic::default()
    }

    #[test]
    fn trusted_suspicious_and_neutral() {
        let c = h();
        assert_eq!(c.score("news.bbc.com"), 90);
        assert_eq!(c.score("www.Reuters.com"), 90);
        assert_eq!(c.score("infowars.com"), 20);
        assert_eq!(c.score("myblog.net"), 50);
    }

    #[test]
    fn institutional_override_wins() {
        let c = h();
        assert_eq!(c.score("science.edu"), 95);
        assert_eq!(c.score("infowars.edu"), 95);
        assert_eq!(c.score("www.cdc.gov"), 95);
    }

    #[test]
    fn suspicious_wins_over_trusted_when_both_match() {
        let c = h();
        assert_eq!(c.score("theonion-bbc.com.fake"), 20);
    }

    #[test]
    fn substring_matching_misclassifies_lookalikes() {
        // Documented weakness of the default strategy.
        let c = h();
        assert_eq!(c.score("notreuters.com.example"), 90);
    }

    #[test]
    fn suffix_strategy_requires_domain_boundary() {
        let mut cfg = CredibilityConfig::default_seed();
        cfg.match_strategy = MatchStrategy::Suffix;
        let c = CredibilityHeuristic::new(&cfg);
        assert_eq!(c.score("news.bbc.com"), 90);
        assert_eq!(c.score("bbc.com"), 90);
        assert_eq!(c.score("notbbc.com"), 50);
        assert_eq!(c.score("reuters.com.example"), 50);
    }

    #[test]
    fn bands() {
        assert_eq!(CredibilityBand::for_score(95), CredibilityBand::HighTrust);
        assert_eq!(CredibilityBand::for_score(80), CredibilityBand::HighTrust);
        assert_eq!(CredibilityBand::for_score(50), CredibilityBand::Neutral);
        assert_eq!(CredibilityBand::for_score(30), CredibilityBand::LowTrust);
    }

    #[test]
    fn url_host_extraction() {
        assert_eq!(
            domain_from_url("https://www.bbc.com/news/world-123?x=1").as_deref(),
            Some("www.bbc.com")
        );
        assert_eq!(
            domain_from_url("http://user:pw@Example.ORG:8080/a").as_deref(),
            Some("example.org")
        );
        assert_eq!(domain_from_url("reuters.com/article").as_deref(), Some("reuters.com"));
        assert_eq!(domain_from_url("https://[::1]:80/").as_deref(), Some("::1"));
        assert_eq!(domain_from_url("   "), None);
        assert_eq!(domain_from_url("https:///path"), None);
    }

    #[test]
    fn normalize_strips_www_once() {
        assert_eq!(normalize_domain("WWW.www.site.com."), "www.site.com");
    }
}
