//! history.rs: capped in-memory log of classifications for the dashboard.
//!
//! Only an anonymized fingerprint of the text is kept, never the text itself.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Mutex, MutexGuard};

use crate::engine::text_fingerprint;
use crate::model::Label;
use crate::trust::TrustTier;
use crate::verdict::{Provenance, Verdict};

pub const DEFAULT_CAPACITY: usize = 2000;
const MAX_CAPACITY: usize = 10_000;

/// Input channel a scan came through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Typed,
    Url,
    Feed,
}

impl From<&Provenance> for Channel {
    fn from(p: &Provenance) -> Self {
        match p {
            Provenance::Typed => Channel::Typed,
            Provenance::Url { .. } => Channel::Url,
            Provenance::Feed { .. } => Channel::Feed,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub channel: Channel,
    pub text_id: String,
    pub prediction: Label,
    pub confidence: f64,
    pub display_status: TrustTier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistoryStats {
    pub total_scans: usize,
    /// Share of FAKE verdicts in percent, one decimal.
    pub fake_percentage: f64,
}

#[derive(Debug)]
pub struct History {
    inner: Mutex<Vec<HistoryEntry>>,
    cap: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl History {
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.clamp(1, MAX_CAPACITY);
        Self {
            inner: Mutex::new(Vec::with_capacity(cap)),
            cap,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<HistoryEntry>> {
        // A panicked writer leaves at worst a truncated log; keep serving it.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn record(&self, channel: Channel, raw_text: &str, v: &Verdict) {
        let entry = HistoryEntry {
            timestamp: Utc::now(),
            channel,
            text_id: text_fingerprint(raw_text),
            prediction: v.label,
            confidence: v.confidence,
            display_status: v.trust_tier,
            domain: v.source_credibility.as_ref().map(|c| c.domain.clone()),
        };
        self.push(entry);
    }

    pub fn push(&self, entry: HistoryEntry) {
        let mut v = self.lock();
        v.push(entry);
        if v.len() > self.cap {
            let excess = v.len() - self.cap;
            v.drain(0..excess);
        }
    }

    /// Oldest first.
    pub fn snapshot_last_n(&self, n: usize) -> Vec<HistoryEntry> {
        let v = self.lock();
        let start = v.len().saturating_sub(n);
        v[start..].to_vec()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> HistoryStats {
        let v = self.lock();
        let total = v.len();
        let fake = v.iter().filter(|e| e.prediction == Label::Fake).count();
        let pct = if total == 0 {
            0.0
        } else {
            ((fake as f64 / total as f64) * 1000.0).round() / 10.0
        };
        HistoryStats {
            total_scans: total,
            fake_percentage: pct,
        }
    }
}
