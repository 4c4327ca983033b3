//! Error taxonomy of the classification engine.
//!
//! Only [`EngineError::ModelUnavailable`] aborts a request. Every other
//! condition (empty input, zero vocabulary overlap, degraded normalization,
//! scorer without coefficients) is absorbed into a valid verdict and surfaced
//! as an [`crate::verdict::Advisory`].

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Vocabulary or model weights failed to load at startup. Permanent for
    /// the process lifetime; a restart is required.
    #[error("model unavailable: {reason}")]
    ModelUnavailable { reason: String },
}

impl EngineError {
    pub fn model_unavailable(reason: impl Into<String>) -> Self {
        Self::ModelUnavailable {
            reason: reason.into(),
        }
    }
}
