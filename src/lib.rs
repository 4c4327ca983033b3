// src/lib.rs
// Public library surface for the service binary and integration tests.

pub mod api;
pub mod config;
pub mod credibility;
pub mod engine;
pub mod error;
pub mod explain;
pub mod history;
pub mod metrics;
pub mod model;
pub mod normalize;
pub mod trust;
pub mod verdict;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::config::EngineConfig;
pub use crate::engine::{Capabilities, Engine, EngineHandle};
pub use crate::error::EngineError;
pub use crate::model::{Label, Model};
pub use crate::normalize::Normalizer;
pub use crate::trust::TrustTier;
pub use crate::verdict::{Advisory, Document, Verdict, WordContribution};
