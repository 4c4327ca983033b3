// src/config/mod.rs
//! Runtime configuration: TOML file + environment overrides.

pub mod engine;

pub use engine::{EngineConfig, ExplainSection, LexiconSection, ModelSection};
