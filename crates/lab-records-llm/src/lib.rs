//! Narrative analysis of lab results.
//!
//! This crate builds the analysis prompt for a visit's results, calls a hosted
//! generative model, and maps every failure to a localized explanation the
//! caller can show in place of the narrative.

pub mod analysis;
pub mod config;
pub mod gemini;
pub mod messages;
pub mod prompts;

pub use analysis::*;
pub use config::AnalysisConfig;
pub use gemini::GeminiAnalyzer;
pub use prompts::*;
