//! Core research pipeline: intent detection, entity extraction, multi-source
//! aggregation, validation, synthesis, and generative fallback.

pub mod aggregate;
pub mod config;
pub mod entity;
pub mod fallback;
pub mod intent;
pub mod memory;
pub mod pipeline;
pub mod synthesize;
pub mod validate;

pub use config::Settings;
pub use intent::{Intent, IntentResult};
pub use memory::{ContextSummary, MemoryEntry, MemoryStore, SourceIndexEntry};
pub use pipeline::{Pipeline, PipelineOutput};
pub use synthesize::SourceReport;
