//! Core abstractions for the conversational data explorer
//!
//! This crate provides the error taxonomy, the pipeline event bus, and the
//! seam to the external language-model agents. It knows nothing about
//! tables or charts; those live in `dq-data` and `dq-chart`.

pub mod agent;
pub mod error;
pub mod events;

// Re-export commonly used types
pub use agent::LanguageAgent;
pub use error::PipelineError;
pub use events::EventBus;
