//! The question pipeline
//!
//! Ties the pieces together: an explicit `Session` (dataset + profile +
//! ledger), the session ledger with its durable store, and the
//! orchestrator that walks one question through profile → synthesize →
//! execute → infer chart → summarize → ledger update.

pub mod ledger;
pub mod orchestrator;
pub mod session;
pub mod store;

// Re-exports
pub use ledger::{LedgerEntry, SessionLedger};
pub use orchestrator::{Answer, Orchestrator, QuestionOutcome};
pub use session::Session;
pub use store::{JsonFileStore, QueryStore};
