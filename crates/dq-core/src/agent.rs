//! The seam to the external natural-language agents
//!
//! The core consumes the language model as a black box: a prompt goes in,
//! free-form text comes out. Nothing here validates that text; a SQL reply
//! is opaque until the sandbox tries to run it.

use async_trait::async_trait;

/// Trait for external language-model agents
#[async_trait]
pub trait LanguageAgent: Send + Sync {
    /// Send a prompt and wait for the agent's full reply.
    ///
    /// The call blocks the pipeline until the agent returns; the core
    /// enforces no timeout and performs no retries.
    async fn run(&self, prompt: &str) -> anyhow::Result<String>;

    /// Human-readable name for logging
    fn agent_name(&self) -> &str;
}
