//! Scripted language agent for tests and offline demos
//!
//! Replays a queue of canned replies in order; running past the end is an
//! error, which doubles as the agent-unavailable case in pipeline tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

use dq_core::LanguageAgent;

/// Queue-backed agent that replays canned replies
pub struct ScriptedAgent {
    name: String,
    replies: Mutex<VecDeque<String>>,
}

impl ScriptedAgent {
    pub fn new(name: impl Into<String>, replies: Vec<String>) -> Self {
        Self {
            name: name.into(),
            replies: Mutex::new(replies.into()),
        }
    }

    /// Agent whose every call fails, for exercising the unavailable path
    pub fn unavailable(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }
}

#[async_trait]
impl LanguageAgent for ScriptedAgent {
    async fn run(&self, _prompt: &str) -> anyhow::Result<String> {
        self.replies
            .lock()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("scripted agent '{}' has no reply queued", self.name))
    }

    fn agent_name(&self) -> &str {
        &self.name
    }
}
