//! Ollama-backed language agent
//!
//! Talks to a local Ollama server over its non-streaming generate
//! endpoint. Transport and decode failures surface as errors for the
//! orchestrator to classify; nothing is retried here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use dq_core::LanguageAgent;

const DEFAULT_ENDPOINT: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "mistral";

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Language agent backed by a local Ollama server
pub struct OllamaAgent {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    name: String,
}

impl OllamaAgent {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_model(name, DEFAULT_MODEL)
    }

    pub fn with_model(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: model.into(),
            name: name.into(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl LanguageAgent for OllamaAgent {
    async fn run(&self, prompt: &str) -> anyhow::Result<String> {
        let url = format!("{}/api/generate", self.endpoint);
        debug!(agent = %self.name, model = %self.model, "calling ollama");

        let response = self
            .client
            .post(&url)
            .json(&GenerateRequest {
                model: &self.model,
                prompt,
                stream: false,
            })
            .send()
            .await?
            .error_for_status()?;

        let body: GenerateResponse = response.json().await?;
        Ok(body.response)
    }

    fn agent_name(&self) -> &str {
        &self.name
    }
}
