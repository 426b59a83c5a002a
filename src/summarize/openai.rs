use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Instant;

use super::Summarizer;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Summarizer backed by an OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiSummarizer {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    system_prompt: String,
}

impl OpenAiSummarizer {
    pub fn new(api_key: String, model: String, system_prompt: String) -> Self {
        OpenAiSummarizer {
            client: Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model,
            system_prompt,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn request(&self, name: &str, content: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system",
                    content: self.system_prompt.clone(),
                },
                Message {
                    role: "user",
                    content: format!("Section: {} \n Recommendations: {}", name, content),
                },
            ],
        }
    }
}

impl Summarizer for OpenAiSummarizer {
    fn summarize(
        &self,
        name: &str,
        content: &str,
    ) -> impl Future<Output = Result<String>> + Send {
        let request = self.request(name, content);
        let url = format!("{}/chat/completions", self.base_url);
        let name = name.to_string();

        async move {
            let started = Instant::now();
            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&request)
                .send()
                .await
                .with_context(|| format!("Failed to send request for section {}", name))?;

            let status = response.status();
            if !status.is_success() {
                let error_text = response.text().await.unwrap_or_default();
                anyhow::bail!(
                    "Chat completion failed for section {} ({}): {}",
                    name,
                    status,
                    error_text
                );
            }

            let chat: ChatResponse = response
                .json()
                .await
                .with_context(|| format!("Failed to parse chat completion for section {}", name))?;

            tracing::debug!(
                section = %name,
                model = %self.model,
                latency_ms = started.elapsed().as_millis() as u64,
                "received summary"
            );

            chat.choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .with_context(|| format!("Chat completion for section {} has no content", name))
        }
    }
}
