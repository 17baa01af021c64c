//! OpenAI-compatible chat client for intent fallback and explanations

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{AgentError, Result};
use crate::execution::Table;

/// How long the fallback classifier may block the pipeline. Explanations are
/// on-demand and carry no hard timeout, local models need time.
const CLASSIFY_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_BASE_URL: &str = "http://localhost:8000/v1";
const DEFAULT_API_KEY: &str = "lm-studio";
const DEFAULT_MODEL: &str = "qwen2.5-7b-instruct";

/// Last-resort intent classifier, consulted only after the follow-up and
/// rule-based resolvers both fail. Implementations must fail safe: transport
/// and timeout errors are reported as "no match", never as errors.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, question: &str, allowed: &[&str]) -> Option<String>;
}

/// Chat-completions client for any OpenAI-compatible endpoint.
pub struct LlmClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl LlmClient {
    pub fn new(api_key: String, model: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            base_url,
        }
    }

    /// Read endpoint settings from `OPENAI_API_KEY`, `OPENAI_MODEL` and
    /// `OPENAI_BASE_URL`, defaulting to a local lm-studio style server.
    pub fn from_env() -> Self {
        Self::new(
            std::env::var("OPENAI_API_KEY").unwrap_or_else(|_| DEFAULT_API_KEY.to_string()),
            std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        )
    }

    async fn chat(&self, prompt: &str, temperature: f64, max_tokens: u32) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": temperature,
            "max_tokens": max_tokens
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::Llm(format!("LLM API call failed: {}", e)))?;

        let response_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AgentError::Llm(format!("Failed to parse LLM response: {}", e)))?;

        let content = response_json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| AgentError::Llm("No content in LLM response".to_string()))?;

        Ok(content.trim().to_string())
    }

    /// Analyst-style explanation of a query result. Degrades to a fixed
    /// notice when the endpoint is unreachable; the data itself stands.
    pub async fn explain(&self, question: &str, table: &Table, category_context: &str) -> String {
        let comparison_instruction = if table.row_count() > 1 {
            "Compare categories where relevant and highlight differences in performance."
        } else {
            "Focus on interpreting what this single result represents and why it matters."
        };

        let prompt = format!(
            "You are a senior e-commerce data analyst.\n\n\
             User question:\n{}\n\n\
             Query result:\n{}\n\n\
             Category business context (for interpretation only):\n{}\n\n\
             Instructions:\n\
             - Base conclusions strictly on the data shown\n\
             - Do NOT invent statistics or causes\n\
             - Avoid generic filler explanations\n\
             - Explain patterns using category characteristics where relevant\n\
             - {}\n\
             - Clearly state business implications\n\n\
             Write a concise, professional explanation in 5–7 sentences.",
            question,
            table.preview(5),
            category_context,
            comparison_instruction
        );

        match self.chat(&prompt, 0.3, 300).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Explanation generation failed: {}", e);
                "⚠️ Unable to generate AI explanation at the moment. \
                 The data result above is still accurate."
                    .to_string()
            }
        }
    }
}

#[async_trait]
impl IntentClassifier for LlmClient {
    async fn classify(&self, question: &str, allowed: &[&str]) -> Option<String> {
        let prompt = format!(
            "Choose the BEST matching intent from this list:\n{:?}\n\n\
             User question:\n\"{}\"\n\n\
             Rules:\n\
             - Return ONLY the intent name\n\
             - If none match, return NONE",
            allowed, question
        );

        let reply = match tokio::time::timeout(CLASSIFY_TIMEOUT, self.chat(&prompt, 0.0, 20)).await
        {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                debug!("Intent classifier unavailable: {}", e);
                return None;
            }
            Err(_) => {
                debug!("Intent classifier timed out after {:?}", CLASSIFY_TIMEOUT);
                return None;
            }
        };

        let scrubbed = reply.to_lowercase().replace('`', "").replace('"', "");
        let intent = scrubbed.trim();
        if intent == "none" {
            return None;
        }

        allowed
            .iter()
            .copied()
            .find(|name| *name == intent)
            .map(|name| name.to_string())
    }
}
