// src/llm/client.rs

use std::time::Duration;

use serde_json::Value;

use crate::config::{Provider, ProviderConfig};
use crate::error::ProviderError;
use crate::llm::backend::TextCompletion;
use crate::llm::prompt::LlmPrompt;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Blocking HTTP client for one configured provider.
pub struct LlmClient {
    cfg: ProviderConfig,
    http: reqwest::blocking::Client,
}

impl LlmClient {
    pub fn new(cfg: ProviderConfig) -> Result<Self, ProviderError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;

        Ok(Self { cfg, http })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.cfg
    }
}

impl TextCompletion for LlmClient {
    fn complete(&self, prompt: &LlmPrompt) -> Result<String, ProviderError> {
        let (url, headers, body) = build_request(&self.cfg, prompt);
        tracing::debug!(%url, model = %self.cfg.model, "sending completion request");

        let mut req = self.http.post(&url).json(&body);
        for (k, v) in headers {
            req = req.header(k, v);
        }

        let resp = req.send()?;
        let status = resp.status();
        let text = resp.text()?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let json: Value = serde_json::from_str(&text)
            .map_err(|_| ProviderError::Decode(self.cfg.provider.label()))?;

        extract_text(&self.cfg.provider, &json)
    }
}

/* ============================================================
   Request shapes
   ============================================================ */

pub(crate) fn build_request(
    cfg: &ProviderConfig,
    prompt: &LlmPrompt,
) -> (String, Vec<(&'static str, String)>, Value) {
    let base = cfg.base_url().trim_end_matches('/').to_string();

    match cfg.provider {
        Provider::OpenAI => {
            let body = serde_json::json!({
                "model": cfg.model,
                "messages": [
                    { "role": "system", "content": prompt.system },
                    { "role": "user", "content": prompt.user }
                ],
                "temperature": cfg.temperature,
                "max_tokens": cfg.max_tokens,
            });

            (
                format!("{base}/chat/completions"),
                vec![("Authorization", format!("Bearer {}", cfg.api_key))],
                body,
            )
        }

        Provider::Anthropic => {
            let body = serde_json::json!({
                "model": cfg.model,
                "max_tokens": cfg.max_tokens,
                "temperature": cfg.temperature,
                "system": prompt.system,
                "messages": [
                    { "role": "user", "content": prompt.user }
                ]
            });

            (
                format!("{base}/messages"),
                vec![
                    ("x-api-key", cfg.api_key.clone()),
                    ("anthropic-version", ANTHROPIC_VERSION.into()),
                ],
                body,
            )
        }
    }
}

/* ============================================================
   Response shapes
   ============================================================ */

/// Pull the completion text out of a provider response.
///
/// An OpenAI response with an empty `choices` array yields empty text.
pub(crate) fn extract_text(provider: &Provider, v: &Value) -> Result<String, ProviderError> {
    match provider {
        Provider::OpenAI => {
            let choices = v
                .get("choices")
                .and_then(Value::as_array)
                .ok_or(ProviderError::Decode(provider.label()))?;

            match choices.first() {
                None => Ok(String::new()),
                Some(choice) => Ok(choice
                    .pointer("/message/content")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_owned()),
            }
        }

        Provider::Anthropic => v
            .get("content")
            .and_then(Value::as_array)
            .map(|blocks| {
                blocks
                    .iter()
                    .filter_map(|b| b.get("text").and_then(Value::as_str))
                    .collect::<Vec<_>>()
                    .join("")
            })
            .ok_or(ProviderError::Decode(provider.label())),
    }
}
