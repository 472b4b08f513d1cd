// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Best-effort advisory text from an OpenAI-compatible chat completions API.
//!
//! Provider failures never reach the caller: they are logged and replaced by
//! [`FALLBACK_RECOMMENDATIONS`]. The only error surfaced is a missing API key.

use crate::config::Config;
use crate::error::AppError;
use anyhow::Context;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

pub const FALLBACK_RECOMMENDATIONS: &str =
    "Failed to generate recommendations. Please try again later.";
pub const EMPTY_RECOMMENDATIONS: &str = "No recommendations generated.";

const SYSTEM_MESSAGE: &str =
    "You are an expert energy efficiency consultant for Longhorn Solar in Central Texas.";

/// Context for one advisory request.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdvisoryRequest {
    #[validate(length(min = 1))]
    pub service_name: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub other_selected_services: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
enum AdvisoryError {
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("provider returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("unexpected response format: {0}")]
    Parse(String),
}

#[derive(Clone)]
struct ProviderSettings {
    api_key: String,
    endpoint: String,
    model: String,
}

/// Advisory text generator.
#[derive(Clone)]
pub struct AdvisoryGenerator {
    client: reqwest::Client,
    timeout_secs: u64,
    provider: Option<ProviderSettings>,
}

impl AdvisoryGenerator {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()
            .context("failed building advisory HTTP client")?;

        let provider = config
            .llm_api_key
            .as_ref()
            .filter(|key| !key.trim().is_empty())
            .map(|key| ProviderSettings {
                api_key: key.clone(),
                endpoint: config.llm_endpoint.clone(),
                model: config.llm_model.clone(),
            });

        match &provider {
            Some(p) => tracing::info!(endpoint = %p.endpoint, model = %p.model, "Advisory generator configured"),
            None => tracing::warn!("LLM_API_KEY not set; advisory endpoint will be unavailable"),
        }

        Ok(Self {
            client,
            timeout_secs: config.upstream_timeout.as_secs(),
            provider,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Generate advisory text for `request`.
    ///
    /// Returns `AdvisoryUnavailable` only when no provider is configured.
    pub async fn generate(&self, request: &AdvisoryRequest) -> Result<String, AppError> {
        let provider = self
            .provider
            .as_ref()
            .ok_or(AppError::AdvisoryUnavailable)?;

        match self.complete(provider, &build_prompt(request)).await {
            Ok(text) => Ok(text),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    service = %request.service_name,
                    "Advisory generation failed; returning fallback"
                );
                Ok(FALLBACK_RECOMMENDATIONS.to_string())
            }
        }
    }

    async fn complete(
        &self,
        provider: &ProviderSettings,
        prompt: &str,
    ) -> Result<String, AdvisoryError> {
        let body = json!({
            "model": provider.model,
            "messages": [
                { "role": "system", "content": SYSTEM_MESSAGE },
                { "role": "user", "content": prompt },
            ]
        });

        tracing::debug!(endpoint = %provider.endpoint, model = %provider.model, "Sending advisory request");

        let response = self
            .client
            .post(&provider.endpoint)
            .bearer_auth(&provider.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AdvisoryError::Timeout(self.timeout_secs)
                } else {
                    AdvisoryError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdvisoryError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AdvisoryError::Parse(e.to_string()))?;

        extract_content(&value)
    }
}

/// Pull the first choice's message content out of a chat completions body.
fn extract_content(value: &serde_json::Value) -> Result<String, AdvisoryError> {
    let message = value
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .ok_or_else(|| AdvisoryError::Parse(value.to_string()))?;

    match message.get("content") {
        Some(serde_json::Value::String(text)) if !text.trim().is_empty() => Ok(text.clone()),
        Some(serde_json::Value::String(_)) | Some(serde_json::Value::Null) | None => {
            Ok(EMPTY_RECOMMENDATIONS.to_string())
        }
        Some(other) => Err(AdvisoryError::Parse(other.to_string())),
    }
}

fn build_prompt(request: &AdvisoryRequest) -> String {
    let others = if request.other_selected_services.is_empty() {
        "none".to_string()
    } else {
        request.other_selected_services.join(", ")
    };

    format!(
        r#"You are a senior technical consultant for Longhorn Solar, an expert in residential energy efficiency in Central Texas.

The user is configuring the service: "{service}".
The overall project currently includes: [{others}].

Site conditions and specific client notes:
"{notes}"

Analyze the project and provide a professional brief focused on:

1. **Price & Scope Impact**: Identify specific site conditions mentioned that will likely increase or decrease the final price (e.g., roof age, narrow access, electrical panel capacity).
2. **Order of Operations**: If multiple services are selected, what is the mandatory or recommended sequence? (e.g., "Do the energy audit/sealing before the HVAC sizing").
3. **Longhorn Synergy Opportunities**: How does this service benefit from or improve the other selected offerings? If there's a logical missing piece (e.g., Solar without a Smart Thermostat), recommend it.
4. **Critical Pitfalls**: Specific Central Texas construction risks (Heat, humidity, attic accessibility).

Format the output with bold headers. Keep it professional, high-value, and concise enough for a busy project manager.
"#,
        service = request.service_name,
        others = others,
        notes = request.notes,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn request(others: &[&str]) -> AdvisoryRequest {
        AdvisoryRequest {
            service_name: "Solar".to_string(),
            notes: "South-facing roof, 15 years old".to_string(),
            other_selected_services: others.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_prompt_embeds_inputs() {
        let prompt = build_prompt(&request(&["Batteries", "Smart Thermostat"]));
        assert!(prompt.contains("configuring the service: \"Solar\""));
        assert!(prompt.contains("[Batteries, Smart Thermostat]"));
        assert!(prompt.contains("\"South-facing roof, 15 years old\""));
        assert!(prompt.contains("**Critical Pitfalls**"));
    }

    #[test]
    fn test_prompt_with_no_other_services() {
        let prompt = build_prompt(&request(&[]));
        assert!(prompt.contains("currently includes: [none]"));
    }

    #[test]
    fn test_request_defaults() {
        let req: AdvisoryRequest =
            serde_json::from_value(json!({ "serviceName": "Insulation" })).unwrap();
        assert_eq!(req.notes, "");
        assert!(req.other_selected_services.is_empty());
    }

    #[test]
    fn test_extract_content() {
        let ok = json!({ "choices": [{ "message": { "content": "**Brief**" } }] });
        assert_eq!(extract_content(&ok).unwrap(), "**Brief**");

        let empty = json!({ "choices": [{ "message": { "content": "" } }] });
        assert_eq!(extract_content(&empty).unwrap(), EMPTY_RECOMMENDATIONS);

        let malformed = json!({ "error": "quota" });
        assert!(matches!(
            extract_content(&malformed),
            Err(AdvisoryError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_unconfigured_is_unavailable() {
        let generator = AdvisoryGenerator::new(&Config::test_default()).unwrap();
        assert!(!generator.is_configured());

        let err = generator.generate(&request(&[])).await.unwrap_err();
        assert!(matches!(err, AppError::AdvisoryUnavailable));
    }

    #[tokio::test]
    async fn test_unreachable_provider_falls_back() {
        let mut config = Config::test_default();
        config.llm_api_key = Some("test-key".to_string());
        config.llm_endpoint = "http://127.0.0.1:1/v1/chat/completions".to_string();
        config.upstream_timeout = Duration::from_secs(1);

        let generator = AdvisoryGenerator::new(&config).unwrap();
        let text = generator.generate(&request(&["Batteries"])).await.unwrap();
        assert_eq!(text, FALLBACK_RECOMMENDATIONS);
    }
}
