use crate::error::AiError;
use crate::generator::InsightGenerator;
use crate::models::{ApiErrorBody, ChatMessage, ChatRequest, ChatResponse};
use crate::prompt::{build_user_prompt, SYSTEM_PROMPT};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use std::time::Duration;

const PROVIDER: &str = "OpenRouter";
const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

pub const DEFAULT_MODEL: &str = "openrouter/auto";
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Settings for [`OpenRouterProvider`].
#[derive(Debug, Clone, Default)]
pub struct OpenRouterConfig {
    /// Bearer credential. `None` makes every call fail with
    /// [`AiError::MissingApiKey`] without touching the network.
    pub api_key: Option<String>,
    /// Model identifier, `openrouter/auto` when unset.
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    /// Sent as `HTTP-Referer` for attribution on the OpenRouter dashboard.
    pub referer: Option<String>,
    /// Sent as `X-Title`.
    pub title: Option<String>,
}

/// OpenRouter chat-completion client.
#[derive(Clone)]
pub struct OpenRouterProvider {
    api_key: Option<String>,
    model: String,
    base_url: String,
    referer: Option<String>,
    title: Option<String>,
    client: Client,
}

impl OpenRouterProvider {
    pub fn new(config: OpenRouterConfig) -> Result<Self, AiError> {
        let timeout = config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()?;

        Ok(Self {
            api_key: config.api_key.filter(|k| !k.is_empty()),
            model: config
                .model
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: config
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            referer: config.referer,
            title: config.title,
            client,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> Result<&str, AiError> {
        self.api_key.as_deref().ok_or(AiError::MissingApiKey {
            env_var: API_KEY_ENV,
        })
    }

    fn with_attribution(&self, mut req: RequestBuilder) -> RequestBuilder {
        if let Some(referer) = &self.referer {
            req = req.header("HTTP-Referer", referer);
        }
        if let Some(title) = &self.title {
            req = req.header("X-Title", title);
        }
        req
    }

    async fn call_api(&self, user_prompt: String) -> Result<String, AiError> {
        let api_key = self.api_key()?;

        let req = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(user_prompt)],
        };

        tracing::debug!(
            model = %self.model,
            prompt_length = req.messages[1].content.len(),
            "Calling OpenRouter API"
        );

        let resp = self
            .with_attribution(
                self.client
                    .post(format!("{}/chat/completions", self.base_url))
                    .bearer_auth(api_key)
                    .json(&req),
            )
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body,
                "OpenRouter API request failed"
            );
            let message = ApiErrorBody::message_from(&body)
                .unwrap_or_else(|| format!("{PROVIDER} returned HTTP {}", status.as_u16()));
            return Err(AiError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let chat_resp: ChatResponse =
            serde_json::from_str(&body).map_err(|source| AiError::InvalidResponse {
                provider: PROVIDER,
                source,
            })?;

        tracing::debug!(
            usage = ?chat_resp.usage,
            model = ?chat_resp.model,
            "OpenRouter API response received"
        );

        chat_resp
            .first_content()
            .map(str::to_string)
            .ok_or(AiError::MissingContent { provider: PROVIDER })
    }
}

#[async_trait]
impl InsightGenerator for OpenRouterProvider {
    fn provider(&self) -> &str {
        "openrouter"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, csv_data: &str) -> Result<String, AiError> {
        self.call_api(build_user_prompt(csv_data)).await
    }

    /// Lists available models instead of running a generation.
    async fn health_check(&self) -> Result<(), AiError> {
        let api_key = self.api_key()?;

        let resp = self
            .client
            .get(format!("{}/models", self.base_url))
            .bearer_auth(api_key)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(AiError::Upstream {
                status: status.as_u16(),
                message: format!("{PROVIDER} returned HTTP {}", status.as_u16()),
            })
        }
    }
}
