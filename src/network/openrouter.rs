//! OpenRouter 适配器（OpenAI 兼容的 chat completions 接口）

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::core::{RestyleError, RestyleResult};

use super::gateway::{send_json, GatewayConfig, GenerationGateway};

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "openai/gpt-4.1-mini";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenRouterGateway {
    client: Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    endpoint: String,
}

impl OpenRouterGateway {
    pub fn new(client: Client, api_key: String, config: &GatewayConfig) -> Self {
        Self {
            client,
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            endpoint: format!("{}/chat/completions", config.base_url),
        }
    }
}

#[async_trait]
impl GenerationGateway for OpenRouterGateway {
    fn name(&self) -> &str {
        "openrouter"
    }

    async fn generate(&self, prompt: &str) -> RestyleResult<String> {
        let body = ChatRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let request = self.client.post(&self.endpoint).bearer_auth(&self.api_key);
        let response: ChatResponse = send_json(request, &body).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| RestyleError::InvalidResponse("no choices in OpenRouter response".into()))
    }
}
