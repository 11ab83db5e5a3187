//! Anthropic Messages API 适配器

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::core::{RestyleError, RestyleResult};

use super::gateway::{send_json, GatewayConfig, GenerationGateway};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_MODEL: &str = "claude-3-7-sonnet-20250219";
pub const API_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

pub struct AnthropicGateway {
    client: Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    endpoint: String,
}

impl AnthropicGateway {
    pub fn new(client: Client, api_key: String, config: &GatewayConfig) -> Self {
        Self {
            client,
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            endpoint: format!("{}/messages", config.base_url),
        }
    }
}

/// 拼接所有文本块，没有文本块时为 `None`
fn collect_text(blocks: Vec<ContentBlock>) -> Option<String> {
    let texts: Vec<String> = blocks
        .into_iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text)
        .collect();

    if texts.is_empty() {
        None
    } else {
        Some(texts.concat())
    }
}

#[async_trait]
impl GenerationGateway for AnthropicGateway {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn generate(&self, prompt: &str) -> RestyleResult<String> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        let request = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION);
        let response: MessagesResponse = send_json(request, &body).await?;

        collect_text(response.content).ok_or_else(|| {
            RestyleError::InvalidResponse("no text blocks in Anthropic response".into())
        })
    }
}
