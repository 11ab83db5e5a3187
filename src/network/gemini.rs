//! Google Gemini generateContent 适配器

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::core::{RestyleError, RestyleResult};

use super::gateway::{send_json, GatewayConfig, GenerationGateway};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro-preview-03-25";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

pub struct GeminiGateway {
    client: Client,
    api_key: String,
    max_tokens: u32,
    endpoint: String,
}

impl GeminiGateway {
    pub fn new(client: Client, api_key: String, config: &GatewayConfig) -> Self {
        Self {
            client,
            api_key,
            max_tokens: config.max_tokens,
            endpoint: format!("{}/models/{}:generateContent", config.base_url, config.model),
        }
    }
}

/// 第一个候选结果的全部文本
fn first_candidate_text(response: GenerateResponse) -> Option<String> {
    let parts = response.candidates.into_iter().next()?.content?.parts;
    let texts: Vec<String> = parts.into_iter().filter_map(|part| part.text).collect();

    if texts.is_empty() {
        None
    } else {
        Some(texts.concat())
    }
}

#[async_trait]
impl GenerationGateway for GeminiGateway {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> RestyleResult<String> {
        let body = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.max_tokens,
            },
        };

        let request = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key);
        let response: GenerateResponse = send_json(request, &body).await?;

        first_candidate_text(response).ok_or_else(|| {
            RestyleError::InvalidResponse("Failed to generate style from Gemini API.".into())
        })
    }
}
