//! 生成服务网关
//!
//! 对外只暴露 [`GenerationGateway`]：给定指令，返回模型生成的文本。
//! 每个部署只启用一个提供方，不做运行时回退。

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::core::{RestyleError, RestyleResult};
use crate::env::{parse_api_key, provider, EnvResult, EnvVar};

use super::anthropic::AnthropicGateway;
use super::gemini::GeminiGateway;
use super::openrouter::OpenRouterGateway;

/// 生成服务抽象
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    /// 提供方名称（用于日志）
    fn name(&self) -> &str;

    /// 检查网关是否可用，配置错误时立即失败
    fn ensure_ready(&self) -> RestyleResult<()> {
        Ok(())
    }

    /// 发送指令并返回生成的文本
    async fn generate(&self, prompt: &str) -> RestyleResult<String>;
}

/// 已知的提供方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    #[default]
    OpenRouter,
    Anthropic,
    Gemini,
}

impl Provider {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "openrouter" | "or" => Some(Provider::OpenRouter),
            "anthropic" | "claude" => Some(Provider::Anthropic),
            "gemini" | "google" => Some(Provider::Gemini),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenRouter => "openrouter",
            Provider::Anthropic => "anthropic",
            Provider::Gemini => "gemini",
        }
    }

    /// 面向用户的名称
    pub fn label(&self) -> &'static str {
        match self {
            Provider::OpenRouter => "OpenRouter",
            Provider::Anthropic => "Anthropic",
            Provider::Gemini => "Gemini",
        }
    }

    /// 凭据所在的环境变量
    pub fn credential_var(&self) -> &'static str {
        match self {
            Provider::OpenRouter => provider::OpenRouterApiKey::NAME,
            Provider::Anthropic => provider::AnthropicApiKey::NAME,
            Provider::Gemini => provider::GoogleApiKey::NAME,
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::OpenRouter => super::openrouter::DEFAULT_MODEL,
            Provider::Anthropic => super::anthropic::DEFAULT_MODEL,
            Provider::Gemini => super::gemini::DEFAULT_MODEL,
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::OpenRouter => super::openrouter::DEFAULT_BASE_URL,
            Provider::Anthropic => super::anthropic::DEFAULT_BASE_URL,
            Provider::Gemini => super::gemini::DEFAULT_BASE_URL,
        }
    }

    fn read_credential(&self) -> Option<String> {
        match self {
            Provider::OpenRouter => provider::OpenRouterApiKey::get().ok(),
            Provider::Anthropic => provider::AnthropicApiKey::get().ok(),
            Provider::Gemini => provider::GoogleApiKey::get().ok(),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 网关配置
#[derive(Clone)]
pub struct GatewayConfig {
    pub provider: Provider,
    /// 缺失或为占位值时为 `None`
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub base_url: String,
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GatewayConfig {
    /// 使用提供方默认值创建配置（不含凭据）
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            api_key: None,
            model: provider.default_model().to_string(),
            max_tokens: 8192,
            timeout: Duration::from_secs(60),
            base_url: provider.default_base_url().to_string(),
        }
    }

    /// 从环境变量加载
    pub fn from_env() -> EnvResult<Self> {
        let name = provider::Name::get()?;
        let selected = Provider::parse(&name).unwrap_or_default();

        let mut config = Self::new(selected);
        config.api_key = selected.read_credential();
        if let Ok(model) = provider::Model::get() {
            config.model = model;
        }
        config.max_tokens = provider::MaxTokens::get()?;
        config.timeout = provider::Timeout::get()?;
        if let Ok(base_url) = provider::ApiBaseUrl::get() {
            config.base_url = base_url;
        }

        Ok(config)
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let key = api_key.into();
        self.api_key = parse_api_key(&key, self.provider.credential_var()).ok();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// 凭据缺失时返回的配置错误
    pub fn missing_credential_error(&self) -> RestyleError {
        RestyleError::config(format!(
            "{} API key not initialized. Check {} in .env.",
            self.provider.label(),
            self.provider.credential_var()
        ))
    }
}

/// 配置不完整时使用的网关：每个请求都立即失败
pub struct MisconfiguredGateway {
    name: &'static str,
    error: RestyleError,
}

impl MisconfiguredGateway {
    pub fn new(provider: Provider, error: RestyleError) -> Self {
        Self {
            name: provider.as_str(),
            error,
        }
    }
}

#[async_trait]
impl GenerationGateway for MisconfiguredGateway {
    fn name(&self) -> &str {
        self.name
    }

    fn ensure_ready(&self) -> RestyleResult<()> {
        Err(self.error.clone())
    }

    async fn generate(&self, _prompt: &str) -> RestyleResult<String> {
        Err(self.error.clone())
    }
}

/// 根据配置创建网关
///
/// 凭据缺失或 HTTP 客户端无法创建时返回 [`MisconfiguredGateway`]，服务仍可启动。
pub fn build_gateway(config: &GatewayConfig) -> Arc<dyn GenerationGateway> {
    let Some(api_key) = config.api_key.clone() else {
        let error = config.missing_credential_error();
        tracing::warn!("{}", error);
        return Arc::new(MisconfiguredGateway::new(config.provider, error));
    };

    let client = match http_client(config.timeout) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("无法创建 HTTP 客户端: {}", e);
            return Arc::new(MisconfiguredGateway::new(config.provider, e));
        }
    };

    tracing::info!(
        "生成服务: {} (model: {}, timeout: {}s)",
        config.provider,
        config.model,
        config.timeout.as_secs()
    );

    match config.provider {
        Provider::OpenRouter => Arc::new(OpenRouterGateway::new(client, api_key, config)),
        Provider::Anthropic => Arc::new(AnthropicGateway::new(client, api_key, config)),
        Provider::Gemini => Arc::new(GeminiGateway::new(client, api_key, config)),
    }
}

fn http_client(timeout: Duration) -> RestyleResult<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("restyle-relay/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| RestyleError::Internal(format!("failed to build HTTP client: {}", e)))
}

/// 发送 JSON 请求并解析 JSON 响应
///
/// 非 2xx 响应转换为带状态码和响应体的上游错误。
pub(crate) async fn send_json<B, R>(request: RequestBuilder, body: &B) -> RestyleResult<R>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let response = request.json(body).send().await?;
    let status = response.status();

    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(RestyleError::upstream(Some(status.as_u16()), text));
    }

    Ok(response.json::<R>().await?)
}
