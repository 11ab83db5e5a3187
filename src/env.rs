//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的环境变量访问。每个变量是一个实现了 [`EnvVar`] 的单元结构体，
//! 按用途分组到子模块中。

use std::env;
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "RESTYLE_LOG_LEVEL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            match value.trim().to_lowercase().as_str() {
                level @ ("trace" | "debug" | "info" | "warn" | "error") => Ok(level.to_string()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }
}

/// Web服务器相关环境变量
pub mod web {
    use super::*;

    /// 绑定地址
    pub struct BindAddress;
    impl EnvVar<String> for BindAddress {
        const NAME: &'static str = "SERVER_HOST";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Web server bind address";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("0.0.0.0".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            let addr = value.trim();
            if addr.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Address cannot be empty".to_string(),
                });
            }
            Ok(addr.to_string())
        }
    }

    /// 端口
    pub struct Port;
    impl EnvVar<u16> for Port {
        const NAME: &'static str = "SERVER_PORT";
        const DEFAULT: Option<u16> = Some(8000);
        const DESCRIPTION: &'static str = "Web server port";

        fn parse(value: &str) -> EnvResult<u16> {
            let port: u16 = value.trim().parse().map_err(|_| EnvError {
                variable: Self::NAME.to_string(),
                message: "Must be a valid port number (1-65535)".to_string(),
            })?;

            if port == 0 {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Port cannot be 0".to_string(),
                });
            }

            Ok(port)
        }
    }

    /// HTML 输入的软上限（超过时只记录警告）
    pub struct MaxHtmlBytes;
    impl EnvVar<usize> for MaxHtmlBytes {
        const NAME: &'static str = "RESTYLE_MAX_HTML_BYTES";
        const DEFAULT: Option<usize> = Some(2 * 1024 * 1024);
        const DESCRIPTION: &'static str =
            "Soft size limit for html_structure; larger inputs are logged as a warning";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1024, usize::MAX)
        }
    }
}

/// 生成服务（LLM 提供方）相关环境变量
pub mod provider {
    use super::*;

    /// 当前启用的提供方
    pub struct Name;
    impl EnvVar<String> for Name {
        const NAME: &'static str = "RESTYLE_PROVIDER";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Generation provider: openrouter, anthropic, gemini";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("openrouter".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            match value.trim().to_lowercase().as_str() {
                "openrouter" | "or" => Ok("openrouter".to_string()),
                "anthropic" | "claude" => Ok("anthropic".to_string()),
                "gemini" | "google" => Ok("gemini".to_string()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid provider '{}'. Use: openrouter, anthropic, gemini",
                        value
                    ),
                }),
            }
        }
    }

    /// OpenRouter API 密钥
    pub struct OpenRouterApiKey;
    impl EnvVar<String> for OpenRouterApiKey {
        const NAME: &'static str = "OPENROUTER_API_KEY";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "OpenRouter API key";

        fn parse(value: &str) -> EnvResult<String> {
            parse_api_key(value, Self::NAME)
        }
    }

    /// Anthropic API 密钥
    pub struct AnthropicApiKey;
    impl EnvVar<String> for AnthropicApiKey {
        const NAME: &'static str = "ANTHROPIC_API_KEY";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Anthropic API key";

        fn parse(value: &str) -> EnvResult<String> {
            parse_api_key(value, Self::NAME)
        }
    }

    /// Google Gemini API 密钥
    pub struct GoogleApiKey;
    impl EnvVar<String> for GoogleApiKey {
        const NAME: &'static str = "GOOGLE_API_KEY";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Google Gemini API key";

        fn parse(value: &str) -> EnvResult<String> {
            parse_api_key(value, Self::NAME)
        }
    }

    /// 模型名称覆盖
    pub struct Model;
    impl EnvVar<String> for Model {
        const NAME: &'static str = "RESTYLE_MODEL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Model override (default depends on provider)";

        fn parse(value: &str) -> EnvResult<String> {
            let model = value.trim();
            if model.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Model name cannot be empty".to_string(),
                });
            }
            Ok(model.to_string())
        }
    }

    /// 最大生成长度
    pub struct MaxTokens;
    impl EnvVar<u32> for MaxTokens {
        const NAME: &'static str = "RESTYLE_MAX_TOKENS";
        const DEFAULT: Option<u32> = Some(8192);
        const DESCRIPTION: &'static str = "Maximum tokens the provider may generate";

        fn parse(value: &str) -> EnvResult<u32> {
            let tokens = parse_positive_usize(value, Self::NAME, 1, 200_000)?;
            Ok(tokens as u32)
        }
    }

    /// 上游调用超时
    pub struct Timeout;
    impl EnvVar<Duration> for Timeout {
        const NAME: &'static str = "RESTYLE_UPSTREAM_TIMEOUT";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(60));
        const DESCRIPTION: &'static str = "Upstream request timeout in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            let seconds = parse_positive_usize(value, Self::NAME, 1, 600)?;
            Ok(Duration::from_secs(seconds as u64))
        }
    }

    /// 上游基础 URL 覆盖
    pub struct ApiBaseUrl;
    impl EnvVar<String> for ApiBaseUrl {
        const NAME: &'static str = "RESTYLE_API_BASE_URL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Upstream API base URL override";

        fn parse(value: &str) -> EnvResult<String> {
            let url = value.trim().trim_end_matches('/');
            if url.starts_with("http://") || url.starts_with("https://") {
                Ok(url.to_string())
            } else {
                Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "API URL must start with http:// or https://".to_string(),
                })
            }
        }
    }
}

/// 调试快照相关环境变量
pub mod logging {
    use super::*;

    /// 保存清理后的 HTML
    pub struct HtmlEnabled;
    impl EnvVar<bool> for HtmlEnabled {
        const NAME: &'static str = "ENABLE_HTML_LOGGING";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Persist cleaned HTML to a timestamped file per request";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }

    /// 保存生成的 CSS
    pub struct CssEnabled;
    impl EnvVar<bool> for CssEnabled {
        const NAME: &'static str = "ENABLE_CSS_LOGGING";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Persist generated CSS to a timestamped file per request";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }

    /// HTML 快照目录
    pub struct HtmlDir;
    impl EnvVar<String> for HtmlDir {
        const NAME: &'static str = "RESTYLE_HTML_LOG_DIR";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Directory for cleaned HTML snapshots";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("requests".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            parse_dir(value, Self::NAME)
        }
    }

    /// CSS 快照目录
    pub struct CssDir;
    impl EnvVar<String> for CssDir {
        const NAME: &'static str = "RESTYLE_CSS_LOG_DIR";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Directory for generated CSS snapshots";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("css".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            parse_dir(value, Self::NAME)
        }
    }

    /// 在 CSS 快照中标注主机标识
    pub struct CssHostAnnotation;
    impl EnvVar<bool> for CssHostAnnotation {
        const NAME: &'static str = "RESTYLE_CSS_HOST_ANNOTATION";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Prefix CSS snapshots with the serving host's identity";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }
}

/// 占位密钥，视同未设置
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY_HERE";

/// 辅助函数
fn parse_bool(value: &str, var_name: &str) -> EnvResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "enabled" => Ok(true),
        "false" | "0" | "no" | "off" | "disabled" => Ok(false),
        _ => Err(EnvError {
            variable: var_name.to_string(),
            message: format!(
                "Invalid boolean value '{}'. Use: true/false, 1/0, yes/no, on/off, enabled/disabled",
                value
            ),
        }),
    }
}

fn parse_positive_usize(value: &str, var_name: &str, min: usize, max: usize) -> EnvResult<usize> {
    let num: usize = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid positive number".to_string(),
    })?;

    if num < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is below minimum {}", num, min),
        });
    }

    if num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} exceeds maximum {}", num, max),
        });
    }

    Ok(num)
}

pub(crate) fn parse_api_key(value: &str, var_name: &str) -> EnvResult<String> {
    let key = value.trim();
    if key.is_empty() || key == PLACEHOLDER_API_KEY {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: "API key is empty or still the placeholder".to_string(),
        });
    }
    Ok(key.to_string())
}

fn parse_dir(value: &str, var_name: &str) -> EnvResult<String> {
    let dir = value.trim();
    if dir.is_empty() {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: "Directory cannot be empty".to_string(),
        });
    }
    Ok(dir.to_string())
}

/// 加载 .env 文件
///
/// 按优先级查找，找到第一个存在的文件即停止，返回加载的文件名
pub fn load_dotenv() -> Option<&'static str> {
    let env_files = [".env.local", ".env.development", ".env.production", ".env"];

    for env_file in env_files {
        if Path::new(env_file).exists() {
            match dotenv::from_filename(env_file) {
                Ok(_) => return Some(env_file),
                Err(e) => {
                    tracing::warn!("无法加载环境变量文件 {}: {}", env_file, e);
                }
            }
        }
    }

    None
}

/// 环境变量配置汇总
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub log_level: String,

    pub server_host: String,
    pub server_port: u16,
    pub max_html_bytes: usize,

    pub provider: String,
    pub api_key_configured: bool,
    pub model: Option<String>,
    pub max_tokens: u32,
    pub upstream_timeout: Duration,
    pub api_base_url: Option<String>,

    pub html_logging: bool,
    pub css_logging: bool,
    pub html_log_dir: String,
    pub css_log_dir: String,
    pub css_host_annotation: bool,
}

impl EnvConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> EnvResult<Self> {
        let provider_name = provider::Name::get()?;
        let api_key_configured = match provider_name.as_str() {
            "anthropic" => provider::AnthropicApiKey::get().is_ok(),
            "gemini" => provider::GoogleApiKey::get().is_ok(),
            _ => provider::OpenRouterApiKey::get().is_ok(),
        };

        Ok(Self {
            log_level: core::LogLevel::get()?,

            server_host: web::BindAddress::get()?,
            server_port: web::Port::get()?,
            max_html_bytes: web::MaxHtmlBytes::get()?,

            provider: provider_name,
            api_key_configured,
            model: provider::Model::get().ok(),
            max_tokens: provider::MaxTokens::get()?,
            upstream_timeout: provider::Timeout::get()?,
            api_base_url: provider::ApiBaseUrl::get().ok(),

            html_logging: logging::HtmlEnabled::get()?,
            css_logging: logging::CssEnabled::get()?,
            html_log_dir: logging::HtmlDir::get()?,
            css_log_dir: logging::CssDir::get()?,
            css_host_annotation: logging::CssHostAnnotation::get()?,
        })
    }

    /// 打印配置摘要（隐藏敏感信息）
    pub fn print_summary(&self) {
        tracing::info!("Environment Configuration Summary:");
        tracing::info!("  Log Level: {}", self.log_level);
        tracing::info!("  Web Server: {}:{}", self.server_host, self.server_port);
        tracing::info!("  Provider: {}", self.provider);
        tracing::info!(
            "  API Key: {}",
            if self.api_key_configured { "[configured]" } else { "[missing]" }
        );
        if let Some(ref model) = self.model {
            tracing::info!("  Model: {}", model);
        }
        tracing::info!("  Upstream Timeout: {}s", self.upstream_timeout.as_secs());
        tracing::info!(
            "  HTML Logging: {}",
            if self.html_logging { "Enabled" } else { "Disabled" }
        );
        tracing::info!(
            "  CSS Logging: {}",
            if self.css_logging { "Enabled" } else { "Disabled" }
        );
    }
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    fn entry<T: fmt::Debug>(docs: &mut String, name: &str, description: &str, default: Option<T>) {
        docs.push_str(&format!("- `{}`: {} (default: {:?})\n", name, description, default));
    }

    let mut docs = String::new();
    docs.push_str("# Environment Variables Documentation\n\n");

    docs.push_str("## Core Configuration\n\n");
    entry(&mut docs, core::LogLevel::NAME, core::LogLevel::DESCRIPTION, Some("info"));

    docs.push_str("\n## Web Server Configuration\n\n");
    entry(&mut docs, web::BindAddress::NAME, web::BindAddress::DESCRIPTION, Some("0.0.0.0"));
    entry(&mut docs, web::Port::NAME, web::Port::DESCRIPTION, web::Port::DEFAULT);
    entry(
        &mut docs,
        web::MaxHtmlBytes::NAME,
        web::MaxHtmlBytes::DESCRIPTION,
        web::MaxHtmlBytes::DEFAULT,
    );

    docs.push_str("\n## Provider Configuration\n\n");
    entry(&mut docs, provider::Name::NAME, provider::Name::DESCRIPTION, Some("openrouter"));
    entry(
        &mut docs,
        provider::OpenRouterApiKey::NAME,
        provider::OpenRouterApiKey::DESCRIPTION,
        provider::OpenRouterApiKey::DEFAULT,
    );
    entry(
        &mut docs,
        provider::AnthropicApiKey::NAME,
        provider::AnthropicApiKey::DESCRIPTION,
        provider::AnthropicApiKey::DEFAULT,
    );
    entry(
        &mut docs,
        provider::GoogleApiKey::NAME,
        provider::GoogleApiKey::DESCRIPTION,
        provider::GoogleApiKey::DEFAULT,
    );
    entry(&mut docs, provider::Model::NAME, provider::Model::DESCRIPTION, provider::Model::DEFAULT);
    entry(
        &mut docs,
        provider::MaxTokens::NAME,
        provider::MaxTokens::DESCRIPTION,
        provider::MaxTokens::DEFAULT,
    );
    entry(
        &mut docs,
        provider::Timeout::NAME,
        provider::Timeout::DESCRIPTION,
        provider::Timeout::DEFAULT,
    );
    entry(
        &mut docs,
        provider::ApiBaseUrl::NAME,
        provider::ApiBaseUrl::DESCRIPTION,
        provider::ApiBaseUrl::DEFAULT,
    );

    docs.push_str("\n## Snapshot Logging Configuration\n\n");
    entry(
        &mut docs,
        logging::HtmlEnabled::NAME,
        logging::HtmlEnabled::DESCRIPTION,
        logging::HtmlEnabled::DEFAULT,
    );
    entry(
        &mut docs,
        logging::CssEnabled::NAME,
        logging::CssEnabled::DESCRIPTION,
        logging::CssEnabled::DEFAULT,
    );
    entry(&mut docs, logging::HtmlDir::NAME, logging::HtmlDir::DESCRIPTION, Some("requests"));
    entry(&mut docs, logging::CssDir::NAME, logging::CssDir::DESCRIPTION, Some("css"));
    entry(
        &mut docs,
        logging::CssHostAnnotation::NAME,
        logging::CssHostAnnotation::DESCRIPTION,
        logging::CssHostAnnotation::DEFAULT,
    );

    docs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_parsing() {
        assert!(logging::HtmlEnabled::parse("true").unwrap());
        assert!(logging::HtmlEnabled::parse("1").unwrap());
        assert!(logging::HtmlEnabled::parse("YES").unwrap());
        assert!(logging::HtmlEnabled::parse(" on ").unwrap());

        assert!(!logging::CssEnabled::parse("false").unwrap());
        assert!(!logging::CssEnabled::parse("0").unwrap());
        assert!(!logging::CssEnabled::parse("Disabled").unwrap());

        assert!(logging::CssEnabled::parse("maybe").is_err());
    }

    #[test]
    fn test_port_validation() {
        assert_eq!(web::Port::parse("8000").unwrap(), 8000);
        assert_eq!(web::Port::parse("80").unwrap(), 80);
        assert!(web::Port::parse("0").is_err());
        assert!(web::Port::parse("70000").is_err());
        assert!(web::Port::parse("http").is_err());
    }

    #[test]
    fn test_api_key_placeholder_rejected() {
        assert!(provider::OpenRouterApiKey::parse("YOUR_API_KEY_HERE").is_err());
        assert!(provider::AnthropicApiKey::parse("   ").is_err());
        assert_eq!(
            provider::GoogleApiKey::parse(" sk-live-123 ").unwrap(),
            "sk-live-123"
        );
    }

    #[test]
    fn test_provider_aliases() {
        assert_eq!(provider::Name::parse("OpenRouter").unwrap(), "openrouter");
        assert_eq!(provider::Name::parse("claude").unwrap(), "anthropic");
        assert_eq!(provider::Name::parse("google").unwrap(), "gemini");
        assert!(provider::Name::parse("llama").is_err());
    }

    #[test]
    fn test_timeout_bounds() {
        assert_eq!(
            provider::Timeout::parse("30").unwrap(),
            Duration::from_secs(30)
        );
        assert!(provider::Timeout::parse("0").is_err());
        assert!(provider::Timeout::parse("601").is_err());
    }

    #[test]
    fn test_base_url_validation() {
        assert_eq!(
            provider::ApiBaseUrl::parse("http://127.0.0.1:9000/v1/").unwrap(),
            "http://127.0.0.1:9000/v1"
        );
        assert!(provider::ApiBaseUrl::parse("ftp://example.com").is_err());
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(core::LogLevel::parse("DEBUG").unwrap(), "debug");
        assert!(core::LogLevel::parse("verbose").is_err());
    }

    #[test]
    fn test_env_docs_lists_every_group() {
        let docs = generate_env_docs();
        assert!(docs.contains("SERVER_PORT"));
        assert!(docs.contains("OPENROUTER_API_KEY"));
        assert!(docs.contains("ENABLE_CSS_LOGGING"));
        assert!(docs.contains("RESTYLE_UPSTREAM_TIMEOUT"));
    }
}
