//! 调试快照
//!
//! 开启后，每个请求清理后的 HTML 和生成的 CSS 会写入带时间戳的文件，方便人工排查。
//! 文件名形如 `{时间戳}_{指令前缀}.{扩展名}`，同一秒内相同前缀的请求会相互覆盖。

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::core::RestyleResult;
use crate::env::{logging, EnvResult, EnvVar};

/// 文件名中保留的指令前缀长度
pub const PROMPT_PREFIX_LEN: usize = 30;

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// 快照配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotConfig {
    pub html_enabled: bool,
    pub css_enabled: bool,
    pub html_dir: PathBuf,
    pub css_dir: PathBuf,
    /// 在 CSS 快照开头标注主机标识
    pub host_annotation: bool,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            html_enabled: false,
            css_enabled: false,
            html_dir: PathBuf::from("requests"),
            css_dir: PathBuf::from("css"),
            host_annotation: false,
        }
    }
}

impl SnapshotConfig {
    pub fn from_env() -> EnvResult<Self> {
        Ok(Self {
            html_enabled: logging::HtmlEnabled::get()?,
            css_enabled: logging::CssEnabled::get()?,
            html_dir: PathBuf::from(logging::HtmlDir::get()?),
            css_dir: PathBuf::from(logging::CssDir::get()?),
            host_annotation: logging::CssHostAnnotation::get()?,
        })
    }
}

/// 快照写入器
#[derive(Debug, Clone)]
pub struct SnapshotLogger {
    config: SnapshotConfig,
    host: String,
}

impl SnapshotLogger {
    pub fn new(config: SnapshotConfig) -> Self {
        Self {
            config,
            host: host_identity(),
        }
    }

    /// 不写任何文件的实例
    pub fn disabled() -> Self {
        Self::new(SnapshotConfig::default())
    }

    pub fn config(&self) -> &SnapshotConfig {
        &self.config
    }

    /// 保存清理后的 HTML，未开启时返回 `Ok(None)`
    pub fn save_html(&self, cleaned_html: &str, prompt: &str) -> RestyleResult<Option<PathBuf>> {
        if !self.config.html_enabled {
            return Ok(None);
        }
        write_snapshot(&self.config.html_dir, prompt, "html", cleaned_html).map(Some)
    }

    /// 保存生成的 CSS，未开启时返回 `Ok(None)`
    pub fn save_css(&self, css: &str, prompt: &str) -> RestyleResult<Option<PathBuf>> {
        if !self.config.css_enabled {
            return Ok(None);
        }

        if self.config.host_annotation {
            let annotated = format!("/* host: {} */\n{}", self.host, css);
            write_snapshot(&self.config.css_dir, prompt, "css", &annotated).map(Some)
        } else {
            write_snapshot(&self.config.css_dir, prompt, "css", css).map(Some)
        }
    }
}

fn write_snapshot(dir: &Path, prompt: &str, extension: &str, contents: &str) -> RestyleResult<PathBuf> {
    fs::create_dir_all(dir)?;

    let path = dir.join(snapshot_filename(prompt, extension));
    fs::write(&path, contents)?;

    tracing::debug!("快照已保存: {}", path.display());
    Ok(path)
}

/// 把指令转换为可用于文件名的前缀
///
/// 只保留字母数字、空格、下划线和连字符，截取前 30 个字符，去掉首尾空白后把空格换成下划线。
pub fn safe_prompt_prefix(prompt: &str) -> String {
    let kept: String = prompt
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .take(PROMPT_PREFIX_LEN)
        .collect();

    kept.trim().replace(' ', "_")
}

/// 当前时间对应的快照文件名
pub fn snapshot_filename(prompt: &str, extension: &str) -> String {
    format!(
        "{}_{}.{}",
        Local::now().format(TIMESTAMP_FORMAT),
        safe_prompt_prefix(prompt),
        extension
    )
}

fn host_identity() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
