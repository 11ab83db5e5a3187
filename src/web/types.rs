//! Web 模块的数据类型定义

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::env::{web, EnvVar};
use crate::network::GenerationGateway;
use crate::parsers::html::Sanitizer;
use crate::utils::SnapshotLogger;

/// 应用状态
///
/// 请求之间不共享可变状态，这里只保存只读的协作对象。
#[derive(Clone)]
pub struct AppState {
    pub sanitizer: Arc<Sanitizer>,
    pub gateway: Arc<dyn GenerationGateway>,
    pub snapshots: SnapshotLogger,
    pub max_html_bytes: usize,
}

impl AppState {
    /// 使用默认清理规则、关闭快照创建状态
    pub fn new(gateway: Arc<dyn GenerationGateway>) -> Self {
        Self {
            sanitizer: Arc::new(Sanitizer::default()),
            gateway,
            snapshots: SnapshotLogger::disabled(),
            max_html_bytes: web::MaxHtmlBytes::DEFAULT.unwrap_or(usize::MAX),
        }
    }

    pub fn with_sanitizer(mut self, sanitizer: Sanitizer) -> Self {
        self.sanitizer = Arc::new(sanitizer);
        self
    }

    pub fn with_snapshots(mut self, snapshots: SnapshotLogger) -> Self {
        self.snapshots = snapshots;
        self
    }

    pub fn with_max_html_bytes(mut self, max_html_bytes: usize) -> Self {
        self.max_html_bytes = max_html_bytes;
        self
    }
}

/// 样式请求
#[derive(Debug, Deserialize)]
pub struct RestyleRequest {
    /// 美术指导
    pub prompt: String,
    /// 页面 HTML
    pub html_structure: String,
}

/// 样式响应
#[derive(Debug, Serialize, Deserialize)]
pub struct RestyleResponse {
    pub generated_style: String,
}

/// 错误响应
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}
