//! Web 服务器配置
//!
//! 使用类型安全的环境变量系统进行配置管理

use crate::env::{web, EnvError, EnvResult, EnvVar};
use crate::network::GatewayConfig;
use crate::utils::SnapshotConfig;

/// Web 服务器配置
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// 绑定地址
    pub bind_addr: String,
    /// 端口
    pub port: u16,
    /// HTML 输入软上限（字节）
    pub max_html_bytes: usize,
    /// 生成服务配置
    pub gateway: GatewayConfig,
    /// 调试快照配置
    pub snapshots: SnapshotConfig,
}

impl WebConfig {
    /// 从环境变量创建配置
    pub fn from_env() -> EnvResult<Self> {
        Ok(Self {
            bind_addr: web::BindAddress::get()?,
            port: web::Port::get()?,
            max_html_bytes: web::MaxHtmlBytes::get()?,
            gateway: GatewayConfig::from_env()?,
            snapshots: SnapshotConfig::from_env()?,
        })
    }

    /// 验证配置
    pub fn validate(&self) -> EnvResult<()> {
        if self.bind_addr.trim().is_empty() {
            return Err(EnvError {
                variable: web::BindAddress::NAME.to_string(),
                message: "Bind address cannot be empty".to_string(),
            });
        }

        if self.port == 0 {
            return Err(EnvError {
                variable: web::Port::NAME.to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if self.gateway.api_key.is_none() {
            tracing::warn!(
                "{} 未设置或仍为占位值，所有请求都会失败",
                self.gateway.provider.credential_var()
            );
        }

        Ok(())
    }

    /// 获取完整的监听地址
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self::from_env().unwrap_or_else(|e| {
            tracing::warn!("Failed to load web config from environment: {}. Using defaults.", e);
            Self {
                bind_addr: "0.0.0.0".to_string(),
                port: 8000,
                max_html_bytes: 2 * 1024 * 1024,
                gateway: GatewayConfig::new(Default::default()),
                snapshots: SnapshotConfig::default(),
            }
        })
    }
}
