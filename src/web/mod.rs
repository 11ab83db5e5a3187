//! Web 服务器模块
//!
//! 提供 `POST /restyle`：接收页面 HTML 与美术指导，返回生成的 CSS。

pub mod config;
pub mod handlers;
pub mod routes;
pub mod types;

pub use config::*;
pub use handlers::*;
pub use routes::*;
pub use types::*;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;

use crate::core::{RestyleError, RestyleResult};
use crate::network::build_gateway;
use crate::utils::SnapshotLogger;

/// Web 服务器
pub struct WebServer {
    config: WebConfig,
}

impl WebServer {
    /// 创建新的 Web 服务器
    pub fn new(config: WebConfig) -> Self {
        Self { config }
    }

    /// 根据配置组装应用状态
    pub fn app_state(&self) -> AppState {
        AppState::new(build_gateway(&self.config.gateway))
            .with_snapshots(SnapshotLogger::new(self.config.snapshots.clone()))
            .with_max_html_bytes(self.config.max_html_bytes)
    }

    /// 启动 Web 服务器
    pub async fn start(&self) -> RestyleResult<()> {
        self.config
            .validate()
            .map_err(RestyleError::config)?;

        let app = create_router(Arc::new(self.app_state()));

        let address = self.config.listen_address();
        let listener = tokio::net::TcpListener::bind(&address)
            .await
            .map_err(|e| RestyleError::Internal(format!("Failed to bind server: {}", e)))?;

        tracing::info!("Web server starting at http://{}", address);

        axum::serve(listener, app)
            .await
            .map_err(|e| RestyleError::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }
}

/// 创建路由器
///
/// 任意来源都可以跨域访问。允许携带凭据时不能使用通配来源，因此回显请求的来源。
pub fn create_router(app_state: Arc<AppState>) -> Router {
    create_routes()
        .with_state(app_state)
        .layer(CorsLayer::very_permissive())
}
