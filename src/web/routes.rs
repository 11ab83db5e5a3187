//! Web 路由定义

use std::sync::Arc;

use axum::{routing::post, Router};

use crate::web::{handlers::restyle_endpoint, types::AppState};

/// 创建路由结构
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().route("/restyle", post(restyle_endpoint))
}
