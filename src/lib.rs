//! # Restyle Relay
//!
//! 把网页 HTML 缩减为只含布局结构的骨架，交给语言模型生成覆盖样式的 CSS。
//!
//! ## 模块组织
//!
//! - `core` - 错误类型
//! - `env` - 环境变量配置
//! - `parsers` - HTML 解析与结构清理
//! - `builders` - 提示词构建
//! - `network` - 生成服务网关
//! - `utils` - 调试快照
//! - `web` - Web 服务器功能（可选）

pub mod builders;
pub mod core;
pub mod env;
pub mod network;
pub mod parsers;
pub mod utils;
#[cfg(feature = "web")]
pub mod web;

// Re-export commonly used items for convenience
pub use builders::*;
pub use self::core::*;
pub use network::*;
pub use parsers::*;
pub use utils::*;
