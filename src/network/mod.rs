//! # 网络模块
//!
//! 与生成服务（LLM 提供方）的通信：
//!
//! - `gateway` - 网关特性、提供方选择与配置
//! - `openrouter` / `anthropic` / `gemini` - 各提供方的适配器

pub mod anthropic;
pub mod gateway;
pub mod gemini;
pub mod openrouter;

pub use gateway::{build_gateway, GatewayConfig, GenerationGateway, MisconfiguredGateway, Provider};
