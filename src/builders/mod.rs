//! # 构建器模块
//!
//! - `prompt_builder` - 生成发给模型的指令，整理模型输出

pub mod prompt_builder;

pub use prompt_builder::{build_prompt, estimate_tokens, strip_code_fences};
