//! # 解析器模块
//!
//! - `html` - HTML 解析、DOM 操作与结构清理

pub mod html;

pub use html::{html_to_dom, sanitize, serialize_document, Sanitizer, SanitizerRules};
