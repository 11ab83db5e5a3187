//! HTML解析和处理模块
//!
//! - `utils`: 清理规则数据表
//! - `dom`: 基础DOM操作
//! - `serializer`: 序列化功能
//! - `sanitizer`: 结构清理流水线

pub mod dom;
pub mod sanitizer;
pub mod serializer;
pub mod utils;

pub use dom::{get_node_attr, get_node_name, html_to_dom, set_node_attr};
pub use sanitizer::{sanitize, AttributePolicy, SanitizeStats, Sanitizer, SanitizerRules};
pub use serializer::serialize_document;
