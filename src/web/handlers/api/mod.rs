//! API 处理器

pub mod restyle;

pub use restyle::*;
