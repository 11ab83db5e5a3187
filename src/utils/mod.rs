//! # 工具模块
//!
//! - `snapshot` - 调试快照（清理后的 HTML 与生成的 CSS）

pub mod snapshot;

pub use snapshot::{safe_prompt_prefix, snapshot_filename, SnapshotConfig, SnapshotLogger};
