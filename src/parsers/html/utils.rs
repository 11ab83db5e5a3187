//! 清理规则使用的数据表
//!
//! 规则以数据形式集中维护，扩展时无需改动遍历逻辑。

/// 整棵子树都会被删除的标签
pub const NON_STRUCTURAL_TAGS: &[&str] = &["script", "style", "meta", "link"];

/// 保留标签本身但清空子节点的标签
pub const FLATTENED_TAGS: &[&str] = &["svg"];

/// 内容按原始文本解析的回退容器，文本原样输出，需要清空
pub const RAW_TEXT_TAGS: &[&str] = &["iframe", "noembed", "noframes", "xmp"];

/// class / id 中出现即视为不可见元素的子串（不区分大小写）
pub const NON_VISIBLE_PATTERNS: &[&str] = &[
    "spinner",
    "tooltip",
    "skeleton",
    "loading",
    "hidden",
    "invisible",
    "offscreen",
    "visually-hidden",
];

/// 已知不可见的站点自定义元素
pub const NON_VISIBLE_TAGS: &[&str] = &[
    "tp-yt-paper-spinner-lite",
    "tp-yt-paper-tooltip",
    "ytd-popup-container",
    "ytd-miniplayer",
];

/// 自定义数据属性前缀
pub const DATA_ATTR_PREFIX: &str = "data-";

/// 跟踪、元数据、统计类属性
///
/// 解析器会把 HTML 属性名转成小写，比较时忽略大小写。
pub const TRACKING_ATTRS: &[&str] = &[
    "itemprop",
    "itemscope",
    "itemtype",
    "trackingparams",
    "nonce",
    "jslog",
    "ved",
    "ftl-eligible",
    "notify-on-loaded",
    "notify-on-unloaded",
];

/// 无障碍属性（仅在严格模式下删除）
pub const ACCESSIBILITY_ATTR: &str = "role";
pub const ACCESSIBILITY_ATTR_PREFIX: &str = "aria-";

/// 需要检查是否为不安全链接的属性
pub const LINK_ATTRS: &[&str] = &["href", "src"];

/// 上游已脱敏的链接标记
pub const SANITIZED_LINK_MARKER: &str = "[sanitized";

/// 脚本链接协议
pub const SCRIPT_SCHEME: &str = "javascript:";

/// 替换不安全链接用的占位符
pub const LINK_PLACEHOLDER: &str = "#";

/// 空包裹元素标签
pub const WRAPPER_TAG: &str = "div";

/// 属性值是否包含任一模式（不区分大小写）
///
/// `patterns` 需为小写。
pub fn contains_any_pattern(value: &str, patterns: &[String]) -> bool {
    let value = value.to_lowercase();
    patterns.iter().any(|pattern| value.contains(pattern.as_str()))
}

/// 链接是否需要被替换为占位符
///
/// 只看开头的协议（忽略大小写和前导空白），而非在整个值里查找 `javascript:`。
pub fn is_unsafe_link(value: &str) -> bool {
    if value.contains(SANITIZED_LINK_MARKER) {
        return true;
    }

    let trimmed = value.trim_start();
    trimmed
        .get(..SCRIPT_SCHEME.len())
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case(SCRIPT_SCHEME))
}
