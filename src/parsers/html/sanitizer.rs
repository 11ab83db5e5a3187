//! HTML 结构清理器
//!
//! 把任意（可能很大、可能不规范的）HTML 文档缩减为只保留布局相关标记的结构骨架，
//! 以控制发送给语言模型的 token 数量。
//!
//! # 处理流程
//!
//! 所有步骤都作用在同一棵 DOM 上，顺序固定：
//!
//! 1. 容错解析
//! 2. 删除 `script`、`style`、`meta`、`link` 及其子树
//! 3. 删除注释
//! 4. 清空 `svg` 的子节点（保留 `svg` 本身）
//! 5. 删除带 `hidden` 属性的元素
//! 6. 删除 class / id 命中不可见模式的元素，以及已知不可见的自定义元素
//! 7. 删除 `data-*` 与跟踪类属性（严格模式下还会删除 `role`、`aria-*`）
//! 8. 把已脱敏或 `javascript:` 的 `href` / `src` 替换为 `#`
//! 9. 单次遍历删除没有属性、没有子元素、只含空白文本的 `div`
//! 10. 序列化
//!
//! 输出逐字节确定，对同一输入重复清理结果不变。
//!
//! # 错误处理
//!
//! [`Sanitizer::sanitize`] 永远不会失败：解析、任一步骤或序列化出错（包括 panic）时，
//! 记录日志并原样返回输入。清理只是为了节省 token，失败最多意味着成本变高。
//!
//! # 使用示例
//!
//! ```rust
//! use restyle::parsers::html::sanitizer::sanitize;
//!
//! let cleaned = sanitize("<div><script>track()</script><p>Hi</p></div>");
//! assert!(!cleaned.contains("script"));
//! assert!(cleaned.contains("<p>Hi</p>"));
//! ```

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::OnceLock;

use markup5ever_rcdom::{Handle, RcDom};

use crate::core::SanitizeError;

use super::dom::{
    clear_children, collect_elements, count_node_attrs, detach_node, get_node_attr,
    get_node_name, has_element_children, has_node_attr, has_only_whitespace_text, html_to_dom,
    is_comment, prune_nodes, remove_node_attrs, set_node_attr,
};
use super::serializer::serialize_document;
use super::utils::{
    contains_any_pattern, is_unsafe_link, ACCESSIBILITY_ATTR, ACCESSIBILITY_ATTR_PREFIX,
    DATA_ATTR_PREFIX, FLATTENED_TAGS, LINK_ATTRS, LINK_PLACEHOLDER, NON_STRUCTURAL_TAGS,
    NON_VISIBLE_PATTERNS, NON_VISIBLE_TAGS, RAW_TEXT_TAGS, TRACKING_ATTRS, WRAPPER_TAG,
};

/// 无障碍属性的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttributePolicy {
    /// 保留 `role` 与 `aria-*`（默认，选择器常依赖它们）
    #[default]
    KeepAccessibility,
    /// 同时删除 `role` 与 `aria-*`
    StripAccessibility,
}

/// 清理规则
///
/// 默认值来自 [`super::utils`] 中的数据表，名称均为小写。
#[derive(Debug, Clone)]
pub struct SanitizerRules {
    /// 整棵删除的标签
    pub non_structural_tags: Vec<String>,
    /// 只清空子节点的标签
    pub flattened_tags: Vec<String>,
    /// class / id 中的不可见模式
    pub non_visible_patterns: Vec<String>,
    /// 直接删除的自定义元素
    pub non_visible_tags: Vec<String>,
    /// 数据属性前缀
    pub data_attr_prefix: String,
    /// 跟踪类属性
    pub tracking_attrs: Vec<String>,
    /// 无障碍属性策略
    pub attribute_policy: AttributePolicy,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_lowercase()).collect()
}

impl Default for SanitizerRules {
    fn default() -> Self {
        Self {
            non_structural_tags: owned(NON_STRUCTURAL_TAGS),
            flattened_tags: owned(FLATTENED_TAGS),
            non_visible_patterns: owned(NON_VISIBLE_PATTERNS),
            non_visible_tags: owned(NON_VISIBLE_TAGS),
            data_attr_prefix: DATA_ATTR_PREFIX.to_string(),
            tracking_attrs: owned(TRACKING_ATTRS),
            attribute_policy: AttributePolicy::default(),
        }
    }
}

impl SanitizerRules {
    /// 设置无障碍属性策略
    pub fn with_attribute_policy(mut self, policy: AttributePolicy) -> Self {
        self.attribute_policy = policy;
        self
    }

    fn is_non_structural(&self, name: &str) -> bool {
        self.non_structural_tags.iter().any(|tag| tag == name)
    }

    fn is_flattened(&self, name: &str) -> bool {
        self.flattened_tags.iter().any(|tag| tag == name)
    }

    fn is_non_visible_tag(&self, name: &str) -> bool {
        self.non_visible_tags.iter().any(|tag| tag == name)
    }

    fn is_stripped_attr(&self, name: &str) -> bool {
        let name = name.to_ascii_lowercase();

        if name.starts_with(&self.data_attr_prefix) {
            return true;
        }
        if self.tracking_attrs.iter().any(|attr| *attr == name) {
            return true;
        }

        self.attribute_policy == AttributePolicy::StripAccessibility
            && (name == ACCESSIBILITY_ATTR || name.starts_with(ACCESSIBILITY_ATTR_PREFIX))
    }
}

/// 每个步骤处理的节点数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SanitizeStats {
    pub non_structural_removed: usize,
    pub comments_removed: usize,
    pub graphics_flattened: usize,
    pub raw_text_cleared: usize,
    pub hidden_removed: usize,
    pub non_visible_removed: usize,
    pub attrs_removed: usize,
    pub links_neutralized: usize,
    pub wrappers_collapsed: usize,
}

/// HTML 结构清理器
#[derive(Debug, Clone, Default)]
pub struct Sanitizer {
    rules: SanitizerRules,
}

impl Sanitizer {
    /// 使用指定规则创建清理器
    pub fn new(rules: SanitizerRules) -> Self {
        Self { rules }
    }

    /// 当前规则
    pub fn rules(&self) -> &SanitizerRules {
        &self.rules
    }

    /// 清理 HTML，失败时原样返回输入
    pub fn sanitize(&self, html: &str) -> String {
        if html.is_empty() {
            return String::new();
        }

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.try_sanitize(html)));
        let error = match outcome {
            Ok(Ok(cleaned)) => return cleaned,
            Ok(Err(e)) => e,
            Err(payload) => SanitizeError::Panicked(panic_message(payload.as_ref())),
        };

        tracing::warn!("HTML 清理失败，返回原始内容: {}", error);
        html.to_string()
    }

    /// 清理 HTML，把错误交给调用方
    pub fn try_sanitize(&self, html: &str) -> Result<String, SanitizeError> {
        if html.is_empty() {
            return Ok(String::new());
        }

        let dom = html_to_dom(html).map_err(SanitizeError::Parse)?;
        let stats = self.run_passes(&dom);
        tracing::debug!("HTML 清理统计: {:?}", stats);

        serialize_document(dom)
    }

    fn run_passes(&self, dom: &RcDom) -> SanitizeStats {
        let root = &dom.document;

        SanitizeStats {
            non_structural_removed: self.strip_non_structural(root),
            comments_removed: strip_comments(root),
            graphics_flattened: self.flatten_graphics(root),
            raw_text_cleared: clear_raw_text(root),
            hidden_removed: remove_hidden(root),
            non_visible_removed: self.remove_non_visible(root),
            attrs_removed: self.strip_attributes(root),
            links_neutralized: neutralize_links(root),
            wrappers_collapsed: collapse_empty_wrappers(root),
        }
    }

    fn strip_non_structural(&self, root: &Handle) -> usize {
        prune_nodes(root, |node| {
            get_node_name(node).is_some_and(|name| self.rules.is_non_structural(name))
        })
    }

    fn flatten_graphics(&self, root: &Handle) -> usize {
        collect_elements(root)
            .iter()
            .filter(|node| get_node_name(node).is_some_and(|name| self.rules.is_flattened(name)))
            .map(|node| {
                clear_children(node);
                1
            })
            .sum()
    }

    fn remove_non_visible(&self, root: &Handle) -> usize {
        prune_nodes(root, |node| {
            let Some(name) = get_node_name(node) else {
                return false;
            };

            if self.rules.is_non_visible_tag(name) {
                return true;
            }

            ["class", "id"].iter().any(|attr| {
                get_node_attr(node, attr).is_some_and(|value| {
                    contains_any_pattern(&value, &self.rules.non_visible_patterns)
                })
            })
        })
    }

    fn strip_attributes(&self, root: &Handle) -> usize {
        collect_elements(root)
            .iter()
            .map(|node| remove_node_attrs(node, |name| self.rules.is_stripped_attr(name)))
            .sum()
    }
}

fn strip_comments(root: &Handle) -> usize {
    prune_nodes(root, is_comment)
}

/// 清空 `<iframe>` 等容器里的原始文本，其中的标记不会被前面的步骤处理
fn clear_raw_text(root: &Handle) -> usize {
    collect_elements(root)
        .iter()
        .filter(|node| get_node_name(node).is_some_and(|name| RAW_TEXT_TAGS.contains(&name)))
        .filter(|node| clear_children(node) > 0)
        .count()
}

fn remove_hidden(root: &Handle) -> usize {
    prune_nodes(root, |node| has_node_attr(node, "hidden"))
}

fn neutralize_links(root: &Handle) -> usize {
    let mut neutralized = 0;

    for node in collect_elements(root) {
        for attr in LINK_ATTRS {
            if get_node_attr(&node, attr).is_some_and(|value| is_unsafe_link(&value)) {
                set_node_attr(&node, attr, LINK_PLACEHOLDER);
                neutralized += 1;
            }
        }
    }

    neutralized
}

/// 删除空的 `div` 包裹元素
///
/// 只遍历一次，不会在删除后重新扫描。子节点先于父节点被检查，
/// 所以一串只由空 `div` 组成的嵌套会在这一次遍历中整体消失。
fn collapse_empty_wrappers(root: &Handle) -> usize {
    let mut collapsed = 0;

    for node in collect_elements(root).iter().rev() {
        if get_node_name(node) != Some(WRAPPER_TAG) {
            continue;
        }

        if count_node_attrs(node) == 0
            && !has_element_children(node)
            && has_only_whitespace_text(node)
        {
            detach_node(node);
            collapsed += 1;
        }
    }

    collapsed
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

static DEFAULT_SANITIZER: OnceLock<Sanitizer> = OnceLock::new();

/// 使用默认规则清理 HTML
pub fn sanitize(html: &str) -> String {
    DEFAULT_SANITIZER.get_or_init(Sanitizer::default).sanitize(html)
}
