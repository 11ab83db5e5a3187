use std::io;
use std::rc::Rc;

use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// 将 HTML 文本解析为 DOM
///
/// 解析是容错的：不规范的标记会按 HTML5 规则尽力恢复，不会中断。
/// 按关闭脚本的方式解析，`<noscript>` 的内容是普通元素，清理步骤能看到其中的脚本和注释。
pub fn html_to_dom(html: &str) -> io::Result<RcDom> {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            scripting_enabled: false,
            ..Default::default()
        },
        ..Default::default()
    };

    parse_document(RcDom::default(), opts)
        .from_utf8()
        .read_from(&mut html.as_bytes())
}

/// 获取节点名称
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// 获取节点属性值
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => {
            for attr in attrs.borrow().iter() {
                if &*attr.name.local == attr_name {
                    return Some(attr.value.to_string());
                }
            }
            None
        }
        _ => None,
    }
}

/// 节点是否带有指定属性（不关心属性值）
pub fn has_node_attr(node: &Handle, attr_name: &str) -> bool {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .any(|attr| &*attr.name.local == attr_name),
        _ => false,
    }
}

/// 元素的属性个数，非元素节点返回 0
pub fn count_node_attrs(node: &Handle) -> usize {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs.borrow().len(),
        _ => 0,
    }
}

/// 覆盖已有属性的值，属性不存在时不做任何事
pub fn set_node_attr(node: &Handle, attr_name: &str, attr_value: &str) {
    if let NodeData::Element { attrs, .. } = &node.data {
        for attr in attrs.borrow_mut().iter_mut() {
            if &*attr.name.local == attr_name {
                attr.value.clear();
                attr.value.push_slice(attr_value);
            }
        }
    }
}

/// 删除所有满足条件的属性，返回删除的个数
pub fn remove_node_attrs<F>(node: &Handle, should_remove: F) -> usize
where
    F: Fn(&str) -> bool,
{
    match &node.data {
        NodeData::Element { attrs, .. } => {
            let mut attrs = attrs.borrow_mut();
            let before = attrs.len();
            attrs.retain(|attr| !should_remove(&*attr.name.local));
            before - attrs.len()
        }
        _ => 0,
    }
}

/// 是否为元素节点
pub fn is_element(node: &Handle) -> bool {
    matches!(node.data, NodeData::Element { .. })
}

/// 是否为注释节点
pub fn is_comment(node: &Handle) -> bool {
    matches!(node.data, NodeData::Comment { .. })
}

/// 是否含有元素子节点
pub fn has_element_children(node: &Handle) -> bool {
    node.children.borrow().iter().any(is_element)
}

/// 子节点中的文本是否全部为空白（没有文本也算）
///
/// 元素子节点视为非空白。
pub fn has_only_whitespace_text(node: &Handle) -> bool {
    node.children.borrow().iter().all(|child| match &child.data {
        NodeData::Text { contents } => contents.borrow().trim().is_empty(),
        NodeData::Element { .. } => false,
        _ => true,
    })
}

/// 将节点（连同子树）从父节点上摘除
pub fn detach_node(node: &Handle) {
    let parent = node.parent.take().and_then(|weak| weak.upgrade());
    if let Some(parent) = parent {
        parent
            .children
            .borrow_mut()
            .retain(|child| !Rc::ptr_eq(child, node));
    }
}

/// 清空节点的所有子节点，保留节点本身
pub fn clear_children(node: &Handle) -> usize {
    let mut children = node.children.borrow_mut();
    let count = children.len();
    for child in children.drain(..) {
        child.parent.set(None);
    }
    count
}

/// 节点的直接子节点
///
/// `<template>` 的内容不在其中：序列化时也不会输出它们。
fn child_nodes(node: &Handle) -> Vec<Handle> {
    node.children.borrow().clone()
}

/// 按文档顺序（先序）收集子树中的所有元素
///
/// 使用显式栈，深层嵌套的文档不会耗尽调用栈。
pub fn collect_elements(root: &Handle) -> Vec<Handle> {
    let mut found = Vec::new();
    let mut stack = vec![root.clone()];

    while let Some(node) = stack.pop() {
        if is_element(&node) {
            found.push(node.clone());
        }
        for child in child_nodes(&node).into_iter().rev() {
            stack.push(child);
        }
    }

    found
}

/// 删除子树中所有满足条件的节点（连同其后代），返回删除的个数
///
/// 被删除节点的后代不再被检查。
pub fn prune_nodes<F>(root: &Handle, should_remove: F) -> usize
where
    F: Fn(&Handle) -> bool,
{
    let mut removed = 0;
    let mut stack = vec![root.clone()];

    while let Some(node) = stack.pop() {
        for child in child_nodes(&node) {
            if should_remove(&child) {
                detach_node(&child);
                removed += 1;
            } else {
                stack.push(child);
            }
        }
    }

    removed
}
