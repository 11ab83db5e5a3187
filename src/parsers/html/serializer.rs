use html5ever::serialize::{serialize, SerializeOpts};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};

use crate::core::SanitizeError;

use super::dom::{collect_elements, get_node_name};

/// 解析时会吞掉紧跟开始标签的第一个换行的元素
const LEADING_NEWLINE_TAGS: &[&str] = &["pre", "textarea", "listing"];

/// 将 DOM 序列化为 HTML 文本
///
/// 与 [`super::dom::html_to_dom`] 一样按关闭脚本的方式处理 `<noscript>`。
/// `<template>` 的内容不会输出。
pub fn serialize_document(dom: RcDom) -> Result<String, SanitizeError> {
    preserve_leading_newlines(&dom.document);

    let mut buf: Vec<u8> = Vec::new();
    let opts = SerializeOpts {
        scripting_enabled: false,
        ..Default::default()
    };

    let serializable: SerializableHandle = dom.document.into();
    serialize(&mut buf, &serializable, opts).map_err(SanitizeError::Serialize)?;

    Ok(String::from_utf8(buf)?)
}

/// 文本以换行开头时补上一个换行，重新解析后内容不变
fn preserve_leading_newlines(root: &Handle) {
    for node in collect_elements(root) {
        if !get_node_name(&node).is_some_and(|name| LEADING_NEWLINE_TAGS.contains(&name)) {
            continue;
        }

        let children = node.children.borrow();
        if let Some(NodeData::Text { contents }) = children.first().map(|child| &child.data) {
            let mut text = contents.borrow_mut();
            if text.starts_with('\n') {
                let doubled = format!("\n{}", &**text);
                text.clear();
                text.push_slice(&doubled);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::dom::html_to_dom;

    fn reserialize(html: &str) -> String {
        serialize_document(html_to_dom(html).unwrap()).unwrap()
    }

    #[test]
    fn test_serialize_wraps_fragments_in_document() {
        assert_eq!(
            reserialize("<p>Hi</p>"),
            "<html><head></head><body><p>Hi</p></body></html>"
        );
    }

    #[test]
    fn test_serialize_keeps_doctype_and_attribute_order() {
        assert_eq!(
            reserialize(r#"<!DOCTYPE html><a id="x" href="/y">z</a>"#),
            r#"<!DOCTYPE html><html><head></head><body><a id="x" href="/y">z</a></body></html>"#
        );
    }

    #[test]
    fn test_leading_newline_survives_round_trip() {
        for input in ["<pre>\n\nx</pre>", "<textarea>\n\nx</textarea>", "<listing>\n\nx</listing>"] {
            let once = reserialize(input);
            assert!(once.contains(">\n\nx</"), "lost newline in {:?}", once);
            assert_eq!(reserialize(&once), once);
        }

        assert!(reserialize("<pre>x\n</pre>").contains("<pre>x\n</pre>"));
    }

    #[test]
    fn test_noscript_text_is_escaped() {
        let html = reserialize("<div><noscript>a &lt;b&gt;</noscript></div>");
        assert!(html.contains("<noscript>a &lt;b&gt;</noscript>"));
    }

    #[test]
    fn test_template_contents_are_dropped() {
        let html = reserialize("<template><p data-a=\"1\">t</p></template>");
        assert!(html.contains("<template></template>"));
        assert!(!html.contains("data-a"));
    }
}
