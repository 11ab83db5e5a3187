//! 提示词构建器
//!
//! 把美术指导文本和清理后的 HTML 拼成发给模型的指令，并负责把模型的回答整理成纯 CSS。
//! HTML 不做转义：它只是给模型看的上下文，不会被渲染。

use std::sync::OnceLock;

use regex::Regex;

/// 生成发给模型的完整指令
pub fn build_prompt(art_direction: &str, cleaned_html: &str) -> String {
    format!(
        r#"You are a creative web designer. Your task is to generate CSS code that overrides
the styles of a webpage to satisfy a specific art direction, based *only* on the provided HTML structure.

Context:
1.  **Art Direction:** {art_direction}
2.  **Current HTML Structure (simplified):**
    ```html
    {cleaned_html}
    ```

Instructions:
- Be highly creative and bold in your CSS design choices while at the same time make it a PRIORITY to IMPROVE the UI if possible.
- Over use small animations and transitions to make the page feel alive.
- In addition to changing colors (background, text, links, accents), also creatively modify:
    • Border styles (width, color, style: solid, dashed, double, etc.)
    • Border radius (rounded corners, pill shapes, etc.)
    • Box shadows and text shadows for glowing effects
    • Add !important to everything to ensure it overrides existing styles.
    • Background images, colors, gradients, transparency, or patterns
    • Text shadows, text decorations (underline, line-through)
    • Font families, font weights, and font styles
    • Spacing (padding, margin, letter-spacing, line-height)
    • Button and input styles (hover, active, focus states)
    • Any other visually impactful CSS properties
    • Hover states, active states, and focus states should be included for interactive elements.
- Use a variety of CSS features to make the theme visually distinct and interesting.
- Ensure the CSS selectors are specific enough to target the intended elements based on the HTML structure.
- Ensure that foreground text and background colors have opposing contrast for readability.
- Do not include explanations or markdown formatting like ```css. Only return the raw CSS code.
- Reject any and all javascript
"#
    )
}

static FENCE_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn fence_regex() -> Option<&'static Regex> {
    FENCE_RE
        .get_or_init(|| Regex::new(r"(?s)\A\s*```[A-Za-z0-9_-]*[ \t]*\r?\n(.*?)\r?\n?[ \t]*```\s*\z").ok())
        .as_ref()
}

/// 去掉模型回答外层的 Markdown 代码块
///
/// 只有整段回答被一个代码块包住时才会去掉，否则只做首尾去空白。
pub fn strip_code_fences(generated: &str) -> String {
    if let Some(captures) = fence_regex().and_then(|re| re.captures(generated)) {
        if let Some(body) = captures.get(1) {
            return body.as_str().trim().to_string();
        }
    }
    generated.trim().to_string()
}

/// 粗略估算 token 数（约 4 个字符一个 token）
pub fn estimate_tokens(text: &str) -> usize {
    text.len() / 4
}
