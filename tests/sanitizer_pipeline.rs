//! 结构清理集成测试
//!
//! 使用接近真实站点的页面检查整条清理流水线

use restyle::parsers::html::{AttributePolicy, Sanitizer, SanitizerRules};
use restyle::sanitize;

const VIDEO_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Watch</title>
  <link rel="stylesheet" href="/main.css">
  <style>body { margin: 0 }</style>
  <script nonce="abc">window.ytcfg = {};</script>
</head>
<body data-page="watch">
  <!-- masthead -->
  <header id="masthead" role="banner" itemscope itemtype="https://schema.org/WPHeader">
    <a href="javascript:void(0)" class="logo" jslog="123">Logo</a>
    <svg viewBox="0 0 24 24"><path d="M0 0h24v24H0z"/></svg>
  </header>
  <main class="page">
    <div class="spinner-container"><div></div></div>
    <ytd-popup-container><div>popup</div></ytd-popup-container>
    <div hidden><p>secret</p></div>
    <div><div>  </div></div>
    <section aria-label="Comments" trackingParams="xyz">
      <a href="[sanitized-url]">Channel</a>
      <img src="/thumb.jpg" data-src="/thumb@2x.jpg" alt="thumb">
    </section>
  </main>
</body>
</html>"#;

const TRACKED_DOCS_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Docs</title>
  <script>(function(w,d,s,l,i){w[l]=w[l]||[];})(window,document,'script','dataLayer','GTM-X');</script>
  <noscript><style>.needs-js { display: none }</style><link rel="stylesheet" href="/nojs.css"></noscript>
</head>
<body>
  <noscript><iframe src="https://www.googletagmanager.com/ns.html?id=GTM-X" height="0" width="0"><script>dataLayer.push({})</script></iframe></noscript>
  <noscript><script>fallbackTracker()</script><!-- pixel --><img src="/px.gif" alt=""></noscript>
  <article>
    <pre>

fn main() {}
</pre>
    <textarea name="snippet">
  indented</textarea>
  </article>
</body>
</html>"#;

#[test]
fn test_realistic_page_is_reduced() {
    let cleaned = sanitize(VIDEO_PAGE);

    for gone in [
        "<script", "<style", "<meta", "<link", "<!--", "window.ytcfg", "<path", "spinner",
        "ytd-popup-container", "popup", "secret", "data-", "jslog", "itemscope", "itemtype",
        "trackingparams", "nonce", "javascript:", "[sanitized",
    ] {
        assert!(!cleaned.contains(gone), "{:?} survived in:\n{}", gone, cleaned);
    }

    assert!(cleaned.starts_with("<!DOCTYPE html>"));
    assert!(cleaned.contains("<title>Watch</title>"));
    assert!(cleaned.contains(r#"<svg viewBox="0 0 24 24"></svg>"#));
    assert!(cleaned.contains(r##"<a href="#" class="logo">Logo</a>"##));
    assert!(cleaned.contains(r##"<a href="#">Channel</a>"##));
    assert!(cleaned.contains(r#"<img src="/thumb.jpg" alt="thumb">"#));
    assert!(cleaned.contains(r#"role="banner""#));
    assert!(cleaned.contains(r#"aria-label="Comments""#));
    assert!(cleaned.len() < VIDEO_PAGE.len());
}

#[test]
fn test_realistic_page_is_idempotent() {
    let once = sanitize(VIDEO_PAGE);
    assert_eq!(sanitize(&once), once);
}

#[test]
fn test_tracking_inside_noscript_is_removed() {
    let cleaned = sanitize(TRACKED_DOCS_PAGE);

    for gone in ["<script", "<style", "<link", "<!--", "dataLayer", "fallbackTracker", "needs-js"] {
        assert!(!cleaned.contains(gone), "{:?} survived in:\n{}", gone, cleaned);
    }

    assert!(cleaned.contains(
        r#"<noscript><iframe src="https://www.googletagmanager.com/ns.html?id=GTM-X" height="0" width="0"></iframe></noscript>"#
    ));
    assert!(cleaned.contains(r#"<img src="/px.gif" alt="">"#));
}

#[test]
fn test_whitespace_sensitive_text_is_stable() {
    let once = sanitize(TRACKED_DOCS_PAGE);
    assert!(once.contains("<pre>\n\nfn main() {}\n</pre>"));
    assert!(once.contains(r#"<textarea name="snippet">  indented</textarea>"#));

    let twice = sanitize(&once);
    assert_eq!(twice, once);
}

#[test]
fn test_strict_policy_drops_accessibility_attributes() {
    let sanitizer =
        Sanitizer::new(SanitizerRules::default().with_attribute_policy(AttributePolicy::StripAccessibility));
    let cleaned = sanitizer.sanitize(VIDEO_PAGE);

    assert!(!cleaned.contains("role="));
    assert!(!cleaned.contains("aria-"));
    assert!(cleaned.contains(r#"<header id="masthead">"#));
}

#[test]
fn test_extended_rules_are_data_driven() {
    let mut rules = SanitizerRules::default();
    rules.non_visible_patterns.push("promo".to_string());
    rules.non_visible_tags.push("cookie-banner".to_string());
    rules.tracking_attrs.push("ping".to_string());
    let sanitizer = Sanitizer::new(rules);

    let cleaned = sanitizer.sanitize(
        r#"<cookie-banner>accept</cookie-banner><aside class="Promo-Box">buy</aside><a href="/a" ping="/t">a</a>"#,
    );

    assert_eq!(
        cleaned,
        r#"<html><head></head><body><a href="/a">a</a></body></html>"#
    );
}
