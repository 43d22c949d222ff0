//! Lexical HTML extraction.
//!
//! Pages are scanned in three steps: comments are removed, raw-text elements
//! (`<script>`, `<style>`) are cut out and inspected on their own, and the
//! remaining markup is walked tag by tag.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use siteaudit_core::config::{HtmlConfig, ThresholdsConfig};
use siteaudit_core::extractor::{AssetExtractor, Extraction, HtmlExtraction};
use siteaudit_core::token::normalize;
use siteaudit_core::types::{Asset, AssetKind, TokenKind};

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap_or_else(|_| panic!("Invalid Regex")));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<([a-zA-Z][a-zA-Z0-9-]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#)
        .unwrap_or_else(|_| panic!("Invalid Regex"))
});
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)([a-z][a-z0-9_:.-]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#)
        .unwrap_or_else(|_| panic!("Invalid Regex"))
});
static SCRIPT_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script\b((?:[^>"']|"[^"]*"|'[^']*')*)>"#)
        .unwrap_or_else(|_| panic!("Invalid Regex"))
});
static SCRIPT_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</script\s*>").unwrap_or_else(|_| panic!("Invalid Regex")));
static STYLE_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<style\b((?:[^>"']|"[^"]*"|'[^']*')*)>"#)
        .unwrap_or_else(|_| panic!("Invalid Regex"))
});
static STYLE_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</style\s*>").unwrap_or_else(|_| panic!("Invalid Regex")));
static UTILITY_CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w-]+:[\w-]+").unwrap_or_else(|_| panic!("Invalid Regex")));

/// A start tag with its attributes, names lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub attrs: Vec<(String, String)>,
}

impl Tag {
    /// First value of `name`; attribute names are matched case-insensitively.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// A `<script>` or `<style>` element as found in the raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawElement<'a> {
    pub attrs: Vec<(String, String)>,
    /// `None` for self-closing or unclosed elements.
    pub body: Option<&'a str>,
    pub span: Range<usize>,
}

impl RawElement<'_> {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Drop `<!-- ... -->` comments. An unterminated comment is left as text.
pub fn strip_comments(html: &str) -> String {
    COMMENT_RE.replace_all(html, "").into_owned()
}

/// Parse the attribute section of a start tag.
///
/// Edge cases:
/// - double-quoted, single-quoted and unquoted values are all accepted
/// - boolean attributes (`defer`, `async`) carry no value and are skipped
/// - values are kept verbatim, entities are not decoded
/// - a name may follow the previous value's closing quote with no space
pub fn parse_attrs(raw: &str) -> Vec<(String, String)> {
    ATTR_RE
        .captures_iter(raw)
        .filter_map(|cap| {
            let name = cap.get(1)?;
            if !starts_attribute(raw, name.start()) {
                return None;
            }
            let name = name.as_str().to_ascii_lowercase();
            let value = cap.get(2).or(cap.get(3)).or(cap.get(4))?.as_str();
            Some((name, value.to_string()))
        })
        .collect()
}

/// An attribute name begins at the start, after whitespace, or right after
/// the closing quote of the previous value (`type="module"src="..."`).
/// Binding prefixes such as `:class` or `@click` do not.
fn starts_attribute(raw: &str, at: usize) -> bool {
    match raw[..at].chars().next_back() {
        None => true,
        Some(c) => c.is_whitespace() || matches!(c, '"' | '\'' | '/'),
    }
}

fn is_self_closing(raw_attrs: &str) -> bool {
    raw_attrs.trim_end().ends_with('/')
}

fn raw_elements<'a>(html: &'a str, open: &Regex, close: &Regex) -> Vec<RawElement<'a>> {
    let mut elements = Vec::new();
    let mut pos = 0;
    while let Some(cap) = open.captures_at(html, pos) {
        let (Some(tag), Some(raw_attrs)) = (cap.get(0), cap.get(1)) else {
            break;
        };
        let attrs = parse_attrs(raw_attrs.as_str());
        if is_self_closing(raw_attrs.as_str()) {
            elements.push(RawElement {
                attrs,
                body: None,
                span: tag.range(),
            });
            pos = tag.end();
            continue;
        }
        match close.find_at(html, tag.end()) {
            Some(end) => {
                elements.push(RawElement {
                    attrs,
                    body: Some(&html[tag.end()..end.start()]),
                    span: tag.start()..end.end(),
                });
                pos = end.end();
            }
            None => {
                elements.push(RawElement {
                    attrs,
                    body: None,
                    span: tag.range(),
                });
                pos = tag.end();
            }
        }
    }
    elements
}

/// Every `<script>` element, in document order.
pub fn script_elements(html: &str) -> Vec<RawElement<'_>> {
    raw_elements(html, &SCRIPT_OPEN_RE, &SCRIPT_CLOSE_RE)
}

/// Every `<style>` element, in document order.
pub fn style_elements(html: &str) -> Vec<RawElement<'_>> {
    raw_elements(html, &STYLE_OPEN_RE, &STYLE_CLOSE_RE)
}

/// `src` values of `<script>` tags.
pub fn script_refs(scripts: &[RawElement<'_>], cap: usize) -> Vec<String> {
    scripts
        .iter()
        .filter_map(|s| s.attr("src"))
        .filter_map(|src| normalize(TokenKind::ScriptRef, src, cap))
        .collect()
}

/// Bodies of inline scripts.
///
/// Edge cases:
/// - a tag carrying `src` is never inline, whatever its attribute order,
///   quoting or whitespace, and even when it has a body
/// - self-closing and unclosed tags have no body and are not counted
/// - an empty body still counts as a block
pub fn inline_scripts<'a>(scripts: &[RawElement<'a>]) -> Vec<&'a str> {
    scripts
        .iter()
        .filter(|s| s.attr("src").is_none())
        .filter_map(|s| s.body)
        .collect()
}

/// Bodies of closed `<style>` blocks.
pub fn inline_style_blocks<'a>(styles: &[RawElement<'a>]) -> Vec<&'a str> {
    styles.iter().filter_map(|s| s.body).collect()
}

/// Markup with every script and style element blanked out.
pub fn markup_only(html: &str, raw: &[&RawElement<'_>]) -> String {
    let mut spans: Vec<&Range<usize>> = raw.iter().map(|e| &e.span).collect();
    spans.sort_by_key(|s| s.start);

    let mut out = String::with_capacity(html.len());
    let mut pos = 0;
    for span in spans {
        if span.start < pos {
            continue;
        }
        out.push_str(&html[pos..span.start]);
        out.push(' ');
        pos = span.end;
    }
    out.push_str(&html[pos..]);
    out
}

/// Start tags of a markup string, in document order. End tags, doctypes and
/// processing instructions are skipped.
pub fn tags(markup: &str) -> Vec<Tag> {
    TAG_RE
        .captures_iter(markup)
        .filter_map(|cap| {
            let name = cap.get(1)?.as_str().to_ascii_lowercase();
            let attrs = parse_attrs(cap.get(2).map_or("", |m| m.as_str()));
            Some(Tag { name, attrs })
        })
        .collect()
}

/// Values of `attr` on tags accepted by `filter`, normalized.
pub fn attr_values<F>(tags: &[Tag], attr: &str, kind: TokenKind, cap: usize, filter: F) -> Vec<String>
where
    F: Fn(&Tag) -> bool,
{
    tags.iter()
        .filter(|t| filter(t))
        .filter_map(|t| t.attr(attr))
        .filter_map(|v| normalize(kind, v, cap))
        .collect()
}

/// `href` of `<link>` tags whose `rel` contains the `stylesheet` keyword.
pub fn stylesheet_refs(tags: &[Tag], cap: usize) -> Vec<String> {
    attr_values(tags, "href", TokenKind::StylesheetRef, cap, |t| {
        t.name == "link"
            && t.attr("rel").is_some_and(|rel| {
                rel.split_whitespace()
                    .any(|r| r.eq_ignore_ascii_case("stylesheet"))
            })
    })
}

/// Class values of `<a>` tags containing any of `markers`.
pub fn cta_classes(tags: &[Tag], markers: &[String], cap: usize) -> Vec<String> {
    attr_values(tags, "class", TokenKind::CtaClass, cap, |t| {
        t.name == "a"
            && t.attr("class")
                .is_some_and(|c| markers.iter().any(|m| !m.is_empty() && c.contains(m.as_str())))
    })
}

/// True when any class value carries a `variant:utility` token (`md:flex`).
pub fn has_utility_framework(class_attrs: &[String]) -> bool {
    class_attrs.iter().any(|c| UTILITY_CLASS_RE.is_match(c))
}

/// Page extractor.
pub struct HtmlExtractor {
    cta_markers: Vec<String>,
    max_token_len: usize,
}

impl HtmlExtractor {
    pub fn new(html: &HtmlConfig, max_token_len: usize) -> Self {
        Self {
            cta_markers: html.cta_markers.clone(),
            max_token_len,
        }
    }

    /// Run every HTML pattern over one page.
    pub fn extract_text(&self, html: &str) -> HtmlExtraction {
        let cap = self.max_token_len;
        let html = strip_comments(html);
        let scripts = script_elements(&html);
        let styles = style_elements(&html);

        let raw: Vec<&RawElement<'_>> = scripts.iter().chain(styles.iter()).collect();
        let markup = markup_only(&html, &raw);
        let tags = tags(&markup);

        let class_attrs = attr_values(&tags, "class", TokenKind::ClassAttr, cap, |_| true);
        HtmlExtraction {
            inline_styles: attr_values(&tags, "style", TokenKind::InlineStyle, cap, |_| true),
            has_utility_framework: has_utility_framework(&class_attrs),
            class_attrs,
            stylesheet_refs: stylesheet_refs(&tags, cap),
            script_refs: script_refs(&scripts, cap),
            style_blocks: inline_style_blocks(&styles)
                .into_iter()
                .map(str::to_string)
                .collect(),
            script_blocks: inline_scripts(&scripts)
                .into_iter()
                .map(str::to_string)
                .collect(),
            button_classes: attr_values(&tags, "class", TokenKind::ButtonClass, cap, |t| {
                t.name == "button"
            }),
            cta_classes: cta_classes(&tags, &self.cta_markers, cap),
        }
    }
}

impl Default for HtmlExtractor {
    fn default() -> Self {
        Self::new(&HtmlConfig::default(), ThresholdsConfig::default().max_token_len)
    }
}

impl AssetExtractor for HtmlExtractor {
    fn kind(&self) -> AssetKind {
        AssetKind::Html
    }

    fn extract(&self, asset: &Asset) -> Extraction {
        Extraction::Html(self.extract_text(&asset.content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(html: &str) -> HtmlExtraction {
        HtmlExtractor::default().extract_text(html)
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert_eq!(extract(""), HtmlExtraction::default());
    }

    #[test]
    fn test_inline_styles_and_classes_verbatim() {
        let ex = extract(
            r#"<div class="card  shadow" style="margin:0">
<p style='color:#fff;margin:0'>hi</p>
<span STYLE="">x</span></div>"#,
        );
        assert_eq!(ex.inline_styles, vec!["margin:0", "color:#fff;margin:0"]);
        assert_eq!(ex.class_attrs, vec!["card  shadow"]);
    }

    #[test]
    fn test_src_script_never_inline() {
        let html = r#"
<script src="js/main.js"></script>
<script
    defer
    src = 'js/nav.js' >  </script>
<script type="module" src="js/app.js"/>
<script>window.dataLayer = [];</script>
<script type="text/javascript">
  init();
</script>"#;
        let ex = extract(html);
        assert_eq!(ex.script_refs, vec!["js/main.js", "js/nav.js", "js/app.js"]);
        assert_eq!(ex.script_blocks.len(), 2);
        assert_eq!(ex.script_blocks[0], "window.dataLayer = [];");
    }

    #[test]
    fn test_src_without_space_after_quote_is_a_reference() {
        let ex = extract(r#"<script type="module"src="js/app.js"></script>"#);
        assert_eq!(ex.script_refs, vec!["js/app.js"]);
        assert!(ex.script_blocks.is_empty());

        let ex = extract(r#"<link rel='stylesheet'href='css/a.css'>"#);
        assert_eq!(ex.stylesheet_refs, vec!["css/a.css"]);
    }

    #[test]
    fn test_binding_prefixed_attributes_ignored() {
        let attrs = parse_attrs(r#" :class="active" @click="go" class="btn""#);
        assert_eq!(attrs, vec![("class".to_string(), "btn".to_string())]);
    }

    #[test]
    fn test_script_body_is_not_markup() {
        let html = r#"<script>const s = '<div style="margin:0">';</script><p class="x">"#;
        let ex = extract(html);
        assert!(ex.inline_styles.is_empty());
        assert_eq!(ex.class_attrs, vec!["x"]);
    }

    #[test]
    fn test_unclosed_script_not_counted() {
        let ex = extract("<script>let a = 1;");
        assert!(ex.script_blocks.is_empty());
    }

    #[test]
    fn test_stylesheet_links_any_attribute_order() {
        let html = r#"
<link rel="stylesheet" href="css/a.css">
<link href='css/b.css' rel='stylesheet' />
<link rel="preload stylesheet" href="css/c.css?v=2">
<link rel="icon" href="favicon.ico">
<link rel=stylesheet href=css/d.css>"#;
        let ex = extract(html);
        assert_eq!(
            ex.stylesheet_refs,
            vec!["css/a.css", "css/b.css", "css/c.css?v=2", "css/d.css"]
        );
    }

    #[test]
    fn test_style_blocks_counted() {
        let ex = extract("<style>\n.a { color: red; }\n</style><STYLE media=\"print\"></STYLE>");
        assert_eq!(ex.style_blocks.len(), 2);
    }

    #[test]
    fn test_commented_markup_ignored() {
        let ex = extract(r#"<!-- <script src="js/old.js"></script> --><p style="margin:0">"#);
        assert!(ex.script_refs.is_empty());
        assert_eq!(ex.inline_styles, vec!["margin:0"]);
    }

    #[test]
    fn test_buttons_and_ctas() {
        let html = r#"
<button class="btn btn-primary">Go</button>
<button type="submit">Plain</button>
<a class="link hover:underline" href="/">Home</a>
<a class="cta transition-all" href="/apply">Apply</a>
<a class="plain" href="/x">X</a>"#;
        let ex = extract(html);
        assert_eq!(ex.button_classes, vec!["btn btn-primary"]);
        assert_eq!(ex.cta_classes, vec!["link hover:underline", "cta transition-all"]);
        assert!(ex.has_utility_framework);
    }

    #[test]
    fn test_no_utility_framework() {
        let ex = extract(r#"<div class="card"></div>"#);
        assert!(!ex.has_utility_framework);
    }

    #[test]
    fn test_attribute_value_with_gt() {
        let tags = tags(r#"<img alt="a > b" class="hero">"#);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].attr("class"), Some("hero"));
    }

    #[test]
    fn test_oversized_values_dropped() {
        let extractor = HtmlExtractor::new(&HtmlConfig::default(), 10);
        let ex = extractor.extract_text(r#"<p style="margin:0;padding:0;color:red">"#);
        assert!(ex.inline_styles.is_empty());
    }
}
