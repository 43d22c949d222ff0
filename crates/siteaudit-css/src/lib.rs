//! Lexical CSS extraction.
//!
//! Every function here is a pattern scan over raw text, not a parse. Comments,
//! nested at-rules and unbalanced braces are tolerated by construction: they
//! only change which chunks match.

use std::sync::LazyLock;

use regex::Regex;

use siteaudit_core::config::ThresholdsConfig;
use siteaudit_core::extractor::{AssetExtractor, CssExtraction, Extraction};
use siteaudit_core::token::normalize;
use siteaudit_core::types::{Asset, AssetKind, TokenKind};

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap_or_else(|_| panic!("Invalid Regex")));
static SELECTOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^{};]*)\{").unwrap_or_else(|_| panic!("Invalid Regex")));
static PROPERTY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(-{0,2}[a-z][a-z0-9-]*)\s*:\s*[^;{}]+;").unwrap_or_else(|_| panic!("Invalid Regex"))
});
static KEYFRAMES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)@(?:-webkit-|-moz-|-o-)?keyframes\s+([\w-]+)")
        .unwrap_or_else(|_| panic!("Invalid Regex"))
});
static IMPORTANT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)!\s*important").unwrap_or_else(|_| panic!("Invalid Regex")));
static MOTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)transition\s*:|transform\s*:|translate3d|perspective")
        .unwrap_or_else(|_| panic!("Invalid Regex"))
});

static PARALLAX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)parallax|scroll.*effect|translateY|translateZ")
        .unwrap_or_else(|_| panic!("Invalid Regex"))
});

/// Blank out `/* ... */` comments. An unterminated comment is left as text.
pub fn strip_comments(text: &str) -> String {
    COMMENT_RE.replace_all(text, " ").into_owned()
}

/// Chunks of text immediately preceding an opening brace, trimmed.
///
/// Edge cases:
/// - whitespace-only chunks are discarded
/// - chunks longer than `max_len` bytes are discarded (logged at debug)
/// - at-rule preludes (`@media ...`) and keyframe stops (`from`, `50%`) are
///   chunks like any other
/// - a chunk never spans a previous `{`, `}` or `;`
pub fn selectors(css: &str, max_len: usize) -> Vec<String> {
    SELECTOR_RE
        .captures_iter(css)
        .filter_map(|cap| cap.get(1))
        .filter_map(|m| normalize(TokenKind::Selector, m.as_str(), max_len))
        .collect()
}

/// Property names of `property: value;` declarations.
///
/// Edge cases:
/// - names are lower-kebab, custom properties (`--brand`) included
/// - a name must start a declaration (preceded by start, whitespace, `{` or `;`),
///   so `url(data:...)` and `a:hover` do not count
/// - the final declaration of a block without a trailing `;` is not counted
pub fn properties(css: &str) -> Vec<String> {
    let bytes = css.as_bytes();
    PROPERTY_RE
        .captures_iter(css)
        .filter_map(|cap| cap.get(1))
        .filter(|m| {
            m.start() == 0 || matches!(bytes[m.start() - 1], b' ' | b'\t' | b'\n' | b'\r' | b'{' | b';')
        })
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Names following `@keyframes`, vendor-prefixed forms included.
pub fn keyframe_names(css: &str) -> Vec<String> {
    KEYFRAMES_RE
        .captures_iter(css)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Case-insensitive `!important` markers.
pub fn important_count(css: &str) -> usize {
    IMPORTANT_RE.find_iter(css).count()
}

/// `transition:`, `transform:`, `translate3d` and `perspective` mentions.
pub fn motion_rule_count(css: &str) -> usize {
    MOTION_RE.find_iter(css).count()
}

/// Parallax and scroll-effect markers: `parallax`, `scroll...effect` on one
/// line, `translateY` and `translateZ`, case-insensitive.
pub fn parallax_rule_count(css: &str) -> usize {
    PARALLAX_RE.find_iter(css).count()
}

/// Stylesheet extractor.
pub struct CssExtractor {
    max_selector_len: usize,
}

impl CssExtractor {
    pub fn new(thresholds: &ThresholdsConfig) -> Self {
        Self {
            max_selector_len: thresholds.max_selector_len,
        }
    }

    /// Run every CSS pattern over one stylesheet.
    pub fn extract_text(&self, css: &str) -> CssExtraction {
        let css = strip_comments(css);
        CssExtraction {
            selectors: selectors(&css, self.max_selector_len),
            properties: properties(&css),
            keyframes: keyframe_names(&css),
            important_count: important_count(&css),
            motion_rule_count: motion_rule_count(&css),
            parallax_rule_count: parallax_rule_count(&css),
        }
    }
}

impl Default for CssExtractor {
    fn default() -> Self {
        Self::new(&ThresholdsConfig::default())
    }
}

impl AssetExtractor for CssExtractor {
    fn kind(&self) -> AssetKind {
        AssetKind::Css
    }

    fn extract(&self, asset: &Asset) -> Extraction {
        Extraction::Css(self.extract_text(&asset.content))
    }
}
