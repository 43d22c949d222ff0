//! Lexical JavaScript extraction.

use std::sync::LazyLock;

use regex::Regex;

use siteaudit_core::config::ThresholdsConfig;
use siteaudit_core::extractor::{AssetExtractor, Extraction, JsCounters, JsExtraction, JsFeatures};
use siteaudit_core::token::normalize;
use siteaudit_core::types::{Asset, AssetKind, TokenKind};

static FUNCTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:function|const|let|var)\s+([A-Za-z_$][\w$]*)\s*=?\s*(?:async\s+)?(?:function\b|\()")
        .unwrap_or_else(|_| panic!("Invalid Regex"))
});
static LISTENER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"addEventListener\s*\(\s*['"`]([\w:-]+)['"`]"#)
        .unwrap_or_else(|_| panic!("Invalid Regex"))
});
static CONSTANT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:var|let|const)\s+([A-Z_$][A-Z0-9_$]*)\s*=")
        .unwrap_or_else(|_| panic!("Invalid Regex"))
});
static DOM_READY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"DOMContentLoaded|document\.ready").unwrap_or_else(|_| panic!("Invalid Regex"))
});
static WINDOW_LISTENER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bwindow\.addEventListener\b").unwrap_or_else(|_| panic!("Invalid Regex"))
});
static DOCUMENT_LISTENER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bdocument\.addEventListener\b").unwrap_or_else(|_| panic!("Invalid Regex"))
});
static CONSOLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bconsole\.(?:log|error|warn)\b").unwrap_or_else(|_| panic!("Invalid Regex"))
});
static SCROLL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[sS]croll").unwrap_or_else(|_| panic!("Invalid Regex")));
static PARALLAX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)parallax").unwrap_or_else(|_| panic!("Invalid Regex")));
static TIMER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bset(?:Timeout|Interval)\s*\(").unwrap_or_else(|_| panic!("Invalid Regex"))
});
static OBSERVER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:IntersectionObserver|MutationObserver|ResizeObserver)\b|visibilitychange")
        .unwrap_or_else(|_| panic!("Invalid Regex"))
});
static TRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\btry\s*\{").unwrap_or_else(|_| panic!("Invalid Regex")));
static CATCH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bcatch\b").unwrap_or_else(|_| panic!("Invalid Regex")));
static LEGACY_QUERY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\w$.])\$\s*\(|\bjQuery\b").unwrap_or_else(|_| panic!("Invalid Regex"))
});

/// Declared function names, first `limit` in source order.
///
/// Edge cases:
/// - `function name(`, `const name = (`, `let name = function` and
///   `const name = async (` forms all count
/// - a name declared twice in one file is reported twice
/// - `limit == 0` yields nothing
pub fn function_names(js: &str, limit: usize, cap: usize) -> Vec<String> {
    FUNCTION_RE
        .captures_iter(js)
        .filter_map(|c| c.get(1))
        .filter_map(|m| normalize(TokenKind::FunctionName, m.as_str(), cap))
        .take(limit)
        .collect()
}

/// Event types passed as a string literal to `addEventListener`.
pub fn event_listeners(js: &str) -> Vec<String> {
    LISTENER_RE
        .captures_iter(js)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Upper-case bindings treated as constant-like globals.
///
/// `$` and `_` alone are not constants: the name must carry an upper-case
/// letter.
pub fn global_constants(js: &str) -> Vec<String> {
    CONSTANT_RE
        .captures_iter(js)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .filter(|name| name.chars().any(|ch| ch.is_ascii_uppercase()))
        .map(str::to_string)
        .collect()
}

pub fn counters(js: &str) -> JsCounters {
    JsCounters {
        dom_ready_handlers: DOM_READY_RE.find_iter(js).count(),
        window_listeners: WINDOW_LISTENER_RE.find_iter(js).count(),
        document_listeners: DOCUMENT_LISTENER_RE.find_iter(js).count(),
        console_calls: CONSOLE_RE.find_iter(js).count(),
        scroll_references: SCROLL_RE.find_iter(js).count(),
        parallax_references: PARALLAX_RE.find_iter(js).count(),
        intersection_observers: js.matches("IntersectionObserver").count(),
    }
}

/// Presence markers for scheduling, observation, recovery and legacy
/// DOM-query constructs.
pub fn features(js: &str) -> JsFeatures {
    JsFeatures {
        animation_frame: js.contains("requestAnimationFrame"),
        timers: TIMER_RE.is_match(js),
        observers: OBSERVER_RE.is_match(js),
        error_handling: (TRY_RE.is_match(js) && CATCH_RE.is_match(js)) || js.contains(".catch("),
        legacy_dom_query: LEGACY_QUERY_RE.is_match(js),
    }
}

/// Script extractor.
pub struct JsExtractor {
    functions_per_file: usize,
    max_token_len: usize,
}

impl JsExtractor {
    pub fn new(thresholds: &ThresholdsConfig) -> Self {
        Self {
            functions_per_file: thresholds.functions_per_file,
            max_token_len: thresholds.max_token_len,
        }
    }

    pub fn extract_text(&self, js: &str) -> JsExtraction {
        JsExtraction {
            functions: function_names(js, self.functions_per_file, self.max_token_len),
            event_listeners: event_listeners(js),
            global_constants: global_constants(js),
            features: features(js),
            counters: counters(js),
        }
    }
}

impl Default for JsExtractor {
    fn default() -> Self {
        Self::new(&ThresholdsConfig::default())
    }
}

impl AssetExtractor for JsExtractor {
    fn kind(&self) -> AssetKind {
        AssetKind::Js
    }

    fn extract(&self, asset: &Asset) -> Extraction {
        Extraction::Js(self.extract_text(&asset.content))
    }
}
