use serde::{Deserialize, Serialize};

use crate::types::{Asset, AssetKind};

/// Tokens extracted from one stylesheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CssExtraction {
    pub selectors: Vec<String>,
    pub properties: Vec<String>,
    pub keyframes: Vec<String>,
    pub important_count: usize,
    pub motion_rule_count: usize,
    /// Parallax and scroll-effect markers (`parallax`, `translateY`, ...).
    pub parallax_rule_count: usize,
}

/// Tokens extracted from one HTML page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlExtraction {
    pub inline_styles: Vec<String>,
    pub class_attrs: Vec<String>,
    pub stylesheet_refs: Vec<String>,
    pub script_refs: Vec<String>,
    /// Bodies of inline `<style>` blocks.
    pub style_blocks: Vec<String>,
    /// Bodies of `<script>` blocks without a `src` attribute.
    pub script_blocks: Vec<String>,
    pub button_classes: Vec<String>,
    pub cta_classes: Vec<String>,
    pub has_utility_framework: bool,
}

/// Presence markers; no claim is made that the feature is used correctly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsFeatures {
    pub animation_frame: bool,
    pub timers: bool,
    pub observers: bool,
    pub error_handling: bool,
    pub legacy_dom_query: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsCounters {
    pub dom_ready_handlers: usize,
    pub window_listeners: usize,
    pub document_listeners: usize,
    pub console_calls: usize,
    pub scroll_references: usize,
    pub parallax_references: usize,
    pub intersection_observers: usize,
}

/// Tokens extracted from one script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsExtraction {
    pub functions: Vec<String>,
    pub event_listeners: Vec<String>,
    pub global_constants: Vec<String>,
    pub features: JsFeatures,
    pub counters: JsCounters,
}

/// Result of running an extractor over one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Css(CssExtraction),
    Html(HtmlExtraction),
    Js(JsExtraction),
}

/// Trait that each asset-kind extractor must implement.
///
/// Extraction is lexical and infallible: malformed input yields fewer
/// tokens, never an error.
pub trait AssetExtractor: Send + Sync {
    /// Asset kind handled by this extractor.
    fn kind(&self) -> AssetKind;

    /// File extensions this extractor handles (e.g., &["css"])
    fn file_extensions(&self) -> &[&str] {
        self.kind().extensions()
    }

    /// Extract tokens from an asset's text.
    fn extract(&self, asset: &Asset) -> Extraction;
}
