use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::extractor::{CssExtraction, HtmlExtraction, JsCounters, JsExtraction, JsFeatures};
use crate::token::preview;
use crate::types::{Asset, ReadError};

const PREVIEW_BLOCKS: usize = 3;
const PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CssFileMetrics {
    pub file: String,
    pub bytes: usize,
    pub lines: usize,
    pub selectors: usize,
    pub properties: usize,
    pub important_rules: usize,
    pub motion_rules: usize,
    pub parallax_rules: usize,
    pub keyframes: Vec<String>,
    pub sha256: String,
}

impl CssFileMetrics {
    pub fn new(asset: &Asset, ex: &CssExtraction) -> Self {
        Self {
            file: asset.id.0.clone(),
            bytes: asset.byte_size(),
            lines: asset.line_count(),
            selectors: ex.selectors.len(),
            properties: ex.properties.len(),
            important_rules: ex.important_count,
            motion_rules: ex.motion_rule_count,
            parallax_rules: ex.parallax_rule_count,
            keyframes: ex.keyframes.clone(),
            sha256: compute_hash(&asset.content),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HtmlPageMetrics {
    pub file: String,
    pub bytes: usize,
    pub lines: usize,
    pub production: bool,
    pub stylesheets: Vec<String>,
    pub scripts: Vec<String>,
    pub inline_style_blocks: usize,
    pub inline_script_blocks: usize,
    pub inline_style_attrs: usize,
    pub class_attrs: usize,
    pub has_utility_framework: bool,
    pub total_dependencies: usize,
    /// Whitespace-collapsed openings of the first inline blocks.
    pub inline_previews: Vec<String>,
    pub sha256: String,
}

impl HtmlPageMetrics {
    pub fn new(asset: &Asset, ex: &HtmlExtraction, production: bool) -> Self {
        let inline_previews = ex
            .style_blocks
            .iter()
            .take(PREVIEW_BLOCKS)
            .chain(ex.script_blocks.iter().take(PREVIEW_BLOCKS))
            .map(|body| preview(body, PREVIEW_CHARS))
            .filter(|p| !p.is_empty())
            .collect();

        Self {
            file: asset.id.0.clone(),
            bytes: asset.byte_size(),
            lines: asset.line_count(),
            production,
            stylesheets: ex.stylesheet_refs.clone(),
            scripts: ex.script_refs.clone(),
            inline_style_blocks: ex.style_blocks.len(),
            inline_script_blocks: ex.script_blocks.len(),
            inline_style_attrs: ex.inline_styles.len(),
            class_attrs: ex.class_attrs.len(),
            has_utility_framework: ex.has_utility_framework,
            total_dependencies: ex.stylesheet_refs.len() + ex.script_refs.len(),
            inline_previews,
            sha256: compute_hash(&asset.content),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsFileMetrics {
    pub file: String,
    pub bytes: usize,
    pub lines: usize,
    pub functions: Vec<String>,
    pub event_listeners: Vec<String>,
    pub global_constants: Vec<String>,
    #[serde(flatten)]
    pub counters: JsCounters,
    pub features: JsFeatures,
    pub sha256: String,
}

impl JsFileMetrics {
    pub fn new(asset: &Asset, ex: &JsExtraction) -> Self {
        Self {
            file: asset.id.0.clone(),
            bytes: asset.byte_size(),
            lines: asset.line_count(),
            functions: ex.functions.clone(),
            event_listeners: ex.event_listeners.clone(),
            global_constants: ex.global_constants.clone(),
            counters: ex.counters,
            features: ex.features,
            sha256: compute_hash(&asset.content),
        }
    }
}

/// Every per-file metric of one run, for consumption by later tooling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsDump {
    pub html: Vec<HtmlPageMetrics>,
    pub css: Vec<CssFileMetrics>,
    pub js: Vec<JsFileMetrics>,
    pub read_errors: Vec<ReadError>,
}

/// Compute SHA-256 hash of file content.
pub fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AssetId, AssetKind};
    use std::path::PathBuf;

    fn asset(id: &str, kind: AssetKind, content: &str) -> Asset {
        Asset::new(AssetId::new(id), PathBuf::from(id), kind, content.to_string())
    }

    #[test]
    fn test_compute_hash_deterministic() {
        assert_eq!(compute_hash("hello world"), compute_hash("hello world"));
        assert_ne!(compute_hash("hello"), compute_hash("world"));
    }

    #[test]
    fn test_html_metrics_counts_dependencies() {
        let ex = HtmlExtraction {
            stylesheet_refs: vec!["css/a.css".into(), "css/b.css".into()],
            script_refs: vec!["js/main.js".into()],
            script_blocks: vec!["\n  window.dataLayer = [];\n".into()],
            ..Default::default()
        };
        let page = asset("index.html", AssetKind::Html, "<html></html>\n");
        let metrics = HtmlPageMetrics::new(&page, &ex, true);
        assert_eq!(metrics.total_dependencies, 3);
        assert_eq!(metrics.inline_script_blocks, 1);
        assert_eq!(metrics.inline_previews, vec!["window.dataLayer = [];"]);
        assert_eq!(metrics.lines, 1);
    }

    #[test]
    fn test_js_metrics_flatten_counters() {
        let ex = JsExtraction {
            counters: JsCounters {
                console_calls: 2,
                ..Default::default()
            },
            ..Default::default()
        };
        let script = asset("js/a.js", AssetKind::Js, "console.log(1);console.warn(2);");
        let metrics = JsFileMetrics::new(&script, &ex);
        assert_eq!(metrics.counters.console_calls, 2);
        assert_eq!(metrics.bytes, 31);
    }
}
