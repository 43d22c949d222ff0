use crate::extractor::{CssExtraction, Extraction, HtmlExtraction, JsExtraction};
use crate::index::OccurrenceIndex;
use crate::metrics::{CssFileMetrics, HtmlPageMetrics, JsFileMetrics, MetricsDump};
use crate::types::{Asset, AssetId, ReadError, TokenKind};

/// Explicit allow-list of pages counted for markup-pattern reports.
#[derive(Debug, Clone, Default)]
pub struct ProductionPages {
    allow: Vec<String>,
}

impl ProductionPages {
    /// An empty list admits every page.
    pub fn new(pages: &[String]) -> Self {
        Self {
            allow: pages
                .iter()
                .map(|p| p.trim().trim_start_matches("./").replace('\\', "/"))
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    pub fn is_production(&self, page: &AssetId) -> bool {
        self.allow.is_empty() || self.allow.iter().any(|p| Self::matches(p, page))
    }

    /// Allow-listed pages with no located counterpart, in list order.
    pub fn missing(&self, located: &[AssetId]) -> Vec<String> {
        self.allow
            .iter()
            .filter(|p| !located.iter().any(|page| Self::matches(p, page)))
            .cloned()
            .collect()
    }

    fn matches(entry: &str, page: &AssetId) -> bool {
        entry == page.as_str() || entry == page.file_name()
    }
}

/// Everything one run produced: the occurrence index and per-file metrics.
#[derive(Debug, Clone, Default)]
pub struct AuditRun {
    pub index: OccurrenceIndex,
    pub metrics: MetricsDump,
}

/// Folds per-asset extractions into the run's occurrence index.
///
/// Owned by a single run; built fresh and consumed by `finish`.
pub struct Aggregator {
    production: ProductionPages,
    index: OccurrenceIndex,
    metrics: MetricsDump,
}

impl Aggregator {
    pub fn new(production: ProductionPages) -> Self {
        Self {
            production,
            index: OccurrenceIndex::new(),
            metrics: MetricsDump::default(),
        }
    }

    pub fn fold(&mut self, asset: &Asset, extraction: &Extraction) {
        match extraction {
            Extraction::Css(ex) => self.fold_css(asset, ex),
            Extraction::Html(ex) => self.fold_html(asset, ex),
            Extraction::Js(ex) => self.fold_js(asset, ex),
        }
    }

    pub fn record_error(&mut self, error: ReadError) {
        self.metrics.read_errors.push(error);
    }

    fn fold_css(&mut self, asset: &Asset, ex: &CssExtraction) {
        let id = &asset.id;
        self.index.record_all(TokenKind::Selector, &ex.selectors, id);
        self.index.record_all(TokenKind::Property, &ex.properties, id);
        self.index.record_all(TokenKind::Keyframes, &ex.keyframes, id);
        self.metrics.css.push(CssFileMetrics::new(asset, ex));
    }

    fn fold_html(&mut self, asset: &Asset, ex: &HtmlExtraction) {
        let id = &asset.id;
        let production = self.production.is_production(id);
        if production {
            self.index.record_all(TokenKind::InlineStyle, &ex.inline_styles, id);
            self.index.record_all(TokenKind::ClassAttr, &ex.class_attrs, id);
            self.index.record_all(TokenKind::ButtonClass, &ex.button_classes, id);
            self.index.record_all(TokenKind::CtaClass, &ex.cta_classes, id);
            self.index.record_all(TokenKind::StylesheetRef, &ex.stylesheet_refs, id);
            self.index.record_all(TokenKind::ScriptRef, &ex.script_refs, id);
        }
        self.metrics
            .html
            .push(HtmlPageMetrics::new(asset, ex, production));
    }

    fn fold_js(&mut self, asset: &Asset, ex: &JsExtraction) {
        let id = &asset.id;
        self.index.record_all(TokenKind::FunctionName, &ex.functions, id);
        self.index.record_all(TokenKind::EventListener, &ex.event_listeners, id);
        self.index.record_all(TokenKind::GlobalConstant, &ex.global_constants, id);
        self.metrics.js.push(JsFileMetrics::new(asset, ex));
    }

    pub fn finish(mut self) -> AuditRun {
        self.metrics.read_errors.sort();
        AuditRun {
            index: self.index,
            metrics: self.metrics,
        }
    }
}
