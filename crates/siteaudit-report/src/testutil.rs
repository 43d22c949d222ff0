use std::path::PathBuf;

use siteaudit_core::aggregate::{Aggregator, AuditRun, ProductionPages};
use siteaudit_core::config::Config;
use siteaudit_core::extractor::{
    CssExtraction, Extraction, HtmlExtraction, JsCounters, JsExtraction, JsFeatures,
};
use siteaudit_core::findings::{build_findings, AuditFindings};
use siteaudit_core::types::{Asset, AssetId, AssetKind};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn asset(id: &str, kind: AssetKind, content: &str) -> Asset {
    Asset::new(AssetId::new(id), PathBuf::from(id), kind, content.to_string())
}

/// Two stylesheets sharing `.hero-title`, two pages, two scripts; only
/// `js/main.js` references parallax.
pub fn sample_run() -> AuditRun {
    let mut agg = Aggregator::new(ProductionPages::default());

    agg.fold(
        &asset("css/a.css", AssetKind::Css, ".hero-title { color: red !important; }\n"),
        &Extraction::Css(CssExtraction {
            selectors: strings(&[".hero-title", ".only-a"]),
            properties: strings(&["color", "margin", "color"]),
            important_count: 1,
            ..Default::default()
        }),
    );
    agg.fold(
        &asset("css/b.css", AssetKind::Css, ".hero-title { color: red; }\n"),
        &Extraction::Css(CssExtraction {
            selectors: strings(&[".hero-title"]),
            properties: strings(&["color", "padding"]),
            ..Default::default()
        }),
    );

    for page in ["about.html", "index.html"] {
        agg.fold(
            &asset(page, AssetKind::Html, "<html></html>\n"),
            &Extraction::Html(HtmlExtraction {
                inline_styles: strings(&["margin:0", "margin:0"]),
                stylesheet_refs: strings(&["css/a.css"]),
                script_refs: strings(&["js/main.js"]),
                script_blocks: strings(&["init();"]),
                ..Default::default()
            }),
        );
    }

    for (script, parallax) in [("js/main.js", 2), ("js/nav.js", 0)] {
        agg.fold(
            &asset(script, AssetKind::Js, "function init() {}\n"),
            &Extraction::Js(JsExtraction {
                functions: strings(&["init"]),
                event_listeners: strings(&["scroll"]),
                counters: JsCounters {
                    parallax_references: parallax,
                    ..Default::default()
                },
                features: JsFeatures {
                    animation_frame: parallax > 0,
                    ..Default::default()
                },
                ..Default::default()
            }),
        );
    }

    agg.finish()
}

pub fn sample_findings() -> AuditFindings {
    build_findings(&sample_run(), &Config::default())
}
