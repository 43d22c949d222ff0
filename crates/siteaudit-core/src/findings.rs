use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::aggregate::AuditRun;
use crate::config::Config;
use crate::index::{OccurrenceIndex, TokenCount, TokenSpread};
use crate::metrics::MetricsDump;
use crate::types::{ReadError, TokenKind};

const LARGEST_FILES: usize = 5;

/// Duplication and conflict findings derived from one run.
///
/// Read-only view: built after aggregation, rendered, then discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditFindings {
    pub summary: Summary,
    pub css: CssFindings,
    pub html: HtmlFindings,
    pub js: JsFindings,
    pub unreferenced_assets: Vec<String>,
    pub read_errors: Vec<ReadError>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub html_pages: usize,
    pub production_pages: usize,
    pub css_files: usize,
    pub js_files: usize,
    pub html_bytes: usize,
    pub css_bytes: usize,
    pub js_bytes: usize,
    pub largest_css: Vec<FileCount>,
    pub largest_js: Vec<FileCount>,
}

/// A file with a count (bytes, markers, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCount {
    pub file: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CssFindings {
    pub unique_selectors: usize,
    pub duplicate_selectors: Vec<TokenSpread>,
    pub duplicate_keyframes: Vec<TokenSpread>,
    pub common_properties: Vec<TokenCount>,
    pub important_usage: Vec<FileCount>,
    /// Stylesheets carrying parallax or scroll-effect rules.
    pub parallax_stylesheets: Vec<FileCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HtmlFindings {
    pub repeated_inline_styles: Vec<TokenSpread>,
    pub class_patterns: Vec<TokenSpread>,
    pub button_patterns: Vec<TokenCount>,
    pub cta_patterns: Vec<TokenCount>,
    pub page_specific_stylesheets: Vec<TokenSpread>,
    pub inline_code: Vec<InlineCode>,
    pub dependency_matrix: Vec<DependencyRow>,
}

/// A page carrying inline blocks that should move to external files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineCode {
    pub page: String,
    pub style_blocks: usize,
    pub script_blocks: usize,
    pub previews: Vec<String>,
}

/// One row of the HTML dependency matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRow {
    pub html_file: String,
    pub css_files: usize,
    pub js_files: usize,
    pub inline_css_blocks: usize,
    pub inline_js_blocks: usize,
    pub has_tailwind: bool,
    pub total_dependencies: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsFindings {
    pub event_listeners: Vec<ListenerUsage>,
    pub duplicate_functions: Vec<TokenSpread>,
    pub global_collisions: Vec<TokenSpread>,
    pub parallax_systems: Vec<ParallaxSystem>,
}

/// A script that references parallax; several of these usually means
/// competing implementations of the same effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallaxSystem {
    pub file: String,
    pub references: usize,
    pub uses_raf: bool,
    pub uses_io: bool,
}

/// Registrations of one event type across scripts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerUsage {
    pub event: String,
    pub registrations: usize,
    pub files: Vec<String>,
    /// Registered in more than one script.
    pub redundant: bool,
}

/// Stylesheet references grouped by the file they resolve to, so that
/// `css/a.css`, `./css/a.css` and `/css/a.css?v=2` count as one sheet.
/// External references keep their raw href as the key. Ordered by key.
fn stylesheet_usage(index: &OccurrenceIndex) -> Vec<TokenSpread> {
    let mut grouped: BTreeMap<String, TokenSpread> = BTreeMap::new();
    for occ in index.category(TokenKind::StylesheetRef) {
        let key = normalize_reference(&occ.token.value)
            .unwrap_or_else(|| occ.token.value.clone());
        let entry = grouped.entry(key.clone()).or_insert_with(|| TokenSpread {
            value: key,
            occurrences: 0,
            files: Vec::new(),
        });
        entry.occurrences += occ.count();
        entry
            .files
            .extend(occ.distinct_assets().into_iter().map(|a| a.0.clone()));
    }
    grouped
        .into_values()
        .map(|mut spread| {
            spread.files.sort();
            spread.files.dedup();
            spread
        })
        .collect()
}

/// Derive all findings from a completed run.
pub fn build_findings(run: &AuditRun, config: &Config) -> AuditFindings {
    let t = &config.thresholds;
    let index = &run.index;

    let css = CssFindings {
        unique_selectors: index.token_count(TokenKind::Selector),
        duplicate_selectors: index.spread_across(TokenKind::Selector, t.duplicate_min_files),
        duplicate_keyframes: index.spread_across(TokenKind::Keyframes, t.duplicate_min_files),
        common_properties: index.counts(TokenKind::Property),
        important_usage: important_usage(&run.metrics),
        parallax_stylesheets: parallax_stylesheets(&run.metrics),
    };

    let page_specific: Vec<TokenSpread> = stylesheet_usage(index)
        .into_iter()
        .filter(|spread| spread.files.len() <= t.page_specific_max_pages)
        .collect();

    let html = HtmlFindings {
        repeated_inline_styles: index
            .frequent(TokenKind::InlineStyle, t.inline_style_min_occurrences),
        class_patterns: index.spread_across(TokenKind::ClassAttr, t.duplicate_min_files),
        button_patterns: index.counts(TokenKind::ButtonClass),
        cta_patterns: index.counts(TokenKind::CtaClass),
        page_specific_stylesheets: page_specific,
        inline_code: inline_code(&run.metrics),
        dependency_matrix: dependency_matrix(&run.metrics),
    };

    let mut listeners: Vec<_> = index
        .category(TokenKind::EventListener)
        .map(|occ| {
            let spread = occ.spread();
            ListenerUsage {
                redundant: spread.files.len() >= t.duplicate_min_files,
                event: spread.value,
                registrations: spread.occurrences,
                files: spread.files,
            }
        })
        .collect();
    listeners.sort_by(|a, b| {
        b.registrations
            .cmp(&a.registrations)
            .then(b.files.len().cmp(&a.files.len()))
            .then_with(|| a.event.cmp(&b.event))
    });

    let js = JsFindings {
        event_listeners: listeners,
        duplicate_functions: index.spread_across(TokenKind::FunctionName, t.duplicate_min_files),
        global_collisions: index.spread_across(TokenKind::GlobalConstant, t.duplicate_min_files),
        parallax_systems: parallax_systems(&run.metrics),
    };

    AuditFindings {
        summary: summary(&run.metrics),
        css,
        html,
        js,
        unreferenced_assets: unreferenced_assets(&run.metrics),
        read_errors: run.metrics.read_errors.clone(),
    }
}

fn summary(m: &MetricsDump) -> Summary {
    let largest = |files: Vec<FileCount>| {
        let mut files = files;
        files.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.file.cmp(&b.file)));
        files.truncate(LARGEST_FILES);
        files
    };

    Summary {
        html_pages: m.html.len(),
        production_pages: m.html.iter().filter(|p| p.production).count(),
        css_files: m.css.len(),
        js_files: m.js.len(),
        html_bytes: m.html.iter().map(|p| p.bytes).sum(),
        css_bytes: m.css.iter().map(|f| f.bytes).sum(),
        js_bytes: m.js.iter().map(|f| f.bytes).sum(),
        largest_css: largest(
            m.css
                .iter()
                .map(|f| FileCount {
                    file: f.file.clone(),
                    count: f.bytes,
                })
                .collect(),
        ),
        largest_js: largest(
            m.js.iter()
                .map(|f| FileCount {
                    file: f.file.clone(),
                    count: f.bytes,
                })
                .collect(),
        ),
    }
}

fn parallax_stylesheets(m: &MetricsDump) -> Vec<FileCount> {
    let mut usage: Vec<_> = m
        .css
        .iter()
        .filter(|f| f.parallax_rules > 0)
        .map(|f| FileCount {
            file: f.file.clone(),
            count: f.parallax_rules,
        })
        .collect();
    usage.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.file.cmp(&b.file)));
    usage
}

/// Scripts with parallax references, in file order.
fn parallax_systems(m: &MetricsDump) -> Vec<ParallaxSystem> {
    m.js.iter()
        .filter(|f| f.counters.parallax_references > 0)
        .map(|f| ParallaxSystem {
            file: f.file.clone(),
            references: f.counters.parallax_references,
            uses_raf: f.features.animation_frame,
            uses_io: f.counters.intersection_observers > 0,
        })
        .collect()
}

fn important_usage(m: &MetricsDump) -> Vec<FileCount> {
    let mut usage: Vec<_> = m
        .css
        .iter()
        .filter(|f| f.important_rules > 0)
        .map(|f| FileCount {
            file: f.file.clone(),
            count: f.important_rules,
        })
        .collect();
    usage.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.file.cmp(&b.file)));
    usage
}

fn inline_code(m: &MetricsDump) -> Vec<InlineCode> {
    m.html
        .iter()
        .filter(|p| p.inline_style_blocks + p.inline_script_blocks > 0)
        .map(|p| InlineCode {
            page: p.file.clone(),
            style_blocks: p.inline_style_blocks,
            script_blocks: p.inline_script_blocks,
            previews: p.inline_previews.clone(),
        })
        .collect()
}

fn dependency_matrix(m: &MetricsDump) -> Vec<DependencyRow> {
    m.html
        .iter()
        .map(|p| DependencyRow {
            html_file: p.file.clone(),
            css_files: p.stylesheets.len(),
            js_files: p.scripts.len(),
            inline_css_blocks: p.inline_style_blocks,
            inline_js_blocks: p.inline_script_blocks,
            has_tailwind: p.has_utility_framework,
            total_dependencies: p.total_dependencies,
        })
        .collect()
}

/// Strip `./`, leading `/`, query, and fragment from a reference path.
/// External URLs yield `None`.
pub fn normalize_reference(reference: &str) -> Option<String> {
    let r = reference.trim();
    if r.is_empty() || r.starts_with("//") || r.contains("://") || r.starts_with("data:") {
        return None;
    }
    let r = r.split(['?', '#']).next().unwrap_or(r);
    let mut r = r;
    loop {
        if let Some(rest) = r.strip_prefix("./") {
            r = rest;
        } else if let Some(rest) = r.strip_prefix('/') {
            r = rest;
        } else {
            break;
        }
    }
    if r.is_empty() {
        None
    } else {
        Some(r.to_string())
    }
}

fn is_referenced(asset: &str, references: &[String]) -> bool {
    references.iter().any(|r| {
        r == asset || asset.ends_with(&format!("/{r}")) || r.ends_with(&format!("/{asset}"))
    })
}

/// CSS and JS files that no HTML page links to.
fn unreferenced_assets(m: &MetricsDump) -> Vec<String> {
    let references: Vec<String> = m
        .html
        .iter()
        .flat_map(|p| p.stylesheets.iter().chain(p.scripts.iter()))
        .filter_map(|r| normalize_reference(r))
        .collect();

    let mut orphans: Vec<String> = m
        .css
        .iter()
        .map(|f| &f.file)
        .chain(m.js.iter().map(|f| &f.file))
        .filter(|file| !is_referenced(file, &references))
        .cloned()
        .collect();
    orphans.sort();
    orphans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{Aggregator, ProductionPages};
    use crate::extractor::{
        CssExtraction, Extraction, HtmlExtraction, JsCounters, JsExtraction, JsFeatures,
    };
    use crate::types::{Asset, AssetId, AssetKind};
    use std::path::PathBuf;

    fn asset(id: &str, kind: AssetKind) -> Asset {
        Asset::new(AssetId::new(id), PathBuf::from(id), kind, "x\n".to_string())
    }

    fn css(selectors: &[&str]) -> Extraction {
        Extraction::Css(CssExtraction {
            selectors: selectors.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        })
    }

    fn html(styles: &[&str], sheets: &[&str]) -> Extraction {
        Extraction::Html(HtmlExtraction {
            inline_styles: styles.iter().map(|s| s.to_string()).collect(),
            stylesheet_refs: sheets.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        })
    }

    #[test]
    fn test_duplicate_selector_requires_two_files() {
        let mut agg = Aggregator::new(ProductionPages::default());
        agg.fold(&asset("css/a.css", AssetKind::Css), &css(&[".hero-title", ".only-a", ".only-a"]));
        agg.fold(&asset("css/b.css", AssetKind::Css), &css(&[".hero-title"]));
        let findings = build_findings(&agg.finish(), &Config::default());

        assert_eq!(findings.css.unique_selectors, 2);
        assert_eq!(findings.css.duplicate_selectors.len(), 1);
        let dup = &findings.css.duplicate_selectors[0];
        assert_eq!(dup.value, ".hero-title");
        assert_eq!(dup.files, vec!["css/a.css", "css/b.css"]);
    }

    #[test]
    fn test_inline_style_threshold_scenario() {
        let mut agg = Aggregator::new(ProductionPages::default());
        for i in 0..13 {
            let name = format!("page{i:02}.html");
            let styles: &[&str] = if i < 4 { &["margin:0"] } else { &["padding:0"] };
            let styles = if i < 2 { &["margin:0", "color:red"][..] } else { styles };
            agg.fold(&asset(&name, AssetKind::Html), &html(styles, &[]));
        }
        let findings = build_findings(&agg.finish(), &Config::default());

        let styles = &findings.html.repeated_inline_styles;
        let margin = styles.iter().find(|s| s.value == "margin:0").unwrap();
        assert_eq!(margin.occurrences, 4);
        assert_eq!(
            margin.files,
            vec!["page00.html", "page01.html", "page02.html", "page03.html"]
        );
        assert!(
            !styles.iter().any(|s| s.value == "color:red"),
            "two occurrences stay below the threshold"
        );
    }

    #[test]
    fn test_page_specific_stylesheets() {
        let mut agg = Aggregator::new(ProductionPages::default());
        agg.fold(&asset("a.html", AssetKind::Html), &html(&[], &["css/site.css", "css/jury.css"]));
        agg.fold(&asset("b.html", AssetKind::Html), &html(&[], &["css/site.css"]));
        agg.fold(&asset("c.html", AssetKind::Html), &html(&[], &["css/site.css"]));
        let findings = build_findings(&agg.finish(), &Config::default());

        let specific: Vec<_> = findings
            .html
            .page_specific_stylesheets
            .iter()
            .map(|s| s.value.as_str())
            .collect();
        assert_eq!(specific, vec!["css/jury.css"]);
    }

    #[test]
    fn test_page_specific_groups_spellings_of_one_sheet() {
        let mut agg = Aggregator::new(ProductionPages::default());
        agg.fold(&asset("a.html", AssetKind::Html), &html(&[], &["css/site.css"]));
        agg.fold(&asset("b.html", AssetKind::Html), &html(&[], &["./css/site.css"]));
        agg.fold(
            &asset("c.html", AssetKind::Html),
            &html(&[], &["/css/site.css?v=2", "./css/jury.css"]),
        );
        let findings = build_findings(&agg.finish(), &Config::default());

        let specific = &findings.html.page_specific_stylesheets;
        assert_eq!(specific.len(), 1, "{specific:?}");
        assert_eq!(specific[0].value, "css/jury.css");
        assert_eq!(specific[0].files, vec!["c.html"]);
    }

    #[test]
    fn test_inline_style_at_threshold_is_reported() {
        let mut agg = Aggregator::new(ProductionPages::default());
        agg.fold(&asset("a.html", AssetKind::Html), &html(&["margin:0", "margin:0"], &[]));
        agg.fold(&asset("b.html", AssetKind::Html), &html(&["margin:0", "gap:1rem"], &[]));
        agg.fold(&asset("c.html", AssetKind::Html), &html(&["gap:1rem"], &[]));
        let findings = build_findings(&agg.finish(), &Config::default());

        let styles = &findings.html.repeated_inline_styles;
        assert_eq!(styles.len(), 1, "{styles:?}");
        assert_eq!(styles[0].value, "margin:0");
        assert_eq!(styles[0].occurrences, 3);
        assert_eq!(styles[0].files, vec!["a.html", "b.html"]);
    }

    #[test]
    fn test_global_collision_and_listeners() {
        let mut agg = Aggregator::new(ProductionPages::default());
        let a = Extraction::Js(JsExtraction {
            global_constants: vec!["API_URL".into()],
            event_listeners: vec!["scroll".into(), "scroll".into(), "click".into()],
            ..Default::default()
        });
        let b = Extraction::Js(JsExtraction {
            global_constants: vec!["API_URL".into(), "MAX".into()],
            event_listeners: vec!["scroll".into()],
            ..Default::default()
        });
        agg.fold(&asset("js/a.js", AssetKind::Js), &a);
        agg.fold(&asset("js/b.js", AssetKind::Js), &b);
        let findings = build_findings(&agg.finish(), &Config::default());

        assert_eq!(findings.js.global_collisions.len(), 1);
        assert_eq!(findings.js.global_collisions[0].value, "API_URL");

        let scroll = &findings.js.event_listeners[0];
        assert_eq!(scroll.event, "scroll");
        assert_eq!(scroll.registrations, 3);
        assert!(scroll.redundant);
        let click = &findings.js.event_listeners[1];
        assert!(!click.redundant);
    }

    #[test]
    fn test_parallax_systems_and_stylesheets() {
        let mut agg = Aggregator::new(ProductionPages::default());
        let layered = Extraction::Js(JsExtraction {
            counters: JsCounters {
                parallax_references: 4,
                intersection_observers: 1,
                ..Default::default()
            },
            features: JsFeatures {
                animation_frame: true,
                ..Default::default()
            },
            ..Default::default()
        });
        agg.fold(&asset("js/a.js", AssetKind::Js), &layered);
        agg.fold(&asset("js/b.js", AssetKind::Js), &Extraction::Js(JsExtraction::default()));
        agg.fold(
            &asset("css/hero.css", AssetKind::Css),
            &Extraction::Css(CssExtraction {
                parallax_rule_count: 2,
                ..Default::default()
            }),
        );
        agg.fold(&asset("css/plain.css", AssetKind::Css), &css(&[]));
        let findings = build_findings(&agg.finish(), &Config::default());

        assert_eq!(
            findings.js.parallax_systems,
            vec![ParallaxSystem {
                file: "js/a.js".into(),
                references: 4,
                uses_raf: true,
                uses_io: true,
            }]
        );
        assert_eq!(
            findings.css.parallax_stylesheets,
            vec![FileCount {
                file: "css/hero.css".into(),
                count: 2,
            }]
        );
    }

    #[test]
    fn test_unreferenced_assets() {
        let mut agg = Aggregator::new(ProductionPages::default());
        agg.fold(
            &asset("index.html", AssetKind::Html),
            &html(&[], &["./css/site.css?v=3", "https://cdn.example.com/x.css"]),
        );
        agg.fold(&asset("css/site.css", AssetKind::Css), &css(&[]));
        agg.fold(&asset("css/legacy.css", AssetKind::Css), &css(&[]));
        let findings = build_findings(&agg.finish(), &Config::default());

        assert_eq!(findings.unreferenced_assets, vec!["css/legacy.css"]);
    }

    #[test]
    fn test_normalize_reference() {
        assert_eq!(normalize_reference("/css/a.css#x").as_deref(), Some("css/a.css"));
        assert_eq!(normalize_reference("./js/a.js?v=1").as_deref(), Some("js/a.js"));
        assert_eq!(normalize_reference("//cdn.site/a.js"), None);
        assert_eq!(normalize_reference("https://cdn.site/a.js"), None);
        assert_eq!(normalize_reference("  "), None);
    }

    #[test]
    fn test_empty_run_has_empty_findings() {
        let findings = build_findings(&AuditRun::default(), &Config::default());
        assert_eq!(findings.summary.html_pages, 0);
        assert!(findings.css.duplicate_selectors.is_empty());
        assert!(findings.html.dependency_matrix.is_empty());
        assert!(findings.unreferenced_assets.is_empty());
    }
}
