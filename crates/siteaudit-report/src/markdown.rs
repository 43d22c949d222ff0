use siteaudit_core::findings::{AuditFindings, FileCount};
use siteaudit_core::index::{TokenCount, TokenSpread};

/// Format the audit as Markdown, `top_n` rows per table.
pub fn format_report(findings: &AuditFindings, top_n: usize) -> String {
    let mut out = String::new();

    out.push_str("# Site Consolidation Audit\n\n");

    let s = &findings.summary;
    out.push_str("## Summary\n\n");
    out.push_str("| Kind | Files | Bytes |\n");
    out.push_str("|------|-------|-------|\n");
    out.push_str(&format!(
        "| HTML | {} ({} production) | {} |\n",
        s.html_pages, s.production_pages, s.html_bytes
    ));
    out.push_str(&format!("| CSS | {} | {} |\n", s.css_files, s.css_bytes));
    out.push_str(&format!("| JS | {} | {} |\n", s.js_files, s.js_bytes));

    out.push_str("\n## CSS\n\n");
    out.push_str(&format!(
        "**Unique selectors:** {}\n",
        findings.css.unique_selectors
    ));
    spread_table(&mut out, "Duplicate Selectors", "Selector", &findings.css.duplicate_selectors, top_n);
    spread_table(&mut out, "Duplicate Keyframes", "Keyframes", &findings.css.duplicate_keyframes, top_n);
    count_table(&mut out, "Most Common Properties", "Property", &findings.css.common_properties, top_n);
    file_table(&mut out, "!important Usage", "Markers", &findings.css.important_usage, top_n);
    file_table(
        &mut out,
        "Parallax-Related Stylesheets",
        "Rules",
        &findings.css.parallax_stylesheets,
        top_n,
    );

    let html = &findings.html;
    out.push_str("\n## HTML\n");
    spread_table(&mut out, "Repeated Inline Styles", "Style", &html.repeated_inline_styles, top_n);
    spread_table(&mut out, "Repeated Class Patterns", "Class", &html.class_patterns, top_n);
    count_table(&mut out, "Button Patterns", "Class", &html.button_patterns, top_n);
    count_table(&mut out, "CTA Link Patterns", "Class", &html.cta_patterns, top_n);
    spread_table(
        &mut out,
        "Page-Specific Stylesheets",
        "Stylesheet",
        &html.page_specific_stylesheets,
        top_n,
    );

    out.push_str("\n### Inline Code to Externalize\n\n");
    if html.inline_code.is_empty() {
        out.push_str("None found.\n");
    } else {
        out.push_str("| Page | Style Blocks | Script Blocks |\n");
        out.push_str("|------|--------------|---------------|\n");
        for c in html.inline_code.iter().take(top_n) {
            out.push_str(&format!(
                "| {} | {} | {} |\n",
                cell(&c.page),
                c.style_blocks,
                c.script_blocks
            ));
        }
        more(&mut out, html.inline_code.len(), top_n);
    }

    out.push_str("\n### Dependency Matrix\n\n");
    if html.dependency_matrix.is_empty() {
        out.push_str("None found.\n");
    } else {
        out.push_str("| Page | CSS | JS | Inline CSS | Inline JS | Utility Classes | Total |\n");
        out.push_str("|------|-----|----|------------|-----------|-----------------|-------|\n");
        for r in &html.dependency_matrix {
            out.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} |\n",
                cell(&r.html_file),
                r.css_files,
                r.js_files,
                r.inline_css_blocks,
                r.inline_js_blocks,
                yes_no(r.has_tailwind),
                r.total_dependencies
            ));
        }
    }

    let js = &findings.js;
    out.push_str("\n## JavaScript\n\n### Event Listeners\n\n");
    if js.event_listeners.is_empty() {
        out.push_str("None found.\n");
    } else {
        out.push_str("| Event | Registrations | Files | Redundant |\n");
        out.push_str("|-------|---------------|-------|-----------|\n");
        for l in js.event_listeners.iter().take(top_n) {
            out.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                cell(&l.event),
                l.registrations,
                l.files.join(", "),
                yes_no(l.redundant)
            ));
        }
        more(&mut out, js.event_listeners.len(), top_n);
    }
    spread_table(&mut out, "Duplicate Function Names", "Function", &js.duplicate_functions, top_n);
    spread_table(&mut out, "Global Constant Collisions", "Constant", &js.global_collisions, top_n);

    out.push_str("\n### Parallax Systems\n\n");
    if js.parallax_systems.is_empty() {
        out.push_str("None found.\n");
    } else {
        out.push_str("| File | References | RAF | IO |\n");
        out.push_str("|------|------------|-----|----|\n");
        for sys in js.parallax_systems.iter().take(top_n) {
            out.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                cell(&sys.file),
                sys.references,
                yes_no(sys.uses_raf),
                yes_no(sys.uses_io)
            ));
        }
        more(&mut out, js.parallax_systems.len(), top_n);
    }

    out.push_str("\n## Cross-Asset\n\n### Unreferenced Assets\n\n");
    if findings.unreferenced_assets.is_empty() {
        out.push_str("None found.\n");
    } else {
        for a in &findings.unreferenced_assets {
            out.push_str(&format!("- `{a}`\n"));
        }
    }
    file_table(&mut out, "Largest CSS Files", "Bytes", &s.largest_css, top_n);
    file_table(&mut out, "Largest JS Files", "Bytes", &s.largest_js, top_n);

    out.push_str("\n### Read Errors\n\n");
    if findings.read_errors.is_empty() {
        out.push_str("None found.\n");
    } else {
        for e in &findings.read_errors {
            out.push_str(&format!("- `{}`: {}\n", e.path, e.message));
        }
    }

    out
}

/// Escape a value for a table cell.
fn cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn more(out: &mut String, len: usize, top_n: usize) {
    if len > top_n {
        out.push_str(&format!("\n_... and {} more_\n", len - top_n));
    }
}

fn spread_table(out: &mut String, title: &str, column: &str, rows: &[TokenSpread], top_n: usize) {
    out.push_str(&format!("\n### {title}\n\n"));
    if rows.is_empty() {
        out.push_str("None found.\n");
        return;
    }
    out.push_str(&format!("| {column} | Occurrences | Files |\n"));
    out.push_str("|---|---|---|\n");
    for r in rows.iter().take(top_n) {
        out.push_str(&format!(
            "| `{}` | {} | {} |\n",
            cell(&r.value),
            r.occurrences,
            r.files.join(", ")
        ));
    }
    more(out, rows.len(), top_n);
}

fn count_table(out: &mut String, title: &str, column: &str, rows: &[TokenCount], top_n: usize) {
    out.push_str(&format!("\n### {title}\n\n"));
    if rows.is_empty() {
        out.push_str("None found.\n");
        return;
    }
    out.push_str(&format!("| {column} | Count |\n"));
    out.push_str("|---|---|\n");
    for r in rows.iter().take(top_n) {
        out.push_str(&format!("| `{}` | {} |\n", cell(&r.value), r.count));
    }
    more(out, rows.len(), top_n);
}

fn file_table(out: &mut String, title: &str, column: &str, rows: &[FileCount], top_n: usize) {
    out.push_str(&format!("\n### {title}\n\n"));
    if rows.is_empty() {
        out.push_str("None found.\n");
        return;
    }
    out.push_str(&format!("| File | {column} |\n"));
    out.push_str("|---|---|\n");
    for r in rows.iter().take(top_n) {
        out.push_str(&format!("| {} | {} |\n", cell(&r.file), r.count));
    }
    more(out, rows.len(), top_n);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::sample_findings;

    #[test]
    fn test_markdown_has_tables() {
        let md = format_report(&sample_findings(), 15);
        assert!(md.starts_with("# Site Consolidation Audit"));
        assert!(md.contains("| `.hero-title` | 2 | css/a.css, css/b.css |"));
        assert!(md.contains("| `margin:0` | 4 | about.html, index.html |"));
    }

    #[test]
    fn test_markdown_parallax_table() {
        let md = format_report(&sample_findings(), 15);
        assert!(md.contains("### Parallax Systems\n\n| File | References | RAF | IO |"));
        assert!(md.contains("| js/main.js | 2 | yes | no |"));
    }

    #[test]
    fn test_markdown_truncates() {
        let md = format_report(&sample_findings(), 1);
        assert!(md.contains("_... and 2 more_"));
    }

    #[test]
    fn test_cell_escapes_pipes() {
        assert_eq!(cell("a|b\nc"), "a\\|b c");
    }
}
