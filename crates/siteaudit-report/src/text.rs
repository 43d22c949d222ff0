use colored::Colorize;

use siteaudit_core::findings::{AuditFindings, FileCount};
use siteaudit_core::index::{TokenCount, TokenSpread};

const RULE_WIDTH: usize = 40;

/// Options for the console-style report.
#[derive(Debug, Clone, Copy)]
pub struct TextOptions {
    /// Emit ANSI colors. Always false for the report file.
    pub color: bool,
    /// Entries shown per category before the truncation marker.
    pub top_n: usize,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            color: false,
            top_n: 15,
        }
    }
}

#[derive(Clone, Copy)]
struct Paint(bool);

impl Paint {
    fn bold(self, s: &str) -> String {
        if self.0 {
            s.bold().to_string()
        } else {
            s.to_string()
        }
    }

    fn warn(self, s: &str) -> String {
        if self.0 {
            s.yellow().bold().to_string()
        } else {
            s.to_string()
        }
    }

    fn good(self, s: &str) -> String {
        if self.0 {
            s.green().to_string()
        } else {
            s.to_string()
        }
    }

    fn dim(self, s: &str) -> String {
        if self.0 {
            s.dimmed().to_string()
        } else {
            s.to_string()
        }
    }
}

/// Format the full audit as an ordered plain-text report.
pub fn format_report(findings: &AuditFindings, opts: &TextOptions) -> String {
    let p = Paint(opts.color);
    let n = opts.top_n;
    let mut out = String::new();

    out.push_str(&format!("\n{}\n", p.bold("Site Consolidation Audit")));
    out.push_str(&format!("{}\n", "=".repeat(RULE_WIDTH)));

    let s = &findings.summary;
    section(&mut out, p, "Summary");
    out.push_str(&format!(
        "  HTML pages: {} ({} production), {} bytes\n",
        s.html_pages, s.production_pages, s.html_bytes
    ));
    out.push_str(&format!("  CSS files:  {}, {} bytes\n", s.css_files, s.css_bytes));
    out.push_str(&format!("  JS files:   {}, {} bytes\n", s.js_files, s.js_bytes));

    // CSS
    let css = &findings.css;
    section(&mut out, p, "1. CSS");
    out.push_str(&format!("  Unique selectors: {}\n", css.unique_selectors));
    list(&mut out, p, "Duplicate selectors", &css.duplicate_selectors, n, spread_line);
    list(&mut out, p, "Duplicate keyframes", &css.duplicate_keyframes, n, spread_line);
    list(&mut out, p, "Most common properties", &css.common_properties, n, count_line);
    list(&mut out, p, "!important usage", &css.important_usage, n, file_line);
    list(&mut out, p, "Parallax-related stylesheets", &css.parallax_stylesheets, n, file_line);

    // HTML
    let html = &findings.html;
    section(&mut out, p, "2. HTML");
    list(
        &mut out,
        p,
        "Repeated inline styles (should become classes)",
        &html.repeated_inline_styles,
        n,
        spread_line,
    );
    list(&mut out, p, "Repeated class patterns", &html.class_patterns, n, spread_line);
    list(&mut out, p, "Button patterns", &html.button_patterns, n, count_line);
    list(&mut out, p, "CTA link patterns", &html.cta_patterns, n, count_line);
    list(
        &mut out,
        p,
        "Page-specific stylesheets",
        &html.page_specific_stylesheets,
        n,
        spread_line,
    );
    list(
        &mut out,
        p,
        "Inline code to externalize",
        &html.inline_code,
        n,
        |c| {
            let mut line = format!(
                "{}: {} style block(s), {} script block(s)",
                c.page, c.style_blocks, c.script_blocks
            );
            for preview in &c.previews {
                line.push_str(&format!("\n      > {preview}"));
            }
            line
        },
    );
    list(&mut out, p, "Dependency matrix", &html.dependency_matrix, n, |r| {
        format!(
            "{}: css={} js={} inline_css={} inline_js={} utility_classes={} total={}",
            r.html_file,
            r.css_files,
            r.js_files,
            r.inline_css_blocks,
            r.inline_js_blocks,
            yes_no(r.has_tailwind),
            r.total_dependencies
        )
    });

    // JS
    let js = &findings.js;
    section(&mut out, p, "3. JavaScript");
    list(&mut out, p, "Event listeners", &js.event_listeners, n, |l| {
        let mut line = format!(
            "{}: {} registration(s) in {} file(s)",
            l.event,
            l.registrations,
            l.files.len()
        );
        if l.redundant {
            line.push_str(" [redundant]");
        }
        line
    });
    list(&mut out, p, "Duplicate function names", &js.duplicate_functions, n, spread_line);
    list(&mut out, p, "Global constant collisions", &js.global_collisions, n, spread_line);
    list(&mut out, p, "Parallax systems (potential duplicates)", &js.parallax_systems, n, |sys| {
        format!(
            "{}: {} reference(s), RAF: {}, IO: {}",
            sys.file,
            sys.references,
            yes_no(sys.uses_raf),
            yes_no(sys.uses_io)
        )
    });

    // Cross-asset
    section(&mut out, p, "4. Cross-asset");
    list(&mut out, p, "Unreferenced assets", &findings.unreferenced_assets, n, |a| a.clone());
    list(&mut out, p, "Largest CSS files (bytes)", &s.largest_css, n, file_line);
    list(&mut out, p, "Largest JS files (bytes)", &s.largest_js, n, file_line);
    list(&mut out, p, "Read errors", &findings.read_errors, n, |e| {
        format!("{}: {}", e.path, e.message)
    });

    out.push('\n');
    out
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn section(out: &mut String, p: Paint, title: &str) {
    out.push_str(&format!("\n{}\n{}\n", p.bold(title), "-".repeat(RULE_WIDTH)));
}

fn list<T, F>(out: &mut String, p: Paint, title: &str, items: &[T], top_n: usize, render: F)
where
    F: Fn(&T) -> String,
{
    let count = items.len().to_string();
    if items.is_empty() {
        out.push_str(&format!("  {title} ({count}):\n"));
        out.push_str(&format!("    {}\n", p.good("None found")));
        return;
    }
    out.push_str(&format!("  {title} ({}):\n", p.warn(&count)));
    for item in items.iter().take(top_n) {
        out.push_str(&format!("    {}\n", render(item)));
    }
    if items.len() > top_n {
        out.push_str(&format!(
            "    {}\n",
            p.dim(&format!("... and {} more", items.len() - top_n))
        ));
    }
}

fn spread_line(s: &TokenSpread) -> String {
    format!(
        "{} [{}x in {} file(s)]: {}",
        s.value.replace('\n', " "),
        s.occurrences,
        s.files.len(),
        s.files.join(", ")
    )
}

fn count_line(c: &TokenCount) -> String {
    format!("{}: {}", c.value.replace('\n', " "), c.count)
}

fn file_line(f: &FileCount) -> String {
    format!("{}: {}", f.file, f.count)
}
