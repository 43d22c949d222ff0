//! HTML dependency matrix export.
//!
//! One row per page, in the fixed column order below.

use anyhow::{Context, Result};
use csv::Writer;

use siteaudit_core::findings::DependencyRow;

pub const HEADER: [&str; 7] = [
    "html_file",
    "css_files",
    "js_files",
    "inline_css_blocks",
    "inline_js_blocks",
    "has_tailwind",
    "total_dependencies",
];

/// Format the dependency matrix as CSV. The header is written even when
/// there are no rows.
pub fn format_dependency_matrix(rows: &[DependencyRow]) -> Result<String> {
    let mut writer = Writer::from_writer(Vec::new());
    writer
        .write_record(HEADER)
        .context("failed to write CSV header")?;

    for row in rows {
        writer
            .write_record(&[
                row.html_file.clone(),
                row.css_files.to_string(),
                row.js_files.to_string(),
                row.inline_css_blocks.to_string(),
                row.inline_js_blocks.to_string(),
                row.has_tailwind.to_string(),
                row.total_dependencies.to_string(),
            ])
            .with_context(|| format!("failed to write CSV row for {}", row.html_file))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("failed to flush CSV writer: {e}"))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}
