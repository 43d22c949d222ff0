use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use siteaudit_core::config::OutputConfig;
use siteaudit_core::error::AuditError;
use siteaudit_core::findings::AuditFindings;
use siteaudit_core::metrics::MetricsDump;

use crate::text::TextOptions;
use crate::{json, matrix, text};

/// Write `contents` to `path`, replacing whatever was there.
///
/// The file is opened once, written fully and flushed before it is closed, so
/// an interrupted run leaves at most a truncated file, never one mixed with a
/// previous run's content.
pub fn write_sink(path: &Path, contents: &str) -> Result<(), AuditError> {
    let sink_err = |source| AuditError::SinkWrite {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::create(path).map_err(sink_err)?;
    file.write_all(contents.as_bytes()).map_err(sink_err)?;
    file.flush().map_err(sink_err)?;
    tracing::info!("wrote {}", path.display());
    Ok(())
}

/// Write the four report files into `dir`. Returns the paths written.
pub fn write_reports(
    findings: &AuditFindings,
    metrics: &MetricsDump,
    output: &OutputConfig,
    dir: &Path,
    top_n: usize,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;

    let plain = TextOptions {
        color: false,
        top_n,
    };
    let sinks = [
        (&output.text_report, text::format_report(findings, &plain)),
        (&output.findings_json, json::format_findings(findings, false)?),
        (
            &output.dependency_matrix_csv,
            matrix::format_dependency_matrix(&findings.html.dependency_matrix)?,
        ),
        (&output.metrics_json, json::format_metrics(metrics)?),
    ];

    let mut written = Vec::with_capacity(sinks.len());
    for (name, contents) in sinks {
        let path = dir.join(name);
        write_sink(&path, &contents)?;
        written.push(path);
    }
    Ok(written)
}
