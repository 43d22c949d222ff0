use anyhow::{Context, Result};
use serde::Serialize;

use siteaudit_core::findings::AuditFindings;
use siteaudit_core::metrics::MetricsDump;

fn to_json<T: Serialize>(value: &T, compact: bool) -> Result<String> {
    let mut json = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    }
    .context("failed to serialize report")?;
    json.push('\n');
    Ok(json)
}

/// Format all findings as JSON.
pub fn format_findings(findings: &AuditFindings, compact: bool) -> Result<String> {
    to_json(findings, compact)
}

/// Format the per-file metrics dump as pretty JSON.
pub fn format_metrics(metrics: &MetricsDump) -> Result<String> {
    to_json(metrics, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{sample_findings, sample_run};

    #[test]
    fn test_findings_json_structure() {
        let json = format_findings(&sample_findings(), false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["summary"]["css_files"], 2);
        assert_eq!(value["css"]["duplicate_selectors"][0]["value"], ".hero-title");
        assert_eq!(value["js"]["event_listeners"][0]["redundant"], true);
    }

    #[test]
    fn test_findings_json_deterministic() {
        let a = format_findings(&sample_findings(), false).unwrap();
        let b = format_findings(&sample_findings(), false).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_compact_is_single_line() {
        let json = format_findings(&sample_findings(), true).unwrap();
        assert_eq!(json.trim_end().lines().count(), 1);
    }

    #[test]
    fn test_metrics_round_trip() {
        let run = sample_run();
        let json = format_metrics(&run.metrics).unwrap();
        let back: MetricsDump = serde_json::from_str(&json).unwrap();
        assert_eq!(back, run.metrics);
    }
}
