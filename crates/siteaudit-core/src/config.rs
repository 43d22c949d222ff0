use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::types::AssetKind;

pub const CONFIG_FILE: &str = ".siteaudit.toml";

/// Top-level configuration from `.siteaudit.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default)]
    pub html: HtmlConfig,
    #[serde(default)]
    pub thresholds: ThresholdsConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where each asset kind lives, relative to the project root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsConfig {
    #[serde(default = "default_html_dir")]
    pub html_dir: PathBuf,
    #[serde(default = "default_css_dir")]
    pub css_dir: PathBuf,
    #[serde(default = "default_js_dir")]
    pub js_dir: PathBuf,
    /// Glob patterns matched against file names and relative paths.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

fn default_html_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_css_dir() -> PathBuf {
    PathBuf::from("css")
}
fn default_js_dir() -> PathBuf {
    PathBuf::from("js")
}
fn default_exclude() -> Vec<String> {
    vec!["output.css".to_string()]
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            html_dir: default_html_dir(),
            css_dir: default_css_dir(),
            js_dir: default_js_dir(),
            exclude: default_exclude(),
        }
    }
}

impl AssetsConfig {
    pub fn dir_for(&self, kind: AssetKind) -> &Path {
        match kind {
            AssetKind::Html => &self.html_dir,
            AssetKind::Css => &self.css_dir,
            AssetKind::Js => &self.js_dir,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HtmlConfig {
    /// Pages counted for markup-pattern reports. Empty means every page.
    #[serde(default)]
    pub production_pages: Vec<String>,
    /// Substrings that mark an anchor's class list as a call-to-action.
    #[serde(default = "default_cta_markers")]
    pub cta_markers: Vec<String>,
}

fn default_cta_markers() -> Vec<String> {
    vec!["hover".to_string(), "transition".to_string()]
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            production_pages: Vec::new(),
            cta_markers: default_cta_markers(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdsConfig {
    #[serde(default = "default_max_selector_len")]
    pub max_selector_len: usize,
    #[serde(default = "default_max_token_len")]
    pub max_token_len: usize,
    #[serde(default = "default_inline_style_min")]
    pub inline_style_min_occurrences: usize,
    #[serde(default = "default_duplicate_min_files")]
    pub duplicate_min_files: usize,
    #[serde(default = "default_page_specific_max")]
    pub page_specific_max_pages: usize,
    #[serde(default = "default_functions_per_file")]
    pub functions_per_file: usize,
}

fn default_max_selector_len() -> usize {
    100
}
fn default_max_token_len() -> usize {
    500
}
fn default_inline_style_min() -> usize {
    3
}
fn default_duplicate_min_files() -> usize {
    2
}
fn default_page_specific_max() -> usize {
    2
}
fn default_functions_per_file() -> usize {
    5
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            max_selector_len: default_max_selector_len(),
            max_token_len: default_max_token_len(),
            inline_style_min_occurrences: default_inline_style_min(),
            duplicate_min_files: default_duplicate_min_files(),
            page_specific_max_pages: default_page_specific_max(),
            functions_per_file: default_functions_per_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Entries shown per category before "... and N more".
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_top_n() -> usize {
    15
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
        }
    }
}

/// Report files, all overwritten on every run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_text_report")]
    pub text_report: String,
    #[serde(default = "default_findings_json")]
    pub findings_json: String,
    #[serde(default = "default_dependency_matrix")]
    pub dependency_matrix_csv: String,
    #[serde(default = "default_metrics_json")]
    pub metrics_json: String,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_text_report() -> String {
    "CONSOLIDATION_AUDIT.txt".to_string()
}
fn default_findings_json() -> String {
    "CONSOLIDATION_AUDIT.json".to_string()
}
fn default_dependency_matrix() -> String {
    "HTML_DEPENDENCY_MATRIX.csv".to_string()
}
fn default_metrics_json() -> String {
    "ASSET_METRICS.json".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            text_report: default_text_report(),
            findings_json: default_findings_json(),
            dependency_matrix_csv: default_dependency_matrix(),
            metrics_json: default_metrics_json(),
        }
    }
}

impl Config {
    /// Load configuration from a `.siteaudit.toml` file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        let config: Config = toml::from_str(&content).with_context(|| {
            format!(
                "failed to parse '{}'. Run `siteaudit init` to create a valid config file",
                path.display()
            )
        })?;
        Ok(config)
    }

    /// Load from `.siteaudit.toml` in the given directory or any ancestor, or return defaults.
    pub fn load_or_default(dir: &Path) -> Self {
        let start = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
        let mut current = start.as_path();
        loop {
            let config_path = current.join(CONFIG_FILE);
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => config,
                    Err(e) => {
                        tracing::warn!(
                            "failed to load config from '{}': {e:#}. Using defaults.",
                            config_path.display()
                        );
                        Self::default()
                    }
                };
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }
        Self::default()
    }

    /// Generate default TOML content for `siteaudit init`.
    pub fn default_toml() -> String {
        r#"# siteaudit - static site consolidation audit

[assets]
# Directories scanned (non-recursively) for each asset kind
html_dir = "."
css_dir = "css"
js_dir = "js"
# Generated or compiled files left out of every report
exclude = ["output.css"]

[html]
# Pages counted for inline-style, class, button, and stylesheet reports.
# Leave empty to count every page; list pages to leave out drafts and dashboards.
production_pages = []
# production_pages = ["index.html", "about.html", "contact.html"]
cta_markers = ["hover", "transition"]

[thresholds]
# Selectors longer than this are discarded as pathological matches
max_selector_len = 100
max_token_len = 500
# An inline style repeated this many times should become a class
inline_style_min_occurrences = 3
# Files a selector, function, or constant must appear in to be a duplicate
duplicate_min_files = 2
# Stylesheets referenced by at most this many pages are page-specific
page_specific_max_pages = 2
# Function names recorded per script
functions_per_file = 5

[report]
top_n = 15

[output]
dir = "."
text_report = "CONSOLIDATION_AUDIT.txt"
findings_json = "CONSOLIDATION_AUDIT.json"
dependency_matrix_csv = "HTML_DEPENDENCY_MATRIX.csv"
metrics_json = "ASSET_METRICS.json"
"#
        .to_string()
    }
}
