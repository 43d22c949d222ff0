use std::path::{Path, PathBuf};

use anyhow::Result;
use rayon::prelude::*;

use crate::aggregate::{Aggregator, AuditRun, ProductionPages};
use crate::config::Config;
use crate::error::AuditError;
use crate::extractor::{AssetExtractor, Extraction};
use crate::findings::{build_findings, AuditFindings};
use crate::locator::AssetLocator;
use crate::types::{Asset, AssetId, AssetKind, ReadError};

/// Read one file as an asset of `kind`.
pub fn read_asset(root: &Path, path: &Path, kind: AssetKind) -> Result<Asset, AuditError> {
    let unreadable = |source| AuditError::UnreadableFile {
        path: path.to_path_buf(),
        source,
    };
    let bytes = std::fs::read(path).map_err(unreadable)?;
    let content = String::from_utf8(bytes).map_err(|e| {
        unreadable(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })?;
    Ok(Asset::new(
        AssetId::from_path(root, path),
        path.to_path_buf(),
        kind,
        content,
    ))
}

/// Read and extract every path, in parallel; output order follows `paths`.
pub fn extract_all(
    root: &Path,
    paths: &[PathBuf],
    extractor: &dyn AssetExtractor,
) -> Vec<Result<(Asset, Extraction), ReadError>> {
    paths
        .par_iter()
        .map(|path| match read_asset(root, path, extractor.kind()) {
            Ok(asset) => {
                let extraction = extractor.extract(&asset);
                Ok((asset, extraction))
            }
            Err(e) => {
                let id = AssetId::from_path(root, path);
                tracing::warn!("{e}");
                Err(e.to_read_error(id.as_str()))
            }
        })
        .collect()
}

/// Single linear pass: locate, extract, aggregate.
pub struct AuditPipeline {
    extractors: Vec<Box<dyn AssetExtractor>>,
    config: Config,
    locator: AssetLocator,
}

impl AuditPipeline {
    pub fn new(extractors: Vec<Box<dyn AssetExtractor>>, config: Config) -> Result<Self> {
        let locator = AssetLocator::new(&config.assets.exclude)?;
        Ok(Self {
            extractors,
            config,
            locator,
        })
    }

    /// Run the audit over the site at `root`.
    ///
    /// Missing asset directories and unreadable files never fail the run.
    pub fn run(&self, root: &Path) -> AuditRun {
        let production = ProductionPages::new(&self.config.html.production_pages);
        let mut aggregator = Aggregator::new(production.clone());

        for extractor in &self.extractors {
            let kind = extractor.kind();
            let dir = root.join(self.config.assets.dir_for(kind));
            let located = self.locator.locate(root, &dir, extractor.file_extensions());
            for note in located.errors {
                aggregator.record_error(note);
            }
            let paths = located.files;
            tracing::debug!("found {} {kind} file(s) in {}", paths.len(), dir.display());

            if kind == AssetKind::Html {
                let located: Vec<AssetId> =
                    paths.iter().map(|p| AssetId::from_path(root, p)).collect();
                for page in production.missing(&located) {
                    tracing::warn!("production page '{page}' was not found");
                    aggregator.record_error(ReadError {
                        path: page,
                        message: "listed in html.production_pages but not found".to_string(),
                    });
                }
            }

            for outcome in extract_all(root, &paths, extractor.as_ref()) {
                match outcome {
                    Ok((asset, extraction)) => aggregator.fold(&asset, &extraction),
                    Err(note) => aggregator.record_error(note),
                }
            }
        }

        aggregator.finish()
    }

    /// Run the audit and derive its findings.
    pub fn audit(&self, root: &Path) -> (AuditRun, AuditFindings) {
        let run = self.run(root);
        let findings = build_findings(&run, &self.config);
        (run, findings)
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &Config {
        &self.config
    }
}
