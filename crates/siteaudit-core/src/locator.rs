use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use crate::error::AuditError;
use crate::types::{AssetId, ReadError};

/// Files found in one asset directory, plus the entries that could not be
/// listed.
#[derive(Debug, Default)]
pub struct Located {
    pub files: Vec<PathBuf>,
    pub errors: Vec<ReadError>,
}

/// Enumerates candidate asset files, skipping generated artifacts.
pub struct AssetLocator {
    exclude: GlobSet,
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, AuditError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| AuditError::InvalidPattern {
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| AuditError::InvalidPattern {
        pattern: patterns.join(", "),
        source,
    })
}

impl AssetLocator {
    pub fn new(exclude_patterns: &[String]) -> Result<Self, AuditError> {
        Ok(Self {
            exclude: build_globset(exclude_patterns)?,
        })
    }

    /// Check a file against the exclusion patterns, by name and by root-relative path.
    pub fn is_excluded(&self, root: &Path, path: &Path) -> bool {
        let by_name = path
            .file_name()
            .is_some_and(|name| self.exclude.is_match(Path::new(name)));
        by_name || self.exclude.is_match(AssetId::from_path(root, path).as_str())
    }

    /// List the files directly inside `dir` whose extension is in `extensions`.
    ///
    /// A missing directory is "zero assets of this kind", not an error. A
    /// directory or entry that exists but cannot be listed is reported in
    /// `errors`. Files are returned sorted so downstream scans are
    /// reproducible.
    pub fn locate(&self, root: &Path, dir: &Path, extensions: &[&str]) -> Located {
        let mut located = Located::default();
        if !dir.is_dir() {
            tracing::info!("{}", AuditError::MissingDirectory(dir.to_path_buf()));
            return located;
        }

        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(source) => {
                    let path = source.path().unwrap_or(dir).to_path_buf();
                    let id = AssetId::from_path(root, &path);
                    let err = AuditError::UnreadableDirectory { path, source };
                    tracing::warn!("{err}");
                    located.errors.push(err.to_read_error(id.as_str()));
                    continue;
                }
            };
            // Symlinks are kept so a dangling link surfaces as a read error.
            if entry.file_type().is_dir() {
                continue;
            }
            let wanted = entry.path().extension().is_some_and(|ext| {
                let ext = ext.to_string_lossy().to_lowercase();
                extensions.iter().any(|w| ext == *w)
            });
            if wanted && !self.is_excluded(root, entry.path()) {
                located.files.push(entry.into_path());
            }
        }

        located.files.sort();
        located
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, "").unwrap();
    }

    #[test]
    fn test_locate_filters_by_extension_and_sorts() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        touch(&root.join("css/zeta.css"));
        touch(&root.join("css/alpha.css"));
        touch(&root.join("css/notes.txt"));
        touch(&root.join("css/nested/deep.css"));

        let locator = AssetLocator::new(&[]).unwrap();
        let files = locator.locate(root, &root.join("css"), &["css"]).files;
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["alpha.css", "zeta.css"]);
    }

    #[test]
    fn test_locate_missing_directory_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let locator = AssetLocator::new(&[]).unwrap();
        let located = locator.locate(tmp.path(), &tmp.path().join("js"), &["js"]);
        assert!(located.files.is_empty());
        assert!(located.errors.is_empty());
    }

    #[test]
    fn test_locate_skips_denylisted_output() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        touch(&root.join("css/output.css"));
        touch(&root.join("css/site.css"));
        touch(&root.join("css/vendor.min.css"));

        let locator =
            AssetLocator::new(&["output.css".to_string(), "css/*.min.css".to_string()]).unwrap();
        let files = locator.locate(root, &root.join("css"), &["css"]).files;
        assert_eq!(files, vec![root.join("css/site.css")]);
    }

    #[test]
    fn test_extension_match_is_case_insensitive() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        touch(&root.join("INDEX.HTML"));

        let locator = AssetLocator::new(&[]).unwrap();
        let files = locator.locate(root, root, &["html", "htm"]).files;
        assert_eq!(files.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_unlistable_directory_is_reported() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        let css = root.join("css");
        touch(&css.join("site.css"));
        std::fs::set_permissions(&css, std::fs::Permissions::from_mode(0o000)).unwrap();
        if std::fs::read_dir(&css).is_ok() {
            // Running with privileges that bypass permission bits.
            std::fs::set_permissions(&css, std::fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let located = AssetLocator::new(&[]).unwrap().locate(root, &css, &["css"]);
        std::fs::set_permissions(&css, std::fs::Permissions::from_mode(0o755)).unwrap();

        assert!(located.files.is_empty());
        assert_eq!(located.errors.len(), 1);
        assert_eq!(located.errors[0].path, "css");
        assert!(located.errors[0].message.contains("failed to list directory"));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let err = AssetLocator::new(&["css/[".to_string()]).err().unwrap();
        assert!(err.to_string().contains("css/["));
    }
}
