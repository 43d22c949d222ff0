use std::path::PathBuf;

use thiserror::Error;

use crate::types::{ReadError, TokenKind};

/// Conditions raised while auditing a site.
///
/// Only `SinkWrite` and `InvalidPattern` are fatal; the rest are logged or
/// recorded in the report.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("asset directory '{}' does not exist", .0.display())]
    MissingDirectory(PathBuf),

    #[error("failed to list '{}': {source}", .path.display())]
    UnreadableDirectory {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to read '{}': {source}", .path.display())]
    UnreadableFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{kind} match of {len} bytes exceeds the {cap}-byte cap")]
    PatternOverflow {
        kind: TokenKind,
        len: usize,
        cap: usize,
    },

    #[error("failed to write report '{}': {source}", .path.display())]
    SinkWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid exclude pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

impl AuditError {
    /// Convert a per-file read failure into the note carried by the report.
    pub fn to_read_error(&self, asset: &str) -> ReadError {
        let message = match self {
            AuditError::UnreadableFile { source, .. } => source.to_string(),
            AuditError::UnreadableDirectory { source, .. } => source
                .io_error()
                .map_or_else(|| source.to_string(), |e| format!("failed to list directory: {e}")),
            other => other.to_string(),
        };
        ReadError {
            path: asset.to_string(),
            message,
        }
    }
}
