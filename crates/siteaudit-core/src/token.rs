use crate::error::AuditError;
use crate::types::TokenKind;

/// Normalize a raw pattern match into a token value.
///
/// Normalization is trimming only. Blank matches yield `None`, as do matches
/// longer than `cap` bytes, which are reported at debug level and dropped.
pub fn normalize(kind: TokenKind, raw: &str, cap: usize) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    if value.len() > cap {
        tracing::debug!(
            "{}",
            AuditError::PatternOverflow {
                kind,
                len: value.len(),
                cap,
            }
        );
        return None;
    }
    Some(value.to_string())
}

/// Collapse runs of whitespace and cut to at most `max_chars` characters.
pub fn preview(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(max_chars).collect()
}
