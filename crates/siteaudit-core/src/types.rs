use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Kind of site asset. Membership is decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Html,
    Css,
    Js,
}

impl AssetKind {
    /// File extensions (without the dot) that belong to this kind.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            AssetKind::Html => &["html", "htm"],
            AssetKind::Css => &["css"],
            AssetKind::Js => &["js", "mjs"],
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Html => write!(f, "html"),
            AssetKind::Css => write!(f, "css"),
            AssetKind::Js => write!(f, "js"),
        }
    }
}

/// Identifier of an asset: its path relative to the project root, `/`-separated.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive an identifier for `path` relative to `root`.
    pub fn from_path(root: &Path, path: &Path) -> Self {
        let rel = path.strip_prefix(root).unwrap_or(path);
        Self(rel.to_string_lossy().replace('\\', "/"))
    }

    /// Final path component.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A file read for one run. Never cached across runs.
#[derive(Debug, Clone)]
pub struct Asset {
    pub id: AssetId,
    pub path: PathBuf,
    pub kind: AssetKind,
    pub content: String,
}

impl Asset {
    pub fn new(id: AssetId, path: PathBuf, kind: AssetKind, content: String) -> Self {
        Self {
            id,
            path,
            kind,
            content,
        }
    }

    pub fn byte_size(&self) -> usize {
        self.content.len()
    }

    pub fn line_count(&self) -> usize {
        self.content.lines().count()
    }
}

/// Category of an extracted token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenKind {
    Selector,
    Property,
    Keyframes,
    InlineStyle,
    ClassAttr,
    ButtonClass,
    CtaClass,
    StylesheetRef,
    ScriptRef,
    FunctionName,
    EventListener,
    GlobalConstant,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Selector => "selector",
            TokenKind::Property => "property",
            TokenKind::Keyframes => "keyframes",
            TokenKind::InlineStyle => "inline-style",
            TokenKind::ClassAttr => "class",
            TokenKind::ButtonClass => "button-class",
            TokenKind::CtaClass => "cta-class",
            TokenKind::StylesheetRef => "stylesheet-ref",
            TokenKind::ScriptRef => "script-ref",
            TokenKind::FunctionName => "function-name",
            TokenKind::EventListener => "event-listener",
            TokenKind::GlobalConstant => "global-constant",
        };
        write!(f, "{name}")
    }
}

/// A normalized extracted value of one category.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// A file that could not be read; it is excluded from aggregation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReadError {
    pub path: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_id_from_path() {
        let id = AssetId::from_path(Path::new("/site"), Path::new("/site/css/main.css"));
        assert_eq!(id.as_str(), "css/main.css");
        assert_eq!(id.file_name(), "main.css");
    }

    #[test]
    fn test_asset_id_outside_root_keeps_path() {
        let id = AssetId::from_path(Path::new("/site"), Path::new("other/page.html"));
        assert_eq!(id.as_str(), "other/page.html");
    }

    #[test]
    fn test_token_ordering_groups_by_kind() {
        let a = Token::new(TokenKind::Selector, "zzz");
        let b = Token::new(TokenKind::Property, "aaa");
        assert!(a < b, "kind orders before value");
    }

    #[test]
    fn test_line_count_of_empty_asset() {
        let asset = Asset::new(
            AssetId::new("empty.js"),
            PathBuf::from("empty.js"),
            AssetKind::Js,
            String::new(),
        );
        assert_eq!(asset.byte_size(), 0);
        assert_eq!(asset.line_count(), 0);
    }
}
