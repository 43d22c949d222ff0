use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{AssetId, Token, TokenKind};

/// Mapping from token to the assets that produced it, in scan order.
///
/// Repeats within one asset are kept, so `occurrences` counts raw matches
/// while `distinct_assets` counts files. Every stored token has at least one
/// occurrence.
#[derive(Debug, Clone, Default)]
pub struct OccurrenceIndex {
    entries: BTreeMap<Token, Vec<AssetId>>,
}

/// A token and its contributing assets.
#[derive(Debug, Clone, Copy)]
pub struct Occurrence<'a> {
    pub token: &'a Token,
    pub assets: &'a [AssetId],
}

impl<'a> Occurrence<'a> {
    pub fn count(&self) -> usize {
        self.assets.len()
    }

    /// Contributing assets without repeats, in first-seen order.
    pub fn distinct_assets(&self) -> Vec<&'a AssetId> {
        let mut seen: Vec<&AssetId> = Vec::new();
        for asset in self.assets {
            if !seen.contains(&asset) {
                seen.push(asset);
            }
        }
        seen
    }

    pub fn spread(&self) -> TokenSpread {
        TokenSpread {
            value: self.token.value.clone(),
            occurrences: self.count(),
            files: self
                .distinct_assets()
                .into_iter()
                .map(|a| a.0.clone())
                .collect(),
        }
    }
}

/// Report row: a token value with its occurrence count and file list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSpread {
    pub value: String,
    pub occurrences: usize,
    pub files: Vec<String>,
}

/// Report row: a token value with a corpus-wide count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCount {
    pub value: String,
    pub count: usize,
}

/// Most files first, then most occurrences, then by value.
pub fn rank_spreads(spreads: &mut [TokenSpread]) {
    spreads.sort_by(|a, b| {
        b.files
            .len()
            .cmp(&a.files.len())
            .then(b.occurrences.cmp(&a.occurrences))
            .then_with(|| a.value.cmp(&b.value))
    });
}

impl OccurrenceIndex {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Record one occurrence of `value` in `asset`.
    pub fn record(&mut self, kind: TokenKind, value: &str, asset: &AssetId) {
        self.entries
            .entry(Token::new(kind, value))
            .or_default()
            .push(asset.clone());
    }

    pub fn record_all<I, S>(&mut self, kind: TokenKind, values: I, asset: &AssetId)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for value in values {
            self.record(kind, value.as_ref(), asset);
        }
    }

    pub fn get(&self, kind: TokenKind, value: &str) -> Option<Occurrence<'_>> {
        self.entries
            .get_key_value(&Token::new(kind, value))
            .map(|(token, assets)| Occurrence {
                token,
                assets: assets.as_slice(),
            })
    }

    /// All tokens of one category, ordered by value.
    pub fn category(&self, kind: TokenKind) -> impl Iterator<Item = Occurrence<'_>> {
        self.entries
            .range(Token::new(kind, String::new())..)
            .take_while(move |(token, _)| token.kind == kind)
            .map(|(token, assets)| Occurrence {
                token,
                assets: assets.as_slice(),
            })
    }

    /// Number of distinct tokens in a category.
    pub fn token_count(&self, kind: TokenKind) -> usize {
        self.category(kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tokens that appear in at least `min_files` distinct assets, ranked.
    pub fn spread_across(&self, kind: TokenKind, min_files: usize) -> Vec<TokenSpread> {
        let mut spreads: Vec<_> = self
            .category(kind)
            .filter(|occ| occ.distinct_assets().len() >= min_files)
            .map(|occ| occ.spread())
            .collect();
        rank_spreads(&mut spreads);
        spreads
    }

    /// Tokens matched at least `min_occurrences` times in total, ranked.
    pub fn frequent(&self, kind: TokenKind, min_occurrences: usize) -> Vec<TokenSpread> {
        let mut spreads: Vec<_> = self
            .category(kind)
            .filter(|occ| occ.count() >= min_occurrences)
            .map(|occ| occ.spread())
            .collect();
        rank_spreads(&mut spreads);
        spreads
    }

    /// Frequency table for a category, highest count first.
    pub fn counts(&self, kind: TokenKind) -> Vec<TokenCount> {
        let mut counts: Vec<_> = self
            .category(kind)
            .map(|occ| TokenCount {
                value: occ.token.value.clone(),
                count: occ.count(),
            })
            .collect();
        counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
        counts
    }
}
