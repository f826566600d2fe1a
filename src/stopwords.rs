use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::error::{ExtractError, Result};

static BUILTIN_STOPWORDS: &str = include_str!("../resources/stopwords.json");

/// Stopword table keyed by primary language subtag.
///
/// Loaded once through [`StopWords::load_default`] or [`StopWords::load`] and
/// read-only afterwards.
#[derive(Clone, Debug, Default)]
pub struct StopWords {
    lists: BTreeMap<String, Vec<String>>,
}

impl StopWords {
    pub fn load_default() -> Result<Self> {
        Self::from_json(BUILTIN_STOPWORDS)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ExtractError::io(path, e))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(text)
            .map_err(|e| ExtractError::StopWords(format!("parse stopword json: {e}")))?;
        let lists = raw
            .into_iter()
            .map(|(lang, words)| {
                let words = words
                    .into_iter()
                    .map(|w| w.trim().to_lowercase())
                    .filter(|w| !w.is_empty())
                    .collect();
                (lang.to_ascii_lowercase(), words)
            })
            .collect();
        Ok(Self { lists })
    }

    /// Stopwords for a BCP-47 tag; the tag is cut at the first '-'.
    #[must_use]
    pub fn for_language(&self, tag: &str) -> HashSet<String> {
        let lang = tag.split('-').next().unwrap_or(tag).to_ascii_lowercase();
        self.lists
            .get(&lang)
            .map(|words| words.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.lists.keys().map(String::as_str)
    }
}
