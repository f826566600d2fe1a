use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::align::AlignOptions;
use crate::error::{ExtractError, Invalid, Result};
use crate::extractor::ExtractOptions;

pub const DEFAULT_CONFIG_FILE: &str = "term-extractor.toml";

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub extraction: ExtractionSection,
    #[serde(default)]
    pub alignment: AlignmentSection,
    #[serde(default)]
    pub stopwords: StopWordsSection,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct ExtractionSection {
    #[serde(default)]
    pub min_frequency: Option<usize>,
    #[serde(default)]
    pub max_score: Option<f64>,
    #[serde(default)]
    pub max_term_length: Option<usize>,
    #[serde(default)]
    pub relevant_only: Option<bool>,
    /// Similarity a spelling variant must exceed to be merged (default 0.80).
    #[serde(default)]
    pub fuzzy_min_similarity: Option<f64>,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AlignmentSection {
    #[serde(default)]
    pub min_co_occurrence: Option<usize>,
    #[serde(default)]
    pub max_pairs: Option<usize>,
    #[serde(default)]
    pub min_co_occurrence_ratio: Option<f64>,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct StopWordsSection {
    /// JSON file mapping language codes to word lists. Relative paths resolve
    /// against the config file directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Command-line values; `None` falls through to the config file, then the default.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub min_frequency: Option<i64>,
    pub max_score: Option<f64>,
    pub max_term_length: Option<i64>,
    pub relevant_only: bool,
    pub min_co_occurrence: Option<i64>,
    pub max_pairs: Option<i64>,
    pub min_co_occurrence_ratio: Option<f64>,
}

pub fn find_file_upwards(start_dir: &Path, filename: &str, max_levels: usize) -> Option<PathBuf> {
    let mut dir = start_dir;
    for _ in 0..=max_levels {
        let candidate = dir.join(filename);
        if candidate.exists() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
    None
}

pub fn find_default_config(filename: &str) -> Option<PathBuf> {
    if let Ok(cwd) = std::env::current_dir() {
        if let Some(p) = find_file_upwards(&cwd, filename, 8) {
            return Some(p);
        }
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            if let Some(p) = find_file_upwards(dir, filename, 4) {
                return Some(p);
            }
        }
    }
    None
}

pub fn load_config(path: &Path) -> Result<AppConfig> {
    let text = std::fs::read_to_string(path).map_err(|e| ExtractError::io(path, e))?;
    let mut cfg: AppConfig = toml::from_str(&text)
        .map_err(|e| ExtractError::Config(format!("parse {}: {e}", path.display())))?;
    if let Some(sw) = cfg.stopwords.path.as_mut() {
        if sw.is_relative() {
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            *sw = dir.join(&*sw);
        }
    }
    Ok(cfg)
}

impl AppConfig {
    /// Explicit path if given, otherwise the first `term-extractor.toml` found, otherwise defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        if let Some(p) = explicit {
            return Ok((load_config(p)?, Some(p.to_path_buf())));
        }
        match find_default_config(DEFAULT_CONFIG_FILE) {
            Some(p) => Ok((load_config(&p)?, Some(p))),
            None => Ok((Self::default(), None)),
        }
    }

    pub fn extract_options(&self, ov: &Overrides) -> Result<ExtractOptions> {
        let base = ExtractOptions::default();
        let ex = &self.extraction;
        let opts = ExtractOptions {
            min_frequency: pick_count(
                ov.min_frequency,
                ex.min_frequency,
                base.min_frequency,
                Invalid::MinFrequency,
            )?,
            max_score: ov.max_score.or(ex.max_score).unwrap_or(base.max_score),
            max_term_length: pick_count(
                ov.max_term_length,
                ex.max_term_length,
                base.max_term_length,
                Invalid::MaxTermLength,
            )?,
            relevant_only: ov.relevant_only || ex.relevant_only.unwrap_or(base.relevant_only),
            fuzzy_min_similarity: ex.fuzzy_min_similarity.unwrap_or(base.fuzzy_min_similarity),
        };
        opts.validate()?;
        Ok(opts)
    }

    pub fn align_options(&self, ov: &Overrides) -> Result<AlignOptions> {
        let base = AlignOptions::default();
        let al = &self.alignment;
        let opts = AlignOptions {
            min_co_occurrence: pick_count(
                ov.min_co_occurrence,
                al.min_co_occurrence,
                base.min_co_occurrence,
                Invalid::MinCoOccurrence,
            )?,
            max_pairs: pick_count(
                ov.max_pairs,
                al.max_pairs,
                base.max_pairs,
                Invalid::MaxPairs,
            )?,
            min_co_occurrence_ratio: ov
                .min_co_occurrence_ratio
                .or(al.min_co_occurrence_ratio)
                .unwrap_or(base.min_co_occurrence_ratio),
        };
        opts.validate()?;
        Ok(opts)
    }
}

// Negative command-line counts are rejected here rather than wrapped into usize.
fn pick_count(
    cli: Option<i64>,
    file: Option<usize>,
    default: usize,
    what: Invalid,
) -> Result<usize> {
    match cli {
        Some(v) => usize::try_from(v).map_err(|_| ExtractError::InvalidArgument(what)),
        None => Ok(file.unwrap_or(default)),
    }
}

#[cfg(test)]
mod tests {
    use super::{load_config, AppConfig, Overrides};
    use crate::error::{ExtractError, Invalid};

    #[test]
    fn cli_overrides_file_overrides_default() {
        let cfg: AppConfig = toml::from_str(
            r#"
[extraction]
min_frequency = 2
max_term_length = 4

[alignment]
min_co_occurrence_ratio = 0.5
"#,
        )
        .expect("toml");
        let ov = Overrides {
            max_term_length: Some(5),
            ..Overrides::default()
        };
        let ex = cfg.extract_options(&ov).expect("extract options");
        assert_eq!(ex.min_frequency, 2);
        assert_eq!(ex.max_term_length, 5);
        assert_eq!(ex.max_score, 10.0);
        let al = cfg.align_options(&ov).expect("align options");
        assert_eq!(al.min_co_occurrence_ratio, 0.5);
        assert_eq!(al.max_pairs, 0);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let cfg = AppConfig::default();
        let neg = Overrides {
            max_pairs: Some(-1),
            ..Overrides::default()
        };
        assert!(matches!(
            cfg.align_options(&neg),
            Err(ExtractError::InvalidArgument(Invalid::MaxPairs))
        ));
        let ratio = Overrides {
            min_co_occurrence_ratio: Some(1.5),
            ..Overrides::default()
        };
        assert!(matches!(
            cfg.align_options(&ratio),
            Err(ExtractError::InvalidArgument(Invalid::CoOccurrenceRatio))
        ));
        let score = Overrides {
            max_score: Some(-2.0),
            ..Overrides::default()
        };
        assert!(cfg.extract_options(&score).is_err());
        let freq = Overrides {
            min_frequency: Some(0),
            ..Overrides::default()
        };
        assert!(cfg.extract_options(&freq).is_err());
    }

    #[test]
    fn stopword_path_is_relative_to_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("term-extractor.toml");
        std::fs::write(&path, "[stopwords]\npath = \"sw.json\"\n").expect("write");
        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.stopwords.path, Some(dir.path().join("sw.json")));
    }
}
