use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context};
use clap::error::ErrorKind;
use clap::{Args, Parser};

use crate::config::{AppConfig, Overrides};
use crate::error::ExtractError;
use crate::messages::{self, Lang, Msg};
use crate::stopwords::StopWords;

/// Options shared by the monolingual and bilingual extractors.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// XLIFF 2.x document to analyse
    #[arg(long = "xliff", value_name = "FILE")]
    pub xliff: Option<PathBuf>,

    /// Output CSV (default: derived from the XLIFF path)
    #[arg(long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Minimum term frequency (>= 1, default 3)
    #[arg(long = "minFreq", value_name = "N", allow_negative_numbers = true)]
    pub min_freq: Option<i64>,

    /// Maximum YAKE score (> 0, default 10.0)
    #[arg(long = "maxScore", value_name = "SCORE", allow_negative_numbers = true)]
    pub max_score: Option<f64>,

    /// Maximum words per term (>= 1, default 3)
    #[arg(long = "maxLength", value_name = "N", allow_negative_numbers = true)]
    pub max_length: Option<i64>,

    /// Keep only terms with relevance >= 1.0
    #[arg(long = "relevant")]
    pub relevant: bool,

    /// Verbose diagnostics
    #[arg(long = "debug")]
    pub debug: bool,

    /// Message language (en or es)
    #[arg(long = "lang", value_name = "LANG")]
    pub lang: Option<String>,

    /// Config file (default: search for term-extractor.toml upwards)
    #[arg(long = "config", value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Stopword JSON file (default: built-in table)
    #[arg(long = "stopwords", value_name = "JSON")]
    pub stopwords: Option<PathBuf>,
}

impl CommonArgs {
    #[must_use]
    pub fn lang(&self) -> Lang {
        self.lang.as_deref().map(Lang::from_code).unwrap_or_default()
    }

    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            min_frequency: self.min_freq,
            max_score: self.max_score,
            max_term_length: self.max_length,
            relevant_only: self.relevant,
            ..Overrides::default()
        }
    }

    /// The XLIFF path, checked for presence and existence.
    pub fn input(&self, lang: Lang) -> anyhow::Result<PathBuf> {
        let path = self
            .xliff
            .clone()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| anyhow!(messages::text(lang, Msg::MissingXliff)))?;
        if !path.is_file() {
            let shown = path.display().to_string();
            return Err(anyhow!(messages::format(lang, Msg::FileNotFound, &[&shown])));
        }
        Ok(path)
    }

    pub fn load_settings(&self) -> anyhow::Result<(AppConfig, StopWords)> {
        let (cfg, cfg_path) = AppConfig::resolve(self.config.as_deref()).context("load config")?;
        if let Some(p) = cfg_path.as_ref() {
            log::debug!("using config {}", p.display());
        }
        let stopwords = match self.stopwords.as_ref().or(cfg.stopwords.path.as_ref()) {
            Some(p) => StopWords::load(p)
                .with_context(|| format!("load stopwords: {}", p.display()))?,
            None => StopWords::load_default().context("load built-in stopwords")?,
        };
        log::debug!(
            "stopword languages: {}",
            stopwords.languages().collect::<Vec<_>>().join(", ")
        );
        Ok((cfg, stopwords))
    }
}

/// Rewrites single-dash long options (`-xliff`, `-minFreq`) into the
/// double-dash form clap expects. Negative numbers and short flags pass through.
#[must_use]
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .enumerate()
        .map(|(i, arg)| {
            if i == 0 {
                return arg;
            }
            match arg.to_str() {
                Some(s)
                    if s.len() > 2
                        && s.starts_with('-')
                        && !s.starts_with("--")
                        && s[1..].starts_with(|c: char| c.is_ascii_alphabetic()) =>
                {
                    OsString::from(format!("-{s}"))
                }
                _ => arg,
            }
        })
        .collect()
}

/// Parses the process arguments. Help prints the localized usage and exits 0,
/// version exits 0, usage errors exit 1.
pub fn parse_args<P: Parser>(usage: Msg) -> Result<P, ExitCode> {
    let args = normalize_args(std::env::args_os());
    match P::try_parse_from(args.iter().cloned()) {
        Ok(parsed) => Ok(parsed),
        Err(e) if e.kind() == ErrorKind::DisplayHelp => {
            print_usage(lang_from_args(&args), usage);
            Err(ExitCode::SUCCESS)
        }
        Err(e) => {
            let code = u8::from(e.use_stderr());
            let _ = e.print();
            Err(ExitCode::from(code))
        }
    }
}

pub fn print_usage(lang: Lang, usage: Msg) {
    println!("{}", messages::text(lang, usage));
}

/// `--lang` value from already normalized arguments, before clap has run.
#[must_use]
pub fn lang_from_args(args: &[OsString]) -> Lang {
    let mut it = args.iter().filter_map(|a| a.to_str());
    while let Some(arg) = it.next() {
        if let Some(code) = arg.strip_prefix("--lang=") {
            return Lang::from_code(code);
        }
        if arg == "--lang" {
            return it.next().map(Lang::from_code).unwrap_or_default();
        }
    }
    Lang::default()
}

/// User-facing text for a failed run: range-check failures get their own
/// localized message, everything else the generic failure line.
#[must_use]
pub fn describe_error(lang: Lang, err: &anyhow::Error) -> String {
    match err.downcast_ref::<ExtractError>() {
        Some(ExtractError::InvalidArgument(kind)) => {
            messages::text(lang, Msg::Invalid(*kind)).to_string()
        }
        _ => messages::format(lang, Msg::Failed, &[&format!("{err:#}")]),
    }
}
