use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use log::{error, info, warn};

use xliff_terms::cli::{self, CommonArgs};
use xliff_terms::config::Overrides;
use xliff_terms::logging;
use xliff_terms::messages::{self, Msg};
use xliff_terms::pipeline::{default_bilingual_output, run_bilingual};

#[derive(Parser, Debug)]
#[command(name = "bilingual-extractor", version)]
#[command(about = "Bilingual term pairs from the final segments of an XLIFF 2.x document", long_about = None)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Minimum number of shared segments per pair (default 1)
    #[arg(long = "minCoOccurrence", value_name = "N", allow_negative_numbers = true)]
    min_co_occurrence: Option<i64>,

    /// Maximum pairs per source and per target term, 0 = unlimited (default 0)
    #[arg(long = "maxPairs", value_name = "N", allow_negative_numbers = true)]
    max_pairs: Option<i64>,

    /// Minimum shared/frequency ratio on both sides, 0..=1 (default 0.70)
    #[arg(long = "minCoOccurrenceRatio", value_name = "RATIO", allow_negative_numbers = true)]
    min_co_occurrence_ratio: Option<f64>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            min_co_occurrence: self.min_co_occurrence,
            max_pairs: self.max_pairs,
            min_co_occurrence_ratio: self.min_co_occurrence_ratio,
            ..self.common.overrides()
        }
    }
}

fn main() -> ExitCode {
    let args = match cli::parse_args::<Args>(Msg::UsageBilingual) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = logging::init(args.common.debug) {
        eprintln!("logger: {e}");
    }
    let lang = args.common.lang();

    if args.common.xliff.is_none() {
        cli::print_usage(lang, Msg::UsageBilingual);
        error!("{}", messages::text(lang, Msg::MissingXliff));
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", cli::describe_error(lang, &e));
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let lang = args.common.lang();
    let input = args.common.input(lang)?;
    let output = args
        .common
        .output
        .clone()
        .unwrap_or_else(|| default_bilingual_output(&input));

    let (cfg, stopwords) = args.common.load_settings()?;
    let overrides = args.overrides();
    let extract = cfg
        .extract_options(&overrides)
        .context("extraction options")?;
    let alignment = cfg.align_options(&overrides).context("alignment options")?;

    let summary = run_bilingual(&input, &output, &stopwords, &extract, &alignment)
        .with_context(|| format!("align terms: {}", input.display()))?;
    info!(
        "{}",
        messages::format(lang, Msg::Languages, &[&summary.src_lang, &summary.trg_lang])
    );
    if summary.segments == 0 {
        warn!("{}", messages::text(lang, Msg::NoFinalSegments));
    }
    info!(
        "{}",
        messages::format(
            lang,
            Msg::PairsWritten,
            &[&summary.pairs.to_string(), &output.display().to_string()],
        )
    );
    Ok(())
}
