use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use log::{error, info};

use xliff_terms::cli::{self, CommonArgs};
use xliff_terms::logging;
use xliff_terms::messages::{self, Msg};
use xliff_terms::pipeline::{default_monolingual_output, run_monolingual};

#[derive(Parser, Debug)]
#[command(name = "term-extractor", version)]
#[command(about = "YAKE term extraction from the source side of an XLIFF 2.x document", long_about = None)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> ExitCode {
    let args = match cli::parse_args::<Args>(Msg::UsageTerms) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = logging::init(args.common.debug) {
        eprintln!("logger: {e}");
    }
    let lang = args.common.lang();

    if args.common.xliff.is_none() {
        cli::print_usage(lang, Msg::UsageTerms);
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
        .unwrap_or_else(|| default_monolingual_output(&input));

    let (cfg, stopwords) = args.common.load_settings()?;
    let options = cfg
        .extract_options(&args.common.overrides())
        .context("extraction options")?;

    let terms = run_monolingual(&input, &output, &stopwords, &options)
        .with_context(|| format!("extract terms: {}", input.display()))?;
    info!(
        "{}",
        messages::format(
            lang,
            Msg::TermsWritten,
            &[&terms.len().to_string(), &output.display().to_string()],
        )
    );
    Ok(())
}
