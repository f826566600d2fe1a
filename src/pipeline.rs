use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use log::debug;

use crate::align::{align, AlignOptions};
use crate::csv::{write_pairs, write_terms};
use crate::error::Result;
use crate::extractor::{ExtractOptions, Extraction, TermExtractor};
use crate::locale::Locale;
use crate::stopwords::StopWords;
use crate::term::Term;
use crate::xliff::{Segment, XliffDocument};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BilingualSummary {
    pub src_lang: String,
    pub trg_lang: String,
    pub segments: usize,
    pub source_terms: usize,
    pub target_terms: usize,
    pub pairs: usize,
}

/// `<input without extension>.csv`
#[must_use]
pub fn default_monolingual_output(input: &Path) -> PathBuf {
    input.with_extension("csv")
}

/// `<input without extension>_bilingual.csv`
#[must_use]
pub fn default_bilingual_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string();
    input.with_file_name(format!("{stem}_bilingual.csv"))
}

fn extractor_for(lang: &str, stopwords: &StopWords, options: &ExtractOptions) -> TermExtractor {
    TermExtractor::new(
        Locale::from_tag(lang),
        stopwords.for_language(lang),
        options.clone(),
    )
}

fn sort_by_score(terms: &mut [Term]) {
    terms.sort_by(|a, b| {
        a.score
            .partial_cmp(&b.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.text.cmp(&b.text))
    });
}

/// Extracts source-language terms from every segment with source text and writes them as CSV.
pub fn run_monolingual(
    input: &Path,
    output: &Path,
    stopwords: &StopWords,
    options: &ExtractOptions,
) -> Result<Vec<Term>> {
    let doc = XliffDocument::read(input)?;
    let segments = doc.source_segments();
    debug!("{} segments with source text", segments.len());

    let extractor = extractor_for(&doc.src_lang, stopwords, options);
    let Extraction { mut terms, .. } =
        extractor.extract(segments.iter().map(|s| (s.number, s.source.as_str())));
    sort_by_score(&mut terms);

    write_terms(output, &terms)?;
    debug!("wrote {} terms to {}", terms.len(), output.display());
    Ok(terms)
}

/// Extracts both sides of the final segments, aligns them and writes the pairs as CSV.
pub fn run_bilingual(
    input: &Path,
    output: &Path,
    stopwords: &StopWords,
    extract: &ExtractOptions,
    alignment: &AlignOptions,
) -> Result<BilingualSummary> {
    let doc = XliffDocument::read(input)?;
    let segments = doc.final_pairs();
    let mut summary = BilingualSummary {
        src_lang: doc.src_lang.clone(),
        trg_lang: doc.trg_lang.clone(),
        segments: segments.len(),
        ..BilingualSummary::default()
    };
    if segments.is_empty() {
        write_pairs(output, &[])?;
        return Ok(summary);
    }

    let (source, target) = extract_sides(&doc, &segments, stopwords, extract);
    summary.source_terms = source.terms.len();
    summary.target_terms = target.terms.len();
    debug!(
        "{} source terms, {} target terms",
        summary.source_terms, summary.target_terms
    );

    let pairs = align(&source, &target, alignment);
    summary.pairs = pairs.len();
    write_pairs(output, &pairs)?;
    debug!("wrote {} term pairs to {}", pairs.len(), output.display());
    Ok(summary)
}

fn extract_sides(
    doc: &XliffDocument,
    segments: &[Segment],
    stopwords: &StopWords,
    options: &ExtractOptions,
) -> (Extraction, Extraction) {
    let source = extractor_for(&doc.src_lang, stopwords, options)
        .extract(segments.iter().map(|s| (s.number, s.source.as_str())));
    let target = extractor_for(&doc.trg_lang, stopwords, options)
        .extract(segments.iter().map(|s| (s.number, s.target.as_str())));
    (source, target)
}
