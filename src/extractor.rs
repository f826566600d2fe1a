use std::collections::{HashMap, HashSet};

use log::debug;

use crate::dedup::{case_fold_merge, fuzzy_merge};
use crate::error::{ExtractError, Invalid, Result};
use crate::locale::Locale;
use crate::term::{CorpusStats, Term};
use crate::text::{split_chunks, split_sentences, split_words};
use crate::token::{Token, TokenTag};

/// Left/right context window used for relatedness.
pub const CONTEXT_WINDOW: usize = 2;

#[derive(Clone, Debug, PartialEq)]
pub struct ExtractOptions {
    pub max_term_length: usize,
    pub min_frequency: usize,
    pub max_score: f64,
    /// Keep only candidates whose relevance reaches 1.0.
    pub relevant_only: bool,
    /// Similarity (1 - distance / longest length) a fuzzy merge must exceed.
    pub fuzzy_min_similarity: f64,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_term_length: 3,
            min_frequency: 3,
            max_score: 10.0,
            relevant_only: false,
            fuzzy_min_similarity: 0.80,
        }
    }
}

impl ExtractOptions {
    pub fn validate(&self) -> Result<()> {
        if self.min_frequency < 1 {
            return Err(ExtractError::InvalidArgument(Invalid::MinFrequency));
        }
        if !(self.max_score > 0.0) {
            return Err(ExtractError::InvalidArgument(Invalid::MaxScore));
        }
        if self.max_term_length < 1 {
            return Err(ExtractError::InvalidArgument(Invalid::MaxTermLength));
        }
        if !(0.0..=1.0).contains(&self.fuzzy_min_similarity) {
            return Err(ExtractError::InvalidArgument(Invalid::FuzzySimilarity));
        }
        Ok(())
    }
}

/// Result of one monolingual pass.
#[derive(Clone, Debug, Default)]
pub struct Extraction {
    pub terms: Vec<Term>,
    /// Segment number of every sentence, indexed by sentence offset.
    pub sentence_to_segment: Vec<usize>,
}

type Chunk = Vec<Token>;

struct Sentence {
    chunks: Vec<Chunk>,
}

struct Candidate {
    term: Term,
    /// Lowercased constituent keys with their stopword flags.
    parts: Vec<(String, bool)>,
}

/// Arena of terms addressed by insertion index, looked up by lowercased key.
#[derive(Default)]
struct Vocabulary {
    terms: Vec<Term>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    fn intern(&mut self, text: &str, key: &str) -> usize {
        if let Some(&i) = self.index.get(key) {
            return i;
        }
        let i = self.terms.len();
        self.terms.push(Term::new(text, key));
        self.index.insert(key.to_string(), i);
        i
    }

    fn score_of(&self, key: &str) -> f64 {
        self.index.get(key).map_or(0.0, |&i| self.terms[i].score)
    }
}

pub struct TermExtractor {
    locale: Locale,
    stopwords: HashSet<String>,
    options: ExtractOptions,
}

impl TermExtractor {
    pub fn new(locale: Locale, stopwords: HashSet<String>, options: ExtractOptions) -> Self {
        Self {
            locale,
            stopwords,
            options,
        }
    }

    /// Runs the full monolingual pass over `(segment_number, text)` pairs.
    pub fn extract<'a, I>(&self, segments: I) -> Extraction
    where
        I: IntoIterator<Item = (usize, &'a str)>,
    {
        let (sentences, sentence_to_segment) = self.tokenize(segments);
        let vocab = self.unigram_statistics(&sentences);
        debug!(
            "[{}] {} sentences, {} distinct words",
            self.locale.tag(),
            sentences.len(),
            vocab.terms.len()
        );

        let freqs: Vec<usize> = vocab.terms.iter().map(|t| t.term_frequency).collect();
        let stats = CorpusStats::from_frequencies(&freqs, sentences.len());
        let mut vocab = vocab;
        for term in &mut vocab.terms {
            term.compute_features(&stats);
        }

        let candidates = self.generate_candidates(&sentences, &vocab, &stats);
        debug!("[{}] {} raw candidates", self.locale.tag(), candidates.len());

        let kept: Vec<Term> = candidates
            .into_iter()
            .map(|c| c.term)
            .filter(|t| self.keep(t))
            .collect();
        debug!("[{}] {} candidates after filter", self.locale.tag(), kept.len());

        let merged = case_fold_merge(kept);
        let terms = fuzzy_merge(merged, self.options.fuzzy_min_similarity);
        debug!("[{}] {} terms after dedup", self.locale.tag(), terms.len());

        Extraction {
            terms,
            sentence_to_segment,
        }
    }

    fn tokenize<'a, I>(&self, segments: I) -> (Vec<Sentence>, Vec<usize>)
    where
        I: IntoIterator<Item = (usize, &'a str)>,
    {
        let mut sentences = Vec::new();
        let mut sentence_to_segment = Vec::new();
        for (number, text) in segments {
            for sentence in split_sentences(text) {
                let chunks = split_chunks(&sentence)
                    .into_iter()
                    .enumerate()
                    .map(|(j, chunk)| {
                        split_words(chunk)
                            .into_iter()
                            .enumerate()
                            .map(|(k, word)| self.token(word, j == 0 && k == 0))
                            .collect::<Chunk>()
                    })
                    .filter(|tokens| !tokens.is_empty())
                    .collect();
                sentences.push(Sentence { chunks });
                sentence_to_segment.push(number);
            }
        }
        (sentences, sentence_to_segment)
    }

    fn token(&self, word: &str, begins_sentence: bool) -> Token {
        Token::new(word, &self.locale, &self.stopwords, begins_sentence)
    }

    fn unigram_statistics(&self, sentences: &[Sentence]) -> Vocabulary {
        let mut vocab = Vocabulary::default();
        for (i, sentence) in sentences.iter().enumerate() {
            for tokens in &sentence.chunks {
                for (k, token) in tokens.iter().enumerate() {
                    let idx = vocab.intern(&token.text, &token.lower);
                    let term = &mut vocab.terms[idx];
                    term.record_occurrence(i);
                    match token.tag {
                        TokenTag::Acronym => term.acronym_frequency += 1,
                        TokenTag::UpperCase => term.upper_case_frequency += 1,
                        _ => {}
                    }
                    for m in 1..=CONTEXT_WINDOW {
                        if let Some(left) = k.checked_sub(m).map(|p| &tokens[p]) {
                            if left.is_relatable() {
                                *term.left_words.entry(left.lower.clone()).or_insert(0) += 1;
                            }
                        }
                        if let Some(right) = tokens.get(k + m) {
                            if right.is_relatable() {
                                *term.right_words.entry(right.lower.clone()).or_insert(0) += 1;
                            }
                        }
                    }
                }
            }
        }
        vocab
    }

    fn generate_candidates(
        &self,
        sentences: &[Sentence],
        vocab: &Vocabulary,
        stats: &CorpusStats,
    ) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let max_len = self.options.max_term_length;

        for (i, sentence) in sentences.iter().enumerate() {
            for tokens in &sentence.chunks {
                for h in 0..tokens.len() {
                    if !tokens[h].is_relatable() {
                        continue;
                    }
                    for len in 1..=max_len {
                        let Some(window) = tokens.get(h..h + len) else {
                            break;
                        };
                        let (first, last) = (&window[0], &window[len - 1]);
                        if first.stopword || last.stopword {
                            continue;
                        }
                        let key = window
                            .iter()
                            .map(|t| t.lower.as_str())
                            .collect::<Vec<_>>()
                            .join(" ");
                        let slot = match index.get(&key) {
                            Some(&slot) => slot,
                            None => {
                                let term = if len == 1 {
                                    vocab.index.get(&key).map_or_else(
                                        || Term::new(first.text.trim(), key.as_str()),
                                        |&u| vocab.terms[u].clone(),
                                    )
                                } else {
                                    let surface = window
                                        .iter()
                                        .map(|t| t.text.as_str())
                                        .collect::<Vec<_>>()
                                        .join(" ");
                                    Term::new(surface.trim(), key.as_str())
                                };
                                let parts = window
                                    .iter()
                                    .map(|t| (t.lower.clone(), t.stopword))
                                    .collect();
                                candidates.push(Candidate { term, parts });
                                index.insert(key, candidates.len() - 1);
                                candidates.len() - 1
                            }
                        };
                        if len > 1 {
                            candidates[slot].term.record_occurrence(i);
                        }
                    }
                }
            }
        }

        for cand in &mut candidates {
            let tf = cand.term.term_frequency;
            cand.term.score = combined_score(&cand.parts, tf, vocab);
            if cand.parts.len() > 1 {
                let nf = stats.normalized_frequency(tf);
                cand.term.features.normalized_frequency = nf;
                cand.term.features.relevance = 1.0 / (1.0 + nf);
            }
        }
        candidates
    }

    fn keep(&self, term: &Term) -> bool {
        if self.options.relevant_only && term.features.relevance < 1.0 {
            return false;
        }
        if term.score > self.options.max_score {
            return false;
        }
        if self.stopwords.contains(&self.locale.lowercase(&term.text)) {
            return false;
        }
        if term.term_frequency < self.options.min_frequency {
            return false;
        }
        if is_number(&term.text) {
            return false;
        }
        term.text.chars().count() >= 2
    }
}

fn combined_score(parts: &[(String, bool)], frequency: usize, vocab: &Vocabulary) -> f64 {
    let mut prod = 1.0;
    let mut sum = 0.0;
    for (i, (key, stopword)) in parts.iter().enumerate() {
        if *stopword {
            let before = if i == 0 {
                0.0
            } else {
                vocab.score_of(&parts[i - 1].0)
            };
            let after = parts
                .get(i + 1)
                .map_or(0.0, |(next, _)| vocab.score_of(next));
            let p = before * after;
            prod *= 1.0 + (1.0 - p);
            sum += 1.0 - p;
        } else {
            let s = vocab.score_of(key);
            prod *= s;
            sum += s;
        }
    }
    let frequency = frequency.max(1) as f64;
    let score = prod / (frequency * (sum + 1.0));
    if score.is_finite() && score > 0.0 {
        score
    } else {
        0.0
    }
}

/// True for text that reads as a plain decimal number ("42", "3.14", "-1").
#[must_use]
pub fn is_number(text: &str) -> bool {
    let text = text.trim();
    text.chars().any(|c| c.is_ascii_digit())
        && text
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        && text.parse::<f64>().is_ok()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{is_number, ExtractOptions, TermExtractor};
    use crate::locale::Locale;
    use crate::term::Term;

    fn extractor(stopwords: &[&str], options: ExtractOptions) -> TermExtractor {
        let sw: HashSet<String> = stopwords.iter().map(|s| s.to_string()).collect();
        TermExtractor::new(Locale::from_tag("en"), sw, options)
    }

    fn permissive() -> ExtractOptions {
        ExtractOptions {
            max_term_length: 3,
            min_frequency: 1,
            max_score: f64::INFINITY,
            ..ExtractOptions::default()
        }
    }

    fn find<'a>(terms: &'a [Term], text: &str) -> Option<&'a Term> {
        terms.iter().find(|t| t.key == text)
    }

    #[test]
    fn single_segment_candidates() {
        let ex = extractor(&["from"], permissive());
        let out = ex.extract([(0usize, "Machine learning systems learn from data.")]);
        for expected in [
            "machine learning",
            "learning systems",
            "machine learning systems",
            "learn from data",
        ] {
            assert!(find(&out.terms, expected).is_some(), "missing {expected}");
        }
        assert!(find(&out.terms, "from data").is_none());
        assert!(find(&out.terms, "learn from").is_none());
        assert!(find(&out.terms, "from").is_none());
        assert_eq!(out.sentence_to_segment, vec![0]);
    }

    #[test]
    fn unigram_casing_counts() {
        let ex = extractor(&[], permissive());
        let out = ex.extract([(0usize, "We like Apple and apple and APPLE today.")]);
        let apple = find(&out.terms, "apple").expect("apple");
        assert_eq!(apple.term_frequency, 3);
        assert_eq!(apple.acronym_frequency, 1);
        assert_eq!(apple.upper_case_frequency, 1);
        assert_eq!(apple.sentence_offsets.len(), apple.term_frequency);
        assert_eq!(out.terms.iter().filter(|t| t.key == "apple").count(), 1);
    }

    #[test]
    fn scores_are_finite_and_non_negative() {
        let ex = extractor(&["the", "a", "of"], permissive());
        let text = "The quality of the translation memory matters. \
                    A translation memory stores segments. Segments of text repeat.";
        let out = ex.extract([(0usize, text), (1, "Translation memory again.")]);
        assert!(!out.terms.is_empty());
        for t in &out.terms {
            assert!(t.score.is_finite() && t.score >= 0.0, "{} -> {}", t.text, t.score);
        }
        let tm = find(&out.terms, "translation memory").expect("bigram");
        assert_eq!(tm.term_frequency, 3);
        assert_eq!(out.sentence_to_segment, vec![0, 0, 0, 1]);
    }

    #[test]
    fn min_frequency_and_numbers_are_filtered() {
        let opts = ExtractOptions {
            min_frequency: 2,
            ..permissive()
        };
        let ex = extractor(&[], opts);
        let out = ex.extract([(0usize, "Pump 42 failed."), (1, "Pump 42 restarted.")]);
        assert!(find(&out.terms, "pump").is_some());
        assert!(find(&out.terms, "failed").is_none());
        assert!(find(&out.terms, "42").is_none());
    }

    #[test]
    fn relevance_filter_drops_frequent_terms() {
        let opts = ExtractOptions {
            relevant_only: true,
            ..permissive()
        };
        let ex = extractor(&[], opts);
        let out = ex.extract([(0usize, "Pump failed.")]);
        assert!(out.terms.is_empty());
    }

    #[test]
    fn empty_input_yields_nothing() {
        let ex = extractor(&[], permissive());
        let out = ex.extract(std::iter::empty::<(usize, &str)>());
        assert!(out.terms.is_empty());
        assert!(out.sentence_to_segment.is_empty());
    }

    #[test]
    fn numeric_text() {
        assert!(is_number("3.14"));
        assert!(is_number("42"));
        assert!(!is_number("3.14%"));
        assert!(!is_number("nan"));
        assert!(!is_number("inf"));
        assert!(!is_number("e"));
    }

    #[test]
    fn option_validation() {
        assert!(ExtractOptions::default().validate().is_ok());
        let bad = ExtractOptions {
            min_frequency: 0,
            ..ExtractOptions::default()
        };
        assert!(bad.validate().is_err());
        let bad = ExtractOptions {
            max_score: 0.0,
            ..ExtractOptions::default()
        };
        assert!(bad.validate().is_err());
        let bad = ExtractOptions {
            max_term_length: 0,
            ..ExtractOptions::default()
        };
        assert!(bad.validate().is_err());
    }
}
