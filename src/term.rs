use std::collections::HashMap;

/// Corpus-wide frequency statistics shared by every term's features.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CorpusStats {
    pub mean: f64,
    pub std_dev: f64,
    pub max_frequency: f64,
    pub sentence_count: usize,
}

impl CorpusStats {
    #[must_use]
    pub fn from_frequencies(freqs: &[usize], sentence_count: usize) -> Self {
        if freqs.is_empty() {
            return Self {
                sentence_count,
                ..Self::default()
            };
        }
        let n = freqs.len() as f64;
        let sum: f64 = freqs.iter().map(|&f| f as f64).sum();
        let mean = sum / n;
        let std_dev = if freqs.len() > 1 {
            let var = freqs
                .iter()
                .map(|&f| {
                    let d = f as f64 - mean;
                    d * d
                })
                .sum::<f64>()
                / (n - 1.0);
            var.sqrt()
        } else {
            0.0
        };
        let max_frequency = freqs.iter().copied().max().unwrap_or(0) as f64;
        Self {
            mean,
            std_dev,
            max_frequency,
            sentence_count,
        }
    }

    #[must_use]
    pub fn normalized_frequency(&self, term_frequency: usize) -> f64 {
        safe_div(term_frequency as f64, self.mean + self.std_dev)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TermFeatures {
    pub casing: f64,
    pub position: f64,
    pub normalized_frequency: f64,
    pub different: f64,
    pub relatedness: f64,
    pub relevance: f64,
}

#[derive(Clone, Debug, Default)]
pub struct Term {
    /// Surface form as first observed.
    pub text: String,
    /// Locale-lowercased surface; the lookup key.
    pub key: String,
    pub sentence_offsets: Vec<usize>,
    pub term_frequency: usize,
    pub acronym_frequency: usize,
    pub upper_case_frequency: usize,
    pub left_words: HashMap<String, usize>,
    pub right_words: HashMap<String, usize>,
    pub features: TermFeatures,
    pub score: f64,
}

impl Term {
    pub fn new(text: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn record_occurrence(&mut self, sentence: usize) {
        self.term_frequency += 1;
        self.sentence_offsets.push(sentence);
    }

    /// Fills `features` and `score` from the term's own counters and the corpus statistics.
    pub fn compute_features(&mut self, stats: &CorpusStats) {
        let tf = self.term_frequency as f64;
        let normalized_frequency = stats.normalized_frequency(self.term_frequency);

        let position = (3.0 + median(&self.sentence_offsets)).ln().ln();
        let different = safe_div(self.sentence_offsets.len() as f64, stats.sentence_count as f64);

        let wr = dispersion(&self.right_words);
        let wl = dispersion(&self.left_words);
        let relatedness = 1.0 + safe_div((wr + wl) * normalized_frequency, stats.max_frequency);

        let casing = if self.term_frequency == 0 {
            0.0
        } else {
            let cased = self.upper_case_frequency.max(self.acronym_frequency) as f64;
            safe_div(cased, 1.0 + tf.ln())
        };

        self.features = TermFeatures {
            casing,
            position,
            normalized_frequency,
            different,
            relatedness,
            relevance: 1.0 / (1.0 + normalized_frequency),
        };
        self.score = yake_score(&self.features);
    }
}

fn yake_score(f: &TermFeatures) -> f64 {
    if f.relatedness == 0.0 {
        return 0.0;
    }
    let denom = f.casing + f.normalized_frequency / f.relatedness + f.different / f.relatedness;
    let score = safe_div(f.relatedness * f.position, denom);
    if score.is_finite() && score > 0.0 {
        score
    } else {
        0.0
    }
}

// Distinct neighbours over total neighbour occurrences.
fn dispersion(bag: &HashMap<String, usize>) -> f64 {
    let total: usize = bag.values().sum();
    safe_div(bag.len() as f64, total as f64)
}

#[must_use]
pub fn median(values: &[usize]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
    } else {
        sorted[mid] as f64
    }
}

#[must_use]
pub fn safe_div(num: f64, denom: f64) -> f64 {
    if denom == 0.0 || !denom.is_finite() {
        return 0.0;
    }
    let v = num / denom;
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::{median, CorpusStats, Term};

    #[test]
    fn sample_std_dev() {
        let s = CorpusStats::from_frequencies(&[2, 4, 4, 4, 5, 5, 7, 9], 10);
        assert!((s.mean - 5.0).abs() < 1e-12);
        assert!((s.std_dev - 2.138_089_935_299_395).abs() < 1e-9);
        assert_eq!(s.max_frequency, 9.0);

        let single = CorpusStats::from_frequencies(&[3], 1);
        assert_eq!(single.std_dev, 0.0);
        assert_eq!(single.normalized_frequency(3), 1.0);
    }

    #[test]
    fn median_even_and_odd() {
        assert_eq!(median(&[5, 1, 3]), 3.0);
        assert_eq!(median(&[4, 1, 3, 2]), 2.5);
        assert_eq!(median(&[]), 0.0);
    }

    #[test]
    fn single_sentence_term() {
        let stats = CorpusStats::from_frequencies(&[1, 1, 2], 4);
        let mut t = Term::new("data", "data");
        t.record_occurrence(2);
        t.compute_features(&stats);
        assert!((t.features.different - 0.25).abs() < 1e-12);
        assert!(t.features.position > 0.0);
        assert!(t.score.is_finite() && t.score >= 0.0);
    }

    #[test]
    fn empty_corpus_never_produces_nan() {
        let stats = CorpusStats::from_frequencies(&[], 0);
        let mut t = Term::new("x", "x");
        t.compute_features(&stats);
        assert_eq!(t.score, 0.0);
        assert!(!t.features.relevance.is_nan());
    }
}
