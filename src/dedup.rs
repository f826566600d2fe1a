use std::cmp::Ordering;
use std::collections::HashMap;

use crate::term::Term;

const MAX_FUZZY_DISTANCE: usize = 2;
/// Floor for same-length pairs, where only substitutions separate the two
/// spellings ("parent"/"patent").
const SUBSTITUTION_MIN_SIMILARITY: f64 = 0.90;

/// Collapses terms whose surfaces differ only by case.
///
/// The best-scoring member survives (ties go to the more frequent one) and
/// absorbs the occurrence counters of the others.
#[must_use]
pub fn case_fold_merge(terms: Vec<Term>) -> Vec<Term> {
    let mut groups: Vec<Vec<Term>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for term in terms {
        let folded = term.text.to_lowercase();
        match index.get(&folded) {
            Some(&g) => groups[g].push(term),
            None => {
                index.insert(folded, groups.len());
                groups.push(vec![term]);
            }
        }
    }

    groups
        .into_iter()
        .filter_map(|mut group| {
            if group.len() == 1 {
                return group.pop();
            }
            let best = (0..group.len()).reduce(|a, b| {
                if better(&group[b], &group[a]) {
                    b
                } else {
                    a
                }
            })?;
            let mut survivor = group.swap_remove(best);
            for other in group {
                absorb(&mut survivor, other);
            }
            Some(survivor)
        })
        .collect()
}

/// Drops near-duplicate spellings ("color"/"colour"), keeping the better term.
///
/// Two terms merge when their case-folded lengths differ by at most 2, their
/// edit distance is at most 2, neither is a substring of the other, and
/// `1 - distance / longest` exceeds `min_similarity`. Same-length pairs must
/// also exceed 0.90.
#[must_use]
pub fn fuzzy_merge(terms: Vec<Term>, min_similarity: f64) -> Vec<Term> {
    let folded: Vec<Vec<char>> = terms
        .iter()
        .map(|t| t.text.to_lowercase().chars().collect())
        .collect();
    let mut alive = vec![true; terms.len()];

    for i in 0..terms.len() {
        if !alive[i] {
            continue;
        }
        for j in (i + 1)..terms.len() {
            if !alive[j] || !near_duplicates(&folded[i], &folded[j], min_similarity) {
                continue;
            }
            if better(&terms[j], &terms[i]) {
                alive[i] = false;
                break;
            }
            alive[j] = false;
        }
    }

    terms
        .into_iter()
        .zip(alive)
        .filter_map(|(t, keep)| keep.then_some(t))
        .collect()
}

fn near_duplicates(a: &[char], b: &[char], min_similarity: f64) -> bool {
    if a == b || a.len().abs_diff(b.len()) > MAX_FUZZY_DISTANCE {
        return false;
    }
    if contains(a, b) || contains(b, a) {
        return false;
    }
    let d = levenshtein(a, b);
    if d > MAX_FUZZY_DISTANCE {
        return false;
    }
    let longest = a.len().max(b.len());
    let similarity = 1.0 - d as f64 / longest as f64;
    let threshold = if a.len() == b.len() {
        min_similarity.max(SUBSTITUTION_MIN_SIMILARITY)
    } else {
        min_similarity
    };
    similarity > threshold
}

fn contains(hay: &[char], needle: &[char]) -> bool {
    needle.is_empty() || hay.windows(needle.len()).any(|w| w == needle)
}

fn better(a: &Term, b: &Term) -> bool {
    match a.score.partial_cmp(&b.score) {
        Some(Ordering::Less) => true,
        Some(Ordering::Greater) => false,
        _ => a.term_frequency > b.term_frequency,
    }
}

fn absorb(survivor: &mut Term, other: Term) {
    survivor.term_frequency += other.term_frequency;
    survivor.acronym_frequency += other.acronym_frequency;
    survivor.upper_case_frequency += other.upper_case_frequency;
    survivor.sentence_offsets.extend(other.sentence_offsets);
    survivor.sentence_offsets.sort_unstable();
    for (w, c) in other.left_words {
        *survivor.left_words.entry(w).or_insert(0) += c;
    }
    for (w, c) in other.right_words {
        *survivor.right_words.entry(w).or_insert(0) += c;
    }
}

/// Character-level edit distance.
#[must_use]
pub fn levenshtein(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        cur[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            cur[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(cur[j] + 1);
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::{case_fold_merge, fuzzy_merge, levenshtein};
    use crate::term::Term;

    fn term(text: &str, score: f64, tf: usize) -> Term {
        let mut t = Term::new(text, text.to_lowercase());
        t.score = score;
        for i in 0..tf {
            t.record_occurrence(i);
        }
        t
    }

    fn lev(a: &str, b: &str) -> usize {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        levenshtein(&a, &b)
    }

    #[test]
    fn edit_distance() {
        assert_eq!(lev("kitten", "sitting"), 3);
        assert_eq!(lev("color", "colour"), 1);
        assert_eq!(lev("", "abc"), 3);
        assert_eq!(lev("same", "same"), 0);
    }

    #[test]
    fn case_variants_collapse_into_one() {
        let mut upper = term("APPLE", 0.3, 1);
        upper.acronym_frequency = 1;
        let merged = case_fold_merge(vec![term("Apple", 0.2, 1), term("apple", 0.5, 1), upper]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].text, "Apple");
        assert_eq!(merged[0].term_frequency, 3);
        assert_eq!(merged[0].acronym_frequency, 1);
        assert_eq!(merged[0].sentence_offsets.len(), 3);
    }

    #[test]
    fn case_fold_tie_prefers_frequency() {
        let merged = case_fold_merge(vec![term("Data", 0.2, 1), term("data", 0.2, 4)]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].text, "data");
    }

    #[test]
    fn spelling_variants_merge() {
        let out = fuzzy_merge(vec![term("color", 0.4, 2), term("colour", 0.1, 2)], 0.8);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "colour");
    }

    #[test]
    fn substrings_and_distant_terms_stay() {
        let out = fuzzy_merge(
            vec![
                term("learning", 0.4, 2),
                term("machine learning", 0.1, 2),
                term("model", 0.3, 2),
                term("models", 0.2, 2),
            ],
            0.8,
        );
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn fuzzy_merge_is_idempotent() {
        let input = vec![
            term("organise", 0.5, 3),
            term("organize", 0.2, 3),
            term("color", 0.4, 1),
            term("colour", 0.1, 1),
            term("translation", 0.1, 5),
        ];
        let once = fuzzy_merge(input, 0.8);
        let texts: Vec<String> = once.iter().map(|t| t.text.clone()).collect();
        let twice = fuzzy_merge(once, 0.8);
        let again: Vec<String> = twice.iter().map(|t| t.text.clone()).collect();
        assert_eq!(texts, again);
        assert_eq!(texts, vec!["organise", "organize", "colour", "translation"]);
    }

    #[test]
    fn same_length_words_need_high_similarity() {
        let out = fuzzy_merge(vec![term("parent", 0.2, 3), term("patent", 0.3, 3)], 0.8);
        assert_eq!(out.len(), 2);
        let out = fuzzy_merge(vec![term("favour", 0.2, 3), term("favor", 0.3, 3)], 0.8);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "favour");
        let out = fuzzy_merge(
            vec![term("internationalise", 0.2, 2), term("internationalize", 0.3, 2)],
            0.8,
        );
        assert_eq!(out.len(), 1);
    }
}
