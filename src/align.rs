use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;

use log::debug;

use crate::error::{ExtractError, Invalid, Result};
use crate::extractor::Extraction;
use crate::term::Term;

#[derive(Clone, Debug, PartialEq)]
pub struct AlignOptions {
    pub min_co_occurrence: usize,
    /// Per-term cap on pairs; 0 means unlimited.
    pub max_pairs: usize,
    pub min_co_occurrence_ratio: f64,
}

impl Default for AlignOptions {
    fn default() -> Self {
        Self {
            min_co_occurrence: 1,
            max_pairs: 0,
            min_co_occurrence_ratio: 0.70,
        }
    }
}

impl AlignOptions {
    pub fn validate(&self) -> Result<()> {
        if self.min_co_occurrence < 1 {
            return Err(ExtractError::InvalidArgument(Invalid::MinCoOccurrence));
        }
        if !(0.0..=1.0).contains(&self.min_co_occurrence_ratio) {
            return Err(ExtractError::InvalidArgument(Invalid::CoOccurrenceRatio));
        }
        Ok(())
    }
}

/// A source term and a target term seen together in `shared_segments`.
#[derive(Clone, Debug)]
pub struct TermPair<'a> {
    pub source: &'a Term,
    pub target: &'a Term,
    pub shared_segments: BTreeSet<usize>,
}

impl TermPair<'_> {
    #[must_use]
    pub fn co_occurrence(&self) -> usize {
        self.shared_segments.len()
    }

    fn segments_signature(&self) -> String {
        self.shared_segments
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Full alignment: pair generation, mutual best match, ratio filter, caps, dedup.
#[must_use]
pub fn align<'a>(
    source: &'a Extraction,
    target: &'a Extraction,
    options: &AlignOptions,
) -> Vec<TermPair<'a>> {
    let src_segments = term_segments(&source.terms, &source.sentence_to_segment);
    let tgt_segments = term_segments(&target.terms, &target.sentence_to_segment);

    let pairs = generate_pairs(&source.terms, &src_segments, &target.terms, &tgt_segments);
    debug!("generated {} co-occurring pairs", pairs.len());
    let total = pairs.len();
    let pairs = mutual_best_match(pairs);
    debug!("mutual best match kept {} of {total}", pairs.len());
    let pairs = filter_pairs(pairs, options);
    debug!("{} pairs after co-occurrence filter", pairs.len());
    let pairs = cap_pairs(pairs, options.max_pairs);
    let mut pairs = deduplicate_pairs(pairs);
    debug!("{} pairs after dedup", pairs.len());

    pairs.sort_by(|a, b| {
        b.co_occurrence()
            .cmp(&a.co_occurrence())
            .then_with(|| a.source.text.cmp(&b.source.text))
            .then_with(|| a.target.text.cmp(&b.target.text))
    });
    pairs
}

/// Projects each term's sentence offsets onto segment numbers. Offsets past the
/// end of the map are ignored.
#[must_use]
pub fn term_segments(terms: &[Term], sentence_to_segment: &[usize]) -> Vec<BTreeSet<usize>> {
    terms
        .iter()
        .map(|t| {
            t.sentence_offsets
                .iter()
                .filter_map(|&s| sentence_to_segment.get(s).copied())
                .collect()
        })
        .collect()
}

#[must_use]
pub fn generate_pairs<'a>(
    source_terms: &'a [Term],
    source_segments: &[BTreeSet<usize>],
    target_terms: &'a [Term],
    target_segments: &[BTreeSet<usize>],
) -> Vec<TermPair<'a>> {
    let mut pairs = Vec::new();
    for (src, src_segs) in source_terms.iter().zip(source_segments) {
        if src_segs.is_empty() {
            continue;
        }
        for (tgt, tgt_segs) in target_terms.iter().zip(target_segments) {
            if tgt_segs.is_empty() {
                continue;
            }
            let shared: BTreeSet<usize> = src_segs.intersection(tgt_segs).copied().collect();
            if !shared.is_empty() {
                pairs.push(TermPair {
                    source: src,
                    target: tgt,
                    shared_segments: shared,
                });
            }
        }
    }
    pairs
}

/// Keeps pairs that hold the highest co-occurrence for both their source and
/// their target term. The first pair reaching the maximum wins ties.
#[must_use]
pub fn mutual_best_match(pairs: Vec<TermPair<'_>>) -> Vec<TermPair<'_>> {
    let mut best_for_source: HashMap<&str, usize> = HashMap::new();
    let mut best_for_target: HashMap<&str, usize> = HashMap::new();
    for (i, pair) in pairs.iter().enumerate() {
        let count = pair.co_occurrence();
        let slot = best_for_source.entry(pair.source.key.as_str()).or_insert(i);
        if count > pairs[*slot].co_occurrence() {
            *slot = i;
        }
        let slot = best_for_target.entry(pair.target.key.as_str()).or_insert(i);
        if count > pairs[*slot].co_occurrence() {
            *slot = i;
        }
    }

    let keep: Vec<bool> = pairs
        .iter()
        .enumerate()
        .map(|(i, p)| {
            best_for_source.get(p.source.key.as_str()) == Some(&i)
                && best_for_target.get(p.target.key.as_str()) == Some(&i)
        })
        .collect();
    pairs
        .into_iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(p))
        .collect()
}

/// Minimum co-occurrence plus the two-sided ratio gate; output sorted by
/// co-occurrence, highest first.
#[must_use]
pub fn filter_pairs<'a>(pairs: Vec<TermPair<'a>>, options: &AlignOptions) -> Vec<TermPair<'a>> {
    let mut kept: Vec<TermPair<'a>> = pairs
        .into_iter()
        .filter(|p| {
            let shared = p.co_occurrence();
            if shared < options.min_co_occurrence {
                return false;
            }
            let src_ratio = ratio(shared, p.source.term_frequency);
            let tgt_ratio = ratio(shared, p.target.term_frequency);
            src_ratio >= options.min_co_occurrence_ratio
                && tgt_ratio >= options.min_co_occurrence_ratio
        })
        .collect();
    kept.sort_by(|a, b| b.co_occurrence().cmp(&a.co_occurrence()));
    kept
}

fn ratio(shared: usize, frequency: usize) -> f64 {
    if frequency == 0 {
        return 0.0;
    }
    shared as f64 / frequency as f64
}

/// Truncates each source term's pairs, then each target term's, to `max_pairs`.
#[must_use]
pub fn cap_pairs(mut pairs: Vec<TermPair<'_>>, max_pairs: usize) -> Vec<TermPair<'_>> {
    if max_pairs == 0 {
        return pairs;
    }
    pairs.sort_by(|a, b| b.co_occurrence().cmp(&a.co_occurrence()));
    let by_source = group_by(pairs, |p| p.source.key.clone());
    let limited: Vec<TermPair<'_>> = by_source
        .into_iter()
        .flat_map(|g| g.into_iter().take(max_pairs))
        .collect();
    let by_target = group_by(limited, |p| p.target.key.clone());
    by_target
        .into_iter()
        .flat_map(|g| g.into_iter().take(max_pairs))
        .collect()
}

/// Two symmetric passes: among pairs sharing a source term and segment set,
/// prefer the most specific target; then the same for sources.
#[must_use]
pub fn deduplicate_pairs(pairs: Vec<TermPair<'_>>) -> Vec<TermPair<'_>> {
    let by_source = group_by(pairs, |p| (p.source.key.clone(), p.segments_signature()));
    let after_source: Vec<TermPair<'_>> = by_source
        .into_iter()
        .flat_map(|g| dedup_by_substring(g, Side::Target))
        .collect();
    let by_target = group_by(after_source, |p| (p.target.key.clone(), p.segments_signature()));
    by_target
        .into_iter()
        .flat_map(|g| dedup_by_substring(g, Side::Source))
        .collect()
}

#[derive(Clone, Copy)]
enum Side {
    Source,
    Target,
}

fn side_term<'a>(pair: &TermPair<'a>, side: Side) -> &'a Term {
    match side {
        Side::Source => pair.source,
        Side::Target => pair.target,
    }
}

fn dedup_by_substring(group: Vec<TermPair<'_>>, side: Side) -> Vec<TermPair<'_>> {
    if group.len() < 2 {
        return group;
    }
    let folded: Vec<String> = group
        .iter()
        .map(|p| side_term(p, side).text.to_lowercase())
        .collect();
    let mut kept = vec![true; group.len()];
    for i in 0..group.len() {
        if !kept[i] {
            continue;
        }
        for j in 0..group.len() {
            if i == j || !kept[j] || folded[i] == folded[j] {
                continue;
            }
            if folded[j].contains(folded[i].as_str()) {
                kept[i] = false;
                break;
            }
            if folded[i].contains(folded[j].as_str()) {
                kept[j] = false;
            }
        }
    }

    let remaining: Vec<TermPair<'_>> = group
        .into_iter()
        .zip(kept)
        .filter_map(|(p, k)| k.then_some(p))
        .collect();
    if remaining.len() < 2 {
        return remaining;
    }
    let mut best: Option<TermPair<'_>> = None;
    for pair in remaining {
        let better = best
            .as_ref()
            .map_or(true, |b| side_term(&pair, side).score < side_term(b, side).score);
        if better {
            best = Some(pair);
        }
    }
    best.into_iter().collect()
}

// Groups preserving the order in which each key is first seen.
fn group_by<T, K, F>(items: Vec<T>, key: F) -> Vec<Vec<T>>
where
    K: Hash + Eq,
    F: Fn(&T) -> K,
{
    let mut groups: Vec<Vec<T>> = Vec::new();
    let mut index: HashMap<K, usize> = HashMap::new();
    for item in items {
        let k = key(&item);
        match index.get(&k) {
            Some(&g) => groups[g].push(item),
            None => {
                index.insert(k, groups.len());
                groups.push(vec![item]);
            }
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{
        cap_pairs, deduplicate_pairs, filter_pairs, mutual_best_match, term_segments,
        AlignOptions, TermPair,
    };
    use crate::term::Term;

    fn term(text: &str, tf: usize, score: f64) -> Term {
        let mut t = Term::new(text, text.to_lowercase());
        t.term_frequency = tf;
        t.score = score;
        t
    }

    fn segs(n: usize) -> BTreeSet<usize> {
        (0..n).collect()
    }

    fn pair<'a>(s: &'a Term, t: &'a Term, shared: BTreeSet<usize>) -> TermPair<'a> {
        TermPair {
            source: s,
            target: t,
            shared_segments: shared,
        }
    }

    fn names(pairs: &[TermPair<'_>]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|p| (p.source.text.clone(), p.target.text.clone()))
            .collect()
    }

    #[test]
    fn projects_sentences_onto_segments() {
        let mut t = term("cat", 0, 0.1);
        t.sentence_offsets = vec![0, 1, 2, 9];
        let out = term_segments(&[t], &[0, 0, 3]);
        assert_eq!(out[0], BTreeSet::from([0, 3]));
    }

    #[test]
    fn mutual_best_keeps_only_reciprocal_pairs() {
        let (a, b, x, y) = (term("A", 5, 0.1), term("B", 2, 0.1), term("X", 5, 0.1), term("Y", 3, 0.1));
        let pairs = vec![pair(&a, &x, segs(5)), pair(&a, &y, segs(3)), pair(&b, &x, segs(2))];
        let out = mutual_best_match(pairs);
        assert_eq!(names(&out), vec![("A".into(), "X".into())]);

        let again = mutual_best_match(out.clone());
        assert_eq!(names(&again), names(&out));
    }

    #[test]
    fn ratio_gate_checks_both_sides() {
        let (cat, chat, the, le) = (term("cat", 2, 0.1), term("chat", 2, 0.1), term("the", 10, 0.1), term("le", 2, 0.1));
        let pairs = vec![pair(&cat, &chat, segs(2)), pair(&the, &le, segs(2))];
        let opts = AlignOptions {
            min_co_occurrence: 2,
            ..AlignOptions::default()
        };
        let out = filter_pairs(pairs, &opts);
        assert_eq!(names(&out), vec![("cat".into(), "chat".into())]);
        for p in &out {
            assert!(p.co_occurrence() >= opts.min_co_occurrence);
        }
    }

    #[test]
    fn min_co_occurrence_drops_singletons() {
        let (dog, chien) = (term("dog", 1, 0.1), term("chien", 1, 0.1));
        let opts = AlignOptions {
            min_co_occurrence: 2,
            ..AlignOptions::default()
        };
        assert!(filter_pairs(vec![pair(&dog, &chien, segs(1))], &opts).is_empty());
    }

    #[test]
    fn caps_apply_per_source_and_per_target() {
        let (a, x, y, z) = (term("a", 3, 0.1), term("x", 3, 0.1), term("y", 3, 0.1), term("z", 3, 0.1));
        let pairs = vec![pair(&a, &y, segs(2)), pair(&a, &x, segs(3)), pair(&a, &z, segs(1))];
        let out = cap_pairs(pairs.clone(), 1);
        assert_eq!(names(&out), vec![("a".into(), "x".into())]);
        assert_eq!(cap_pairs(pairs, 0).len(), 3);
    }

    #[test]
    fn substring_dedup_prefers_longer_surface() {
        let ml = term("machine learning", 3, 0.5);
        let learning = term("learning", 3, 0.2);
        let aa = term("apprentissage automatique", 3, 0.3);
        let auto = term("automatique", 3, 0.1);
        let pairs = vec![
            pair(&ml, &aa, segs(3)),
            pair(&ml, &auto, segs(3)),
            pair(&learning, &aa, segs(3)),
        ];
        let out = deduplicate_pairs(pairs);
        assert_eq!(
            names(&out),
            vec![("machine learning".into(), "apprentissage automatique".into())]
        );
    }

    #[test]
    fn quality_dedup_keeps_lowest_score() {
        let src = term("pump", 3, 0.2);
        let t1 = term("pompe", 3, 0.4);
        let t2 = term("bomba", 3, 0.1);
        let out = deduplicate_pairs(vec![pair(&src, &t1, segs(3)), pair(&src, &t2, segs(3))]);
        assert_eq!(names(&out), vec![("pump".into(), "bomba".into())]);
    }
}
