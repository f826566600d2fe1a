use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

static PUNCT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{P}").expect("punct regex"));

/// Sentences of one segment, NBSP folded to plain space, blanks dropped.
#[must_use]
pub fn split_sentences(text: &str) -> Vec<String> {
    let text = text.replace('\u{00A0}', " ");
    text.unicode_sentences()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Runs of non-punctuation text. A '.' between two digits stays inside its chunk.
#[must_use]
pub fn split_chunks(sentence: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0usize;
    for m in PUNCT_RE.find_iter(sentence) {
        if m.as_str() == "." && is_decimal_point(sentence, m.start(), m.end()) {
            continue;
        }
        push_chunk(&mut out, &sentence[start..m.start()]);
        start = m.end();
    }
    push_chunk(&mut out, &sentence[start..]);
    out
}

#[must_use]
pub fn split_words(chunk: &str) -> Vec<&str> {
    chunk
        .split_word_bounds()
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .collect()
}

fn push_chunk<'a>(out: &mut Vec<&'a str>, chunk: &'a str) {
    let chunk = chunk.trim();
    if !chunk.is_empty() {
        out.push(chunk);
    }
}

fn is_decimal_point(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    matches!((before, after), (Some(b), Some(a)) if b.is_ascii_digit() && a.is_ascii_digit())
}
