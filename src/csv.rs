use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::align::TermPair;
use crate::error::{ExtractError, Result};
use crate::term::Term;

const BOM: [u8; 2] = [0xFF, 0xFE];

pub const PAIR_HEADER: &str =
    "SourceTerm,SourceScore,SourceFreq,TargetTerm,TargetScore,TargetFreq,SharedSegments,CoOccurrenceCount";
pub const TERM_HEADER: &str = "Term,Score,Frequency";

/// Quotes a field when it holds a comma, a double quote or a newline.
#[must_use]
pub fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[must_use]
pub fn pair_row(pair: &TermPair<'_>) -> String {
    let segments = pair
        .shared_segments
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("|");
    format!(
        "{},{:.6},{},{},{:.6},{},\"{}\",{}",
        escape_field(&pair.source.text),
        pair.source.score,
        pair.source.term_frequency,
        escape_field(&pair.target.text),
        pair.target.score,
        pair.target.term_frequency,
        segments,
        pair.co_occurrence()
    )
}

#[must_use]
pub fn term_row(term: &Term) -> String {
    format!(
        "{},{:.6},{}",
        escape_field(&term.text),
        term.score,
        term.term_frequency
    )
}

/// Encodes lines as UTF-16LE with a leading BOM, each line ending in '\n'.
#[must_use]
pub fn encode_utf16le<'a>(lines: impl IntoIterator<Item = &'a str>) -> Vec<u8> {
    let mut out = BOM.to_vec();
    for line in lines {
        for unit in line.encode_utf16().chain("\n".encode_utf16()) {
            out.extend_from_slice(&unit.to_le_bytes());
        }
    }
    out
}

pub fn write_pairs(path: &Path, pairs: &[TermPair<'_>]) -> Result<()> {
    let rows: Vec<String> = pairs.iter().map(pair_row).collect();
    write_lines(path, PAIR_HEADER, &rows)
}

pub fn write_terms(path: &Path, terms: &[Term]) -> Result<()> {
    let rows: Vec<String> = terms.iter().map(term_row).collect();
    write_lines(path, TERM_HEADER, &rows)
}

fn write_lines(path: &Path, header: &str, rows: &[String]) -> Result<()> {
    let bytes = encode_utf16le(std::iter::once(header).chain(rows.iter().map(String::as_str)));
    let file = File::create(path).map_err(|e| ExtractError::io(path, e))?;
    let mut w = BufWriter::new(file);
    w.write_all(&bytes).map_err(|e| ExtractError::io(path, e))?;
    w.flush().map_err(|e| ExtractError::io(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{encode_utf16le, escape_field, pair_row, term_row, write_pairs, PAIR_HEADER};
    use crate::align::TermPair;
    use crate::term::Term;

    fn decode(bytes: &[u8]) -> String {
        assert_eq!(&bytes[..2], &[0xFF, 0xFE]);
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        String::from_utf16(&units).expect("utf16")
    }

    #[test]
    fn escaping() {
        assert_eq!(escape_field("foo,bar"), "\"foo,bar\"");
        assert_eq!(escape_field("he said \"hi\""), "\"he said \"\"hi\"\"\"");
        assert_eq!(escape_field("line\nbreak"), "\"line\nbreak\"");
        assert_eq!(escape_field("plain"), "plain");
    }

    #[test]
    fn rows_use_fixed_six_decimals() {
        let mut src = Term::new("foo,bar", "foo,bar");
        src.score = 0.5;
        src.term_frequency = 3;
        let mut tgt = Term::new("chat", "chat");
        tgt.score = 1.0 / 3.0;
        tgt.term_frequency = 2;
        let pair = TermPair {
            source: &src,
            target: &tgt,
            shared_segments: BTreeSet::from([4, 1]),
        };
        assert_eq!(
            pair_row(&pair),
            "\"foo,bar\",0.500000,3,chat,0.333333,2,\"1|4\",2"
        );
        assert_eq!(term_row(&tgt), "chat,0.333333,2");
    }

    #[test]
    fn utf16_with_bom() {
        let bytes = encode_utf16le(["a,é"]);
        assert_eq!(bytes, vec![0xFF, 0xFE, b'a', 0, b',', 0, 0xE9, 0, b'\n', 0]);
    }

    #[test]
    fn empty_pair_list_writes_header_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.csv");
        write_pairs(&path, &[]).expect("write");
        let text = decode(&std::fs::read(&path).expect("read"));
        assert_eq!(text, format!("{PAIR_HEADER}\n"));
    }
}
