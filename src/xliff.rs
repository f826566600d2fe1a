use std::path::Path;

use encoding_rs::{Encoding, UTF_8};
use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{ExtractError, Result};

/// One translation unit that survived ingestion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub number: usize,
    pub source: String,
    pub target: String,
}

#[derive(Clone, Debug, Default)]
struct RawSegment {
    state: String,
    source: Option<String>,
    target: Option<String>,
}

#[derive(Clone, Debug)]
pub struct XliffDocument {
    pub src_lang: String,
    pub trg_lang: String,
    segments: Vec<RawSegment>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Source,
    Target,
}

struct Capture {
    side: Side,
    depth: usize,
    text: String,
}

impl XliffDocument {
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| ExtractError::io(path, e))?;
        Self::parse(&bytes)
    }

    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let text = decode_document(bytes);
        let mut reader = Reader::from_str(&text);
        reader.config_mut().trim_text(false);

        let mut stack: Vec<String> = Vec::new();
        let mut root_seen = false;
        let mut src_lang = String::from("en");
        let mut trg_lang = String::from("en");
        let mut segments: Vec<RawSegment> = Vec::new();
        let mut current: Option<(usize, RawSegment)> = None;
        let mut capture: Option<Capture> = None;

        loop {
            let ev = reader
                .read_event()
                .map_err(|e| ExtractError::Format(format!("read xml event: {e}")))?;
            match ev {
                Event::Eof => break,
                Event::Start(s) => {
                    let name = local_name(&s);
                    if root_seen {
                        open_element(&s, &name, &stack, &mut current, &mut capture)?;
                    } else {
                        root_seen = true;
                        read_root(&s, &mut src_lang, &mut trg_lang)?;
                    }
                    stack.push(name);
                }
                Event::Empty(s) => {
                    if !root_seen {
                        root_seen = true;
                        read_root(&s, &mut src_lang, &mut trg_lang)?;
                        continue;
                    }
                    let name = local_name(&s);
                    open_element(&s, &name, &stack, &mut current, &mut capture)?;
                    stack.push(name);
                    close_element(&stack, &mut current, &mut capture, &mut segments);
                    stack.pop();
                }
                Event::End(_) => {
                    close_element(&stack, &mut current, &mut capture, &mut segments);
                    stack.pop();
                }
                Event::Text(t) => {
                    if let Some(cap) = capture.as_mut() {
                        if inline_path(&stack, cap.depth) {
                            let txt = t
                                .unescape()
                                .map_err(|e| ExtractError::Format(format!("unescape text: {e}")))?;
                            cap.text.push_str(&txt);
                        }
                    }
                }
                Event::CData(t) => {
                    if let Some(cap) = capture.as_mut() {
                        if inline_path(&stack, cap.depth) {
                            cap.text.push_str(&String::from_utf8_lossy(&t.into_inner()));
                        }
                    }
                }
                _ => {}
            }
        }

        if !root_seen {
            return Err(ExtractError::Format("document has no root element".into()));
        }
        debug!("parsed {} segments ({src_lang} -> {trg_lang})", segments.len());
        Ok(Self {
            src_lang,
            trg_lang,
            segments,
        })
    }

    /// Segments whose state is `final` and whose source and target are both non-blank.
    #[must_use]
    pub fn final_pairs(&self) -> Vec<Segment> {
        let mut out = Vec::new();
        for raw in &self.segments {
            if raw.state != "final" {
                continue;
            }
            let (Some(source), Some(target)) = (raw.source.as_ref(), raw.target.as_ref()) else {
                continue;
            };
            if source.trim().is_empty() || target.trim().is_empty() {
                continue;
            }
            out.push(Segment {
                number: out.len(),
                source: source.clone(),
                target: target.clone(),
            });
        }
        out
    }

    /// Every segment with a non-blank source, regardless of state or target.
    #[must_use]
    pub fn source_segments(&self) -> Vec<Segment> {
        let mut out = Vec::new();
        for raw in &self.segments {
            let Some(source) = raw.source.as_ref() else {
                continue;
            };
            if source.trim().is_empty() {
                continue;
            }
            out.push(Segment {
                number: out.len(),
                source: source.clone(),
                target: raw.target.clone().unwrap_or_default(),
            });
        }
        out
    }
}

fn read_root(s: &BytesStart<'_>, src_lang: &mut String, trg_lang: &mut String) -> Result<()> {
    check_root(s)?;
    if let Some(v) = attr(s, "srcLang")? {
        *src_lang = v;
    }
    if let Some(v) = attr(s, "trgLang")? {
        *trg_lang = v;
    }
    Ok(())
}

fn open_element(
    s: &BytesStart<'_>,
    name: &str,
    stack: &[String],
    current: &mut Option<(usize, RawSegment)>,
    capture: &mut Option<Capture>,
) -> Result<()> {
    if name == "segment" && current.is_none() {
        let state = attr(s, "state")?.unwrap_or_default();
        *current = Some((
            stack.len(),
            RawSegment {
                state,
                ..RawSegment::default()
            },
        ));
        return Ok(());
    }
    if let Some((seg_depth, _)) = current.as_ref() {
        if capture.is_none() && stack.len() == seg_depth + 1 {
            let side = match name {
                "source" => Some(Side::Source),
                "target" => Some(Side::Target),
                _ => None,
            };
            if let Some(side) = side {
                *capture = Some(Capture {
                    side,
                    depth: stack.len(),
                    text: String::new(),
                });
            }
        }
    }
    Ok(())
}

fn close_element(
    stack: &[String],
    current: &mut Option<(usize, RawSegment)>,
    capture: &mut Option<Capture>,
    segments: &mut Vec<RawSegment>,
) {
    let depth = stack.len().saturating_sub(1);
    if let Some(cap) = capture.as_ref() {
        if cap.depth == depth {
            if let (Some(cap), Some((_, seg))) = (capture.take(), current.as_mut()) {
                let slot = match cap.side {
                    Side::Source => &mut seg.source,
                    Side::Target => &mut seg.target,
                };
                if slot.is_none() {
                    *slot = Some(cap.text);
                }
            }
            return;
        }
    }
    if let Some((seg_depth, _)) = current.as_ref() {
        if *seg_depth == depth {
            if let Some((_, seg)) = current.take() {
                segments.push(seg);
            }
        }
    }
}

// Text counts when every element between the captured source/target and the
// current position is inline `pc`/`mrk` markup.
fn inline_path(stack: &[String], capture_depth: usize) -> bool {
    stack
        .iter()
        .skip(capture_depth + 1)
        .all(|n| n == "pc" || n == "mrk")
}

fn check_root(s: &BytesStart<'_>) -> Result<()> {
    let name = local_name(s);
    let version = attr(s, "version")?.unwrap_or_default();
    if name != "xliff" || !version.starts_with("2.") {
        return Err(ExtractError::Format(
            "selected file is not an XLIFF 2.x document".into(),
        ));
    }
    Ok(())
}

fn local_name(s: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(s.local_name().as_ref()).into_owned()
}

fn attr(s: &BytesStart<'_>, key: &str) -> Result<Option<String>> {
    for a in s.attributes() {
        let a = a.map_err(|e| ExtractError::Format(format!("attribute: {e}")))?;
        if a.key.local_name().as_ref() == key.as_bytes() {
            let v = a
                .unescape_value()
                .map_err(|e| ExtractError::Format(format!("attribute value: {e}")))?;
            return Ok(Some(v.into_owned()));
        }
    }
    Ok(None)
}

fn decode_document(bytes: &[u8]) -> String {
    let (encoding, bom_len) = Encoding::for_bom(bytes).unwrap_or((UTF_8, 0));
    let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::XliffDocument;

    const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xliff xmlns="urn:oasis:names:tc:xliff:document:2.0" version="2.1" srcLang="en-US" trgLang="fr">
  <file id="f1">
    <unit id="u1">
      <segment state="final">
        <source>Open the <pc id="1">main <mrk id="m1">menu</mrk></pc> now<ph id="2"/>.</source>
        <target>Ouvrez le menu principal.</target>
      </segment>
    </unit>
    <unit id="u2">
      <segment state="translated">
        <source>Draft text</source>
        <target>Texte brouillon</target>
      </segment>
    </unit>
    <unit id="u3">
      <segment state="final">
        <source>Only source</source>
      </segment>
    </unit>
    <group id="g">
      <unit id="u4">
        <segment state="final">
          <source>Save &amp; close</source>
          <target>Enregistrer et fermer</target>
        </segment>
      </unit>
    </group>
    <unit id="u5">
      <segment state="final">
        <source>   </source>
        <target>vide</target>
      </segment>
    </unit>
  </file>
</xliff>"#;

    #[test]
    fn final_pairs_are_numbered_in_document_order() {
        let doc = XliffDocument::parse(DOC.as_bytes()).expect("parse");
        assert_eq!(doc.src_lang, "en-US");
        assert_eq!(doc.trg_lang, "fr");
        let pairs = doc.final_pairs();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].number, 0);
        assert_eq!(pairs[0].source, "Open the main menu now.");
        assert_eq!(pairs[1].number, 1);
        assert_eq!(pairs[1].source, "Save & close");
        assert_eq!(pairs[1].target, "Enregistrer et fermer");
    }

    #[test]
    fn source_segments_ignore_state() {
        let doc = XliffDocument::parse(DOC.as_bytes()).expect("parse");
        let segs = doc.source_segments();
        let texts: Vec<&str> = segs.iter().map(|s| s.source.as_str()).collect();
        assert_eq!(
            texts,
            vec!["Open the main menu now.", "Draft text", "Only source", "Save & close"]
        );
    }

    #[test]
    fn rejects_xliff_1() {
        let doc = r#"<xliff version="1.2"><file/></xliff>"#;
        assert!(XliffDocument::parse(doc.as_bytes()).is_err());
        let doc = r#"<html version="2.0"/>"#;
        assert!(XliffDocument::parse(doc.as_bytes()).is_err());
    }

    #[test]
    fn decodes_utf16_with_bom() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in DOC.replace("UTF-8", "UTF-16").encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let doc = XliffDocument::parse(&bytes).expect("parse utf16");
        assert_eq!(doc.final_pairs().len(), 2);
    }
}
