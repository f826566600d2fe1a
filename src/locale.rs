/// Language tag reduced to what term keying needs: the primary language subtag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Locale {
    tag: String,
    language: String,
}

impl Locale {
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim();
        let language = tag
            .split(['-', '_'])
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();
        Self {
            tag: tag.to_string(),
            language,
        }
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    fn dotted_i(&self) -> bool {
        self.language == "tr" || self.language == "az"
    }

    #[must_use]
    pub fn lowercase(&self, text: &str) -> String {
        if !self.dotted_i() {
            return text.to_lowercase();
        }
        let mut out = String::with_capacity(text.len());
        for ch in text.chars() {
            match ch {
                'I' => out.push('ı'),
                'İ' => out.push('i'),
                _ => out.extend(ch.to_lowercase()),
            }
        }
        out
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::from_tag("en")
    }
}

#[cfg(test)]
mod tests {
    use super::Locale;

    #[test]
    fn language_subtag_is_lowercased() {
        let l = Locale::from_tag("TR-tr");
        assert_eq!(l.tag(), "TR-tr");
        assert_eq!(l.lowercase("I"), "ı");
    }

    #[test]
    fn turkish_dotless_i() {
        let tr = Locale::from_tag("tr-TR");
        assert_eq!(tr.lowercase("ISTANBUL"), "ıstanbul");
        assert_eq!(tr.lowercase("İzmir"), "izmir");
        assert_eq!(Locale::from_tag("en").lowercase("ISTANBUL"), "istanbul");
    }
}
