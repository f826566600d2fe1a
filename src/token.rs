use std::collections::HashSet;

use crate::locale::Locale;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenTag {
    Number,
    Acronym,
    UpperCase,
    Unparsable,
    Parsable,
}

impl TokenTag {
    /// Tag for a single word. `begins_sentence` marks the first token of the
    /// first chunk, whose capital letter carries no information.
    #[must_use]
    pub fn classify(text: &str, begins_sentence: bool) -> Self {
        if is_number(text) {
            return Self::Number;
        }
        if is_acronym(text) {
            return Self::Acronym;
        }
        if is_unparsable(text) {
            return Self::Unparsable;
        }
        let starts_upper = text.chars().next().is_some_and(char::is_uppercase);
        if starts_upper && !begins_sentence {
            return Self::UpperCase;
        }
        Self::Parsable
    }

    #[must_use]
    pub fn is_relatable(self) -> bool {
        matches!(self, Self::Acronym | Self::UpperCase | Self::Parsable)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub lower: String,
    pub tag: TokenTag,
    pub stopword: bool,
}

impl Token {
    /// Lowercases `text` for `locale` and flags it when the key is in `stopwords`.
    pub fn new(
        text: &str,
        locale: &Locale,
        stopwords: &HashSet<String>,
        begins_sentence: bool,
    ) -> Self {
        let lower = locale.lowercase(text);
        Self {
            text: text.to_string(),
            tag: TokenTag::classify(text, begins_sentence),
            stopword: stopwords.contains(&lower),
            lower,
        }
    }

    #[must_use]
    pub fn is_relatable(&self) -> bool {
        self.tag.is_relatable()
    }
}

fn is_number(text: &str) -> bool {
    !text.is_empty() && text.chars().all(char::is_numeric)
}

fn is_acronym(text: &str) -> bool {
    text.chars().count() >= 2 && text.chars().all(char::is_uppercase)
}

fn is_unparsable(text: &str) -> bool {
    let mut digits = false;
    let mut letters = false;
    for ch in text.chars() {
        if ch.is_numeric() {
            digits = true;
        } else if ch.is_alphabetic() {
            letters = true;
        } else {
            return true;
        }
    }
    digits && letters
}
