//! Normalization tables: street-type synonym sets and the transliteration map.

use crate::translit::DEFAULT_CYRILLIC_MAP;

/// A set of synonymous street-type tokens.
///
/// Tokens are matched as plain substrings of the lower-cased section, so
/// trailing spaces and dots are significant. Position 1 holds the Latin
/// canonical form, position 0 the transliterated canonical form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreetTypeRule {
    tokens: Vec<String>,
}

impl StreetTypeRule {
    /// Build a rule. Returns `None` for fewer than two tokens, since both
    /// canonical slots must exist.
    pub fn new<I, S>(tokens: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        if tokens.len() < 2 || tokens.iter().any(|t| t.is_empty()) {
            return None;
        }
        Some(Self { tokens })
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// First token (in table order) found inside `section`, with its index.
    pub fn find_in(&self, section: &str) -> Option<(usize, &str)> {
        self.tokens
            .iter()
            .enumerate()
            .find(|(_, t)| section.contains(t.as_str()))
            .map(|(i, t)| (i, t.as_str()))
    }

    pub fn transliterated_form(&self) -> &str {
        &self.tokens[0]
    }

    pub fn latin_form(&self) -> &str {
        &self.tokens[1]
    }
}

const DEFAULT_STREET_RULES: &[&[&str]] = &[
    &["street ", "ul.", "str.", "ul ", "str ", "ulitsa"],
    &["avenue ", "ave.", "ave "],
    &["boulevard ", "bul.", "blvd.", "boulevard  ", "bulevard "],
    &["road ", "rd.", "rd "],
    &["lane ", "ln.", "ln "],
    &["drive ", "dr.", "dr "],
    &["place ", "pl.", "pl "],
    &["court ", "ct.", "ct "],
    &["terrace ", "ter.", "ter "],
    &["parkway ", "pkwy.", "pkwy "],
];

/// Immutable configuration consumed by the normalizer.
#[derive(Debug, Clone)]
pub struct NormalizationTables {
    pub cyrillic: Vec<(char, String)>,
    pub street_rules: Vec<StreetTypeRule>,
}

impl Default for NormalizationTables {
    fn default() -> Self {
        Self {
            cyrillic: DEFAULT_CYRILLIC_MAP
                .iter()
                .map(|(c, s)| (*c, s.to_string()))
                .collect(),
            street_rules: DEFAULT_STREET_RULES
                .iter()
                .filter_map(|set| StreetTypeRule::new(set.iter().copied()))
                .collect(),
        }
    }
}
