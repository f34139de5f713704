//! Cyrillic → Latin transliteration.
//!
//! Letter-by-letter substitution against a fixed lowercase table. Anything
//! not in the table (uppercase Cyrillic, digits, punctuation, Latin) passes
//! through untouched.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    static ref CYRILLIC: Regex = Regex::new(r"\p{Cyrillic}").unwrap();
}

/// Default substitution table. `я` and `а` both map to `a`.
pub const DEFAULT_CYRILLIC_MAP: &[(char, &str)] = &[
    ('а', "a"), ('б', "b"), ('в', "v"), ('г', "g"), ('д', "d"),
    ('е', "e"), ('ё', "e"), ('ж', "zh"), ('з', "z"), ('и', "i"),
    ('і', "i"), ('й', "y"), ('к', "k"), ('л', "l"), ('м', "m"),
    ('н', "n"), ('о', "o"), ('п', "p"), ('р', "r"), ('с', "s"),
    ('т', "t"), ('у', "u"), ('ф', "f"), ('х', "h"), ('ц', "ts"),
    ('ч', "ch"), ('ш', "sh"), ('щ', "sht"), ('ъ', "u"), ('ы', "y"),
    ('ь', "y"), ('э', "e"), ('ю', "yu"), ('я', "a"),
];

/// True if `text` contains any Cyrillic character, upper or lower case.
pub fn has_cyrillic(text: &str) -> bool {
    CYRILLIC.is_match(text)
}

/// Immutable Cyrillic → Latin mapping.
#[derive(Debug, Clone)]
pub struct Transliterator {
    map: HashMap<char, String>,
}

impl Transliterator {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (char, S)>,
        S: Into<String>,
    {
        Self {
            map: entries.into_iter().map(|(c, s)| (c, s.into())).collect(),
        }
    }

    pub fn transliterate(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            match self.map.get(&c) {
                Some(latin) => out.push_str(latin),
                None => out.push(c),
            }
        }
        out
    }

    /// Latin replacement for a single character, if the table has one.
    pub fn lookup(&self, c: char) -> Option<&str> {
        self.map.get(&c).map(String::as_str)
    }
}

impl Default for Transliterator {
    fn default() -> Self {
        Self::new(DEFAULT_CYRILLIC_MAP.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_transliteration() {
        let t = Transliterator::default();
        assert_eq!(t.transliterate("москва"), "moskva");
        assert_eq!(t.transliterate("ленина"), "lenina");
    }

    #[test]
    fn test_multi_char_expansions() {
        let t = Transliterator::default();
        assert_eq!(t.transliterate("щ"), "sht");
        assert_eq!(t.transliterate("ж"), "zh");
        assert_eq!(t.transliterate("ц"), "ts");
        assert_eq!(t.transliterate("ю"), "yu");
    }

    #[test]
    fn test_ya_collapses_to_a() {
        let t = Transliterator::default();
        assert_eq!(t.transliterate("я"), t.transliterate("а"));
    }

    #[test]
    fn test_passthrough_of_unmapped() {
        let t = Transliterator::default();
        // uppercase Cyrillic is outside the table
        assert_eq!(t.transliterate("Москва 12, ул."), "Мoskva 12, ul.");
    }

    #[test]
    fn test_identity_without_cyrillic() {
        let t = Transliterator::default();
        for s in ["123 main st, springfield", "", "Straße 5", "!?.,"] {
            assert!(!has_cyrillic(s));
            assert_eq!(t.transliterate(s), s);
        }
    }

    #[test]
    fn test_expansion_matches_table() {
        let t = Transliterator::default();
        for (c, latin) in DEFAULT_CYRILLIC_MAP {
            let out = t.transliterate(&c.to_string());
            assert_eq!(out, *latin);
            assert!((1..=3).contains(&out.chars().count()), "{} -> {}", c, out);
        }
    }

    #[test]
    fn test_has_cyrillic() {
        assert!(has_cyrillic("ул. Ленина"));
        assert!(has_cyrillic("МОСКВА"));
        assert!(has_cyrillic("main ж"));
        assert!(!has_cyrillic("main street"));
    }

    #[test]
    fn test_custom_table() {
        let t = Transliterator::new(vec![('x', "ks")]);
        assert_eq!(t.transliterate("box"), "boks");
        assert_eq!(t.lookup('x'), Some("ks"));
        assert_eq!(t.lookup('а'), None);
    }
}
