//! Address normalization.
//!
//! A raw address is lower-cased and split on `", "` into up to four
//! positional sections: street, city, country, extra. Each section is
//! canonicalized on its own and the survivors are joined back with `", "`.
//!
//! Sections are positional: if the city is missing but a country is
//! present, the country is treated as the city.

pub mod tables;

pub use tables::{NormalizationTables, StreetTypeRule};

use crate::translit::{has_cyrillic, Transliterator};
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

lazy_static! {
    static ref NUMBER: Regex = Regex::new(r"[0-9]+").unwrap();
    static ref NUMERIC_TOKEN: Regex = Regex::new(r"^[0-9]+$").unwrap();
}

const SECTION_DELIMITER: &str = ", ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Street,
    City,
    Country,
    Extra,
}

impl SectionKind {
    const ORDER: [SectionKind; 4] = [Self::Street, Self::City, Self::Country, Self::Extra];
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Street => write!(f, "street"),
            Self::City => write!(f, "city"),
            Self::Country => write!(f, "country"),
            Self::Extra => write!(f, "extra"),
        }
    }
}

/// Why a section was left out of the normalized address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OmitReason {
    /// No house number in the street, or no all-digit token elsewhere.
    MissingNumber,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionOutcome {
    Kept { kind: SectionKind, text: String },
    Omitted { kind: SectionKind, reason: OmitReason },
}

impl SectionOutcome {
    pub fn kind(&self) -> SectionKind {
        match self {
            Self::Kept { kind, .. } | Self::Omitted { kind, .. } => *kind,
        }
    }
}

/// Result of normalizing one address, section by section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedAddress {
    pub sections: Vec<SectionOutcome>,
    pub text: String,
}

impl NormalizedAddress {
    pub fn section(&self, kind: SectionKind) -> Option<&SectionOutcome> {
        self.sections.iter().find(|s| s.kind() == kind)
    }

    pub fn kept(&self, kind: SectionKind) -> Option<&str> {
        match self.section(kind)? {
            SectionOutcome::Kept { text, .. } => Some(text),
            SectionOutcome::Omitted { .. } => None,
        }
    }

    pub fn omitted(&self) -> impl Iterator<Item = (SectionKind, OmitReason)> + '_ {
        self.sections.iter().filter_map(|s| match s {
            SectionOutcome::Omitted { kind, reason } => Some((*kind, *reason)),
            SectionOutcome::Kept { .. } => None,
        })
    }
}

pub struct AddressNormalizer {
    transliterator: Transliterator,
    street_rules: Vec<StreetTypeRule>,
}

impl AddressNormalizer {
    pub fn new(tables: NormalizationTables) -> Self {
        Self {
            transliterator: Transliterator::new(tables.cyrillic),
            street_rules: tables.street_rules,
        }
    }

    pub fn transliterator(&self) -> &Transliterator {
        &self.transliterator
    }

    /// Normalize a raw address into its canonical string form.
    pub fn normalize(&self, raw_address: &str) -> String {
        self.analyze(raw_address).text
    }

    /// Normalize and keep the per-section outcomes.
    pub fn analyze(&self, raw_address: &str) -> NormalizedAddress {
        let lowered = raw_address.to_lowercase();
        let sections: Vec<SectionOutcome> = lowered
            .splitn(SectionKind::ORDER.len(), SECTION_DELIMITER)
            .zip(SectionKind::ORDER)
            .map(|(part, kind)| {
                let result = match kind {
                    SectionKind::Street => self.normalize_street(part),
                    _ => self.normalize_locality(part),
                };
                match result {
                    Ok(text) => SectionOutcome::Kept { kind, text },
                    Err(reason) => SectionOutcome::Omitted { kind, reason },
                }
            })
            .collect();

        let kept: Vec<&str> = sections
            .iter()
            .filter_map(|s| match s {
                SectionOutcome::Kept { text, .. } => Some(text.as_str()),
                SectionOutcome::Omitted { .. } => None,
            })
            .collect();

        let text = if kept.is_empty() {
            collapse_whitespace(&self.transliterator.transliterate(&lowered))
        } else {
            kept.join(SECTION_DELIMITER)
        };

        NormalizedAddress { sections, text }
    }

    fn normalize_street(&self, section: &str) -> Result<String, OmitReason> {
        if section.trim().is_empty() {
            return Err(OmitReason::Empty);
        }
        let cyrillic = has_cyrillic(section);
        let section = if cyrillic {
            self.transliterator.transliterate(section)
        } else {
            section.to_string()
        };
        let numbered = move_number_to_end(&section)?;
        Ok(self.canonicalize_street_type(numbered, cyrillic))
    }

    /// Apply every rule set once; the first matching token of a set is
    /// replaced by that set's canonical form, moved to the front.
    fn canonicalize_street_type(&self, mut section: String, cyrillic: bool) -> String {
        for rule in &self.street_rules {
            let Some((index, token)) = rule.find_in(&section) else {
                continue;
            };
            let canonical = if cyrillic || index == 1 {
                rule.latin_form()
            } else {
                rule.transliterated_form()
            };
            let rest = section.replacen(token, " ", 1);
            section = collapse_whitespace(&format!("{} {}", canonical, rest));
        }
        section
    }

    fn normalize_locality(&self, section: &str) -> Result<String, OmitReason> {
        if section.trim().is_empty() {
            return Err(OmitReason::Empty);
        }
        if has_cyrillic(section) {
            move_trailing_token_to_end(&self.transliterator.transliterate(section))
        } else {
            move_trailing_token_to_end(section)
        }
    }
}

impl Default for AddressNormalizer {
    fn default() -> Self {
        Self::new(NormalizationTables::default())
    }
}

/// Cut the first run of digits out of `section` and re-append it at the end.
fn move_number_to_end(section: &str) -> Result<String, OmitReason> {
    let m = NUMBER.find(section).ok_or(OmitReason::MissingNumber)?;
    let rest = collapse_whitespace(&format!("{} {}", &section[..m.start()], &section[m.end()..]));
    if rest.is_empty() {
        Ok(m.as_str().to_string())
    } else {
        Ok(format!("{} {}", rest, m.as_str()))
    }
}

/// Move the last all-digit token (postal or country code) to the end.
fn move_trailing_token_to_end(section: &str) -> Result<String, OmitReason> {
    let mut tokens: Vec<&str> = section.split_whitespace().collect();
    let at = tokens
        .iter()
        .rposition(|t| NUMERIC_TOKEN.is_match(t))
        .ok_or(OmitReason::MissingNumber)?;
    let code = tokens.remove(at);
    tokens.push(code);
    Ok(tokens.join(" "))
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
