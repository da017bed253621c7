//! Regex patterns for boilerplate in English and French legal documents.
//!
//! Line patterns are matched against a single line that has already been
//! trimmed and had its inner whitespace collapsed.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Bates stamps at either edge of a line: PREFIX-000123 (2-10 capitals, 6-10 digits)
    pub static ref BATES_STAMP: Regex = Regex::new(
        r"(?m)^[^\S\n]*[A-Z]{2,10}[- ]\d{6,10}\b|\b[A-Z]{2,10}[- ]\d{6,10}[^\S\n]*$"
    ).unwrap();

    // Page numbers on their own line: "42", "- 12 -", "Page 5", "Page 3 of 10", "3 de 10", "Page 2 sur 7"
    pub static ref PAGE_NUMBER_LINE: Regex = Regex::new(
        r"^[-\u{2013}\u{2014}]? ?(?:[Pp]age )?\d{1,5}(?: (?:of|de|sur) \d{1,5})? ?[-\u{2013}\u{2014}]?$"
    ).unwrap();

    // Confidentiality footers (English)
    pub static ref CONFIDENTIAL_EN: Regex = Regex::new(
        r"(?i)^(?:(?:PRIVILEGED AND )?CONFIDENTIAL(?: ?[-\u{2013}\u{2014}] ?.*)?|ATTORNEY[ -]CLIENT PRIVILEGED?|ATTORNEY WORK PRODUCT|DO NOT DISTRIBUTE|FOR SETTLEMENT PURPOSES ONLY)$"
    ).unwrap();

    // Confidentiality footers (French)
    pub static ref CONFIDENTIAL_FR: Regex = Regex::new(
        r"(?i)^(?:CONFIDENTIEL(?:LE)?|PROT[EÉ]G[EÉ]E? PAR LE SECRET PROFESSIONNEL|NE PAS DISTRIBUER)$"
    ).unwrap();

    // Separator rules: ===, ---, ___
    pub static ref SEPARATOR_LINE: Regex = Regex::new(
        r"^[=_\-]{3,}$"
    ).unwrap();

    // Any whitespace run that does not contain a newline
    pub static ref HORIZONTAL_SPACE: Regex = Regex::new(
        r"[^\S\n]+"
    ).unwrap();

    pub static ref EXCESS_NEWLINES: Regex = Regex::new(
        r"\n{3,}"
    ).unwrap();

    // End of sentence followed by the capital that starts the next one
    pub static ref SENTENCE_BREAK: Regex = Regex::new(
        r#"[.!?]["'\u{2019}\u{201d})\]]*\s+\p{Lu}"#
    ).unwrap();
}

/// Whether a normalized line is removable boilerplate.
pub fn is_boilerplate_line(line: &str) -> bool {
    !line.is_empty()
        && (PAGE_NUMBER_LINE.is_match(line)
            || CONFIDENTIAL_EN.is_match(line)
            || CONFIDENTIAL_FR.is_match(line)
            || SEPARATOR_LINE.is_match(line))
}
