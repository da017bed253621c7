//! Boilerplate removal and whitespace normalization.

use std::borrow::Cow;

use tracing::trace;

use super::patterns::{is_boilerplate_line, BATES_STAMP, EXCESS_NEWLINES, HORIZONTAL_SPACE};
use crate::models::Page;

/// Strips repetitive legal boilerplate from extracted text.
///
/// Removes Bates stamps, standalone page numbers, English and French
/// confidentiality footers and separator rules, then collapses whitespace.
/// Cleaning is idempotent: `clean(clean(x)) == clean(x)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCleaner;

impl TextCleaner {
    pub fn new() -> Self {
        Self
    }

    /// Clean a block of text.
    pub fn clean(&self, text: &str) -> String {
        let mut current = clean_pass(text);
        // After the first pass any further change strictly shortens the text,
        // so this reaches a fixed point.
        loop {
            let next = clean_pass(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    /// Clean every page in place, keeping page numbers.
    pub fn clean_pages(&self, pages: Vec<Page>) -> Vec<Page> {
        pages
            .into_iter()
            .map(|page| {
                let text = self.clean(&page.text);
                trace!(
                    "Cleaned page {}: {} -> {} chars",
                    page.page_number,
                    page.text.chars().count(),
                    text.chars().count()
                );
                Page::new(page.page_number, text)
            })
            .collect()
    }
}

/// Clean a block of text with the default cleaner.
pub fn clean_text(text: &str) -> String {
    TextCleaner.clean(text)
}

fn clean_pass(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace(['\r', '\u{c}'], "\n");
    let text = BATES_STAMP.replace_all(&text, "");

    let lines: Vec<Cow<'_, str>> = text
        .split('\n')
        .map(|line| {
            let collapsed = HORIZONTAL_SPACE.replace_all(line, " ");
            let trimmed = collapsed.trim();
            if is_boilerplate_line(trimmed) {
                Cow::Borrowed("")
            } else {
                Cow::Owned(trimmed.to_string())
            }
        })
        .collect();

    let joined = lines.join("\n");
    EXCESS_NEWLINES
        .replace_all(&joined, "\n\n")
        .trim()
        .to_string()
}
