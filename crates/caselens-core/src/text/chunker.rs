//! Document assembly and overlap-aware chunking.
//!
//! All offsets in this module count Unicode scalar values, not bytes.

use std::iter;

use tracing::debug;

use super::patterns::SENTENCE_BREAK;
use crate::models::{Chunk, Limits, Page};

/// Separator placed between consecutive pages in the document text.
pub const PAGE_SEPARATOR: &str = "\n\n";

const PARAGRAPH_BREAK: &str = "\n\n";

/// Character range a page occupies in the document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpan {
    pub page_number: u32,
    pub start: usize,
    pub end: usize,
}

impl PageSpan {
    fn intersects(&self, start: usize, end: usize) -> bool {
        if self.start == self.end {
            self.start >= start && self.start < end
        } else {
            self.start < end && self.end > start
        }
    }
}

/// Cleaned pages joined into one text, with each page's span recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentText {
    text: String,
    spans: Vec<PageSpan>,
    char_len: usize,
}

impl DocumentText {
    /// Join pages in order with [`PAGE_SEPARATOR`].
    pub fn assemble(pages: &[Page]) -> Self {
        let mut text = String::new();
        let mut spans = Vec::with_capacity(pages.len());
        let mut offset = 0;

        for (i, page) in pages.iter().enumerate() {
            if i > 0 {
                text.push_str(PAGE_SEPARATOR);
                offset += PAGE_SEPARATOR.chars().count();
            }
            let len = page.text.chars().count();
            text.push_str(&page.text);
            spans.push(PageSpan {
                page_number: page.page_number,
                start: offset,
                end: offset + len,
            });
            offset += len;
        }

        Self {
            text,
            spans,
            char_len: offset,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length of the text in characters.
    pub fn char_len(&self) -> usize {
        self.char_len
    }

    pub fn spans(&self) -> &[PageSpan] {
        &self.spans
    }

    /// Whether the text holds nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Every page number, in order.
    pub fn page_numbers(&self) -> Vec<u32> {
        self.spans.iter().map(|s| s.page_number).collect()
    }

    /// Pages whose span intersects `[start, end)`.
    ///
    /// A range that falls entirely on a page separator is attributed to the
    /// nearest preceding page.
    pub fn pages_between(&self, start: usize, end: usize) -> Vec<u32> {
        let pages: Vec<u32> = self
            .spans
            .iter()
            .filter(|s| s.intersects(start, end))
            .map(|s| s.page_number)
            .collect();
        if !pages.is_empty() {
            return pages;
        }

        self.spans
            .iter()
            .rev()
            .find(|s| s.start <= start)
            .or_else(|| self.spans.first())
            .map(|s| vec![s.page_number])
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    Paragraph,
    Sentence,
    Hard,
    End,
}

/// Splits document text into bounded, overlapping chunks.
///
/// Each chunk after the first repeats up to `overlap_chars` characters from
/// the end of its predecessor. Cuts prefer a paragraph break, then a sentence
/// break, within the last `lookback_chars` characters before the size limit,
/// and fall back to a hard cut at the limit. Dropping each chunk's overlap
/// and concatenating reproduces the document text exactly.
#[derive(Debug, Clone)]
pub struct Chunker {
    max_chars: usize,
    overlap_chars: usize,
    lookback_chars: usize,
}

impl Chunker {
    /// Overlap is clamped below half of `max_chars`.
    pub fn new(max_chars: usize, overlap_chars: usize) -> Self {
        let max_chars = max_chars.max(1);
        Self {
            max_chars,
            overlap_chars: overlap_chars.min((max_chars - 1) / 2),
            lookback_chars: 2_000,
        }
    }

    pub fn from_limits(limits: &Limits) -> Self {
        Self::new(limits.chunk_max_chars, limits.chunk_overlap_chars)
            .with_lookback(limits.boundary_lookback_chars)
    }

    /// How far back from the size limit to search for a natural break.
    pub fn with_lookback(mut self, lookback_chars: usize) -> Self {
        self.lookback_chars = lookback_chars;
        self
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    pub fn overlap_chars(&self) -> usize {
        self.overlap_chars
    }

    /// Chunk the document. Blank text yields no chunks; text that fits in
    /// one chunk yields a single chunk attributed to every page.
    pub fn chunk(&self, doc: &DocumentText) -> Vec<Chunk> {
        if doc.is_blank() {
            return Vec::new();
        }

        let text = doc.text();
        let total = doc.char_len();
        if total <= self.max_chars {
            return vec![Chunk {
                chunk_index: 0,
                text: text.to_string(),
                char_count: total,
                overlap_chars: 0,
                source_pages: doc.page_numbers(),
            }];
        }

        let offsets: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(iter::once(text.len()))
            .collect();

        let mut chunks: Vec<Chunk> = Vec::new();
        let mut body_start = 0;
        loop {
            let overlap = if chunks.is_empty() {
                0
            } else {
                self.overlap_chars.min(body_start)
            };
            let start = body_start - overlap;
            let limit = start + self.max_chars;

            let (end, boundary) = if limit >= total {
                (total, Boundary::End)
            } else {
                self.find_break(text, &offsets, body_start, limit)
            };

            debug!(
                "Chunk {}: chars {}..{} ({:?} boundary, {} overlap)",
                chunks.len(),
                start,
                end,
                boundary,
                overlap
            );

            chunks.push(Chunk {
                chunk_index: chunks.len(),
                text: text[offsets[start]..offsets[end]].to_string(),
                char_count: end - start,
                overlap_chars: overlap,
                source_pages: doc.pages_between(start, end),
            });

            if end >= total {
                break;
            }
            body_start = end;
        }

        chunks
    }

    /// Find the cut for a chunk whose body starts at `body_start` and may not
    /// extend past `limit`. The cut is always after `body_start`.
    fn find_break(
        &self,
        text: &str,
        offsets: &[usize],
        body_start: usize,
        limit: usize,
    ) -> (usize, Boundary) {
        let window_start = (body_start + 1).max(limit.saturating_sub(self.lookback_chars));
        let base = offsets[window_start];
        let window = &text[base..offsets[limit]];

        if let Some(pos) = window.rfind(PARAGRAPH_BREAK) {
            let cut = base + pos + PARAGRAPH_BREAK.len();
            return (char_index(offsets, cut), Boundary::Paragraph);
        }

        if let Some(m) = SENTENCE_BREAK.find_iter(window).last() {
            // Cut just before the capital that opens the next sentence.
            let capital = m.as_str().chars().next_back().map_or(0, char::len_utf8);
            let cut = base + m.end() - capital;
            return (char_index(offsets, cut), Boundary::Sentence);
        }

        (limit, Boundary::Hard)
    }
}

fn char_index(offsets: &[usize], byte: usize) -> usize {
    offsets.partition_point(|&o| o < byte)
}
