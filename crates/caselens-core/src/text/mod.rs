//! Text cleaning and chunking.

mod chunker;
mod cleaner;
pub mod patterns;

pub use chunker::{Chunker, DocumentText, PageSpan, PAGE_SEPARATOR};
pub use cleaner::{clean_text, TextCleaner};
