//! AskPDF Extraction Library
//!
//! Turns an uploaded PDF into an ordered sequence of page texts. This is
//! the document-side collaborator of the QA engine: extraction failures are
//! the only hard failures a question can hit, everything downstream
//! degrades softly.

pub mod errors;
pub mod pdf;

pub use errors::ExtractionError;
pub use pdf::{extract_pages, PageText};
