//! PDF text extraction module
//!
//! Extracts page-indexed text content from PDF files using lopdf. Page
//! numbers are 1-based and sequential; a page whose content stream cannot
//! be decoded yields empty text rather than shifting the numbering of the
//! pages after it.

use crate::errors::ExtractionError;
use std::path::Path;
use tracing::{debug, warn};

/// One page of extracted text
#[derive(Debug, Clone)]
pub struct PageText {
    /// 1-based page number
    pub page_number: u32,
    /// Cleaned text content (may be empty for image-only pages)
    pub text: String,
}

/// Extract text from every page of a PDF file
pub fn extract_pages(path: &Path) -> Result<Vec<PageText>, ExtractionError> {
    if !path.exists() {
        return Err(ExtractionError::FileNotFound(path.display().to_string()));
    }

    let doc = lopdf::Document::load(path).map_err(|e| ExtractionError::PdfParseError {
        path: path.display().to_string(),
        message: format!("Failed to load PDF: {}", e),
    })?;

    let page_ids: Vec<_> = doc.page_iter().collect();

    debug!(page_count = page_ids.len(), "Extracting text from PDF");

    let mut pages = Vec::with_capacity(page_ids.len());

    for (index, page_id) in page_ids.into_iter().enumerate() {
        let page_number = (index + 1) as u32;

        let text = match doc.get_page_content(page_id) {
            Ok(content) => clean_text(&extract_text_from_content(&content)),
            Err(e) => {
                warn!(page = page_number, error = %e, "Failed to extract text from page, emitting empty page");
                String::new()
            }
        };

        pages.push(PageText { page_number, text });
    }

    if pages.iter().all(|p| p.text.trim().is_empty()) {
        return Err(ExtractionError::PdfParseError {
            path: path.display().to_string(),
            message: "No text content extracted from PDF".to_string(),
        });
    }

    debug!(
        page_count = pages.len(),
        total_chars = pages.iter().map(|p| p.text.len()).sum::<usize>(),
        "Text extraction complete"
    );

    Ok(pages)
}

/// Extract text from a PDF content stream
fn extract_text_from_content(content: &[u8]) -> String {
    // Simple text extraction - looks for text between BT and ET operators
    let content_str = String::from_utf8_lossy(content);
    let mut text = String::new();
    let mut in_text_block = false;
    let mut current_text = String::new();

    for line in content_str.lines() {
        let trimmed = line.trim();

        if trimmed == "BT" {
            in_text_block = true;
            continue;
        }

        if trimmed == "ET" {
            in_text_block = false;
            if !current_text.is_empty() {
                text.push_str(&current_text);
                text.push('\n');
                current_text.clear();
            }
            continue;
        }

        if in_text_block {
            // Look for text showing operators: Tj, TJ, ', "
            if let Some(text_content) = extract_text_from_operator(trimmed) {
                current_text.push_str(&text_content);
            }
        }
    }

    text
}

/// Extract text from a PDF text operator
fn extract_text_from_operator(line: &str) -> Option<String> {
    // Handle (text) Tj operator
    if line.ends_with("Tj") || line.ends_with("'") || line.ends_with("\"") {
        if let Some(start) = line.find('(') {
            if let Some(end) = line.rfind(')') {
                let text = &line[start + 1..end];
                return Some(decode_pdf_string(text));
            }
        }
    }

    // Handle [(text) num (text) num] TJ operator (array of text)
    if line.ends_with("TJ") {
        let mut result = String::new();
        let mut in_paren = false;
        let mut current = String::new();

        for ch in line.chars() {
            match ch {
                '(' => {
                    in_paren = true;
                }
                ')' => {
                    in_paren = false;
                    result.push_str(&decode_pdf_string(&current));
                    current.clear();
                }
                _ if in_paren => {
                    current.push(ch);
                }
                _ => {}
            }
        }

        if !result.is_empty() {
            return Some(result);
        }
    }

    None
}

/// Decode PDF string escapes
fn decode_pdf_string(s: &str) -> String {
    let mut result = String::new();
    let mut chars = s.chars();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('r') => result.push('\r'),
                Some('t') => result.push('\t'),
                Some('\\') => result.push('\\'),
                Some('(') => result.push('('),
                Some(')') => result.push(')'),
                Some(c) => result.push(c),
                None => {}
            }
        } else {
            result.push(ch);
        }
    }

    result
}

/// Clean one page of extracted text.
///
/// Collapses runs of spaces and tabs but keeps line breaks: the chunker
/// prefers newline boundaries, so they carry structure worth preserving.
fn clean_text(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());

    for (i, line) in text.lines().enumerate() {
        if i > 0 {
            cleaned.push('\n');
        }
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        cleaned.push_str(&collapsed);
    }

    cleaned
        // Remove BOM artifacts
        .replace('\u{FEFF}', "")
        // Normalize quotes
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_collapses_spaces() {
        let input = "Hello   World\nSecond\t\tline";
        let cleaned = clean_text(input);
        assert_eq!(cleaned, "Hello World\nSecond line");
    }

    #[test]
    fn test_decode_pdf_string() {
        assert_eq!(decode_pdf_string("Hello\\nWorld"), "Hello\nWorld");
        assert_eq!(decode_pdf_string("Test\\(paren\\)"), "Test(paren)");
    }

    #[test]
    fn test_extract_text_from_content_stream() {
        let content = b"BT\n(Hello) Tj\n(World) Tj\nET\nBT\n[(Second) -250 (page line)] TJ\nET\n";
        let text = extract_text_from_content(content);
        assert_eq!(text, "HelloWorld\nSecondpage line\n");
    }

    #[test]
    fn test_missing_file() {
        let err = extract_pages(Path::new("/nonexistent/doc.pdf")).unwrap_err();
        assert!(matches!(err, ExtractionError::FileNotFound(_)));
    }
}
