//! Text chunking module
//!
//! Splits page text into overlapping windows for relevance scoring.

use tracing::debug;

/// Configuration for text chunking
#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 100,
        }
    }
}

/// A page-tagged window of document text.
///
/// Offsets are `char` offsets within the source page text, so
/// `end_offset - start_offset` equals the chunk's character count and a
/// chunk can never split a multi-byte character.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// The chunk content
    pub text: String,
    /// 1-based page the chunk was derived from
    pub page_number: u32,
    /// Start position within the source page
    pub start_offset: usize,
    /// End position within the source page
    pub end_offset: usize,
}

/// Split one page of text into overlapping chunks.
///
/// Windows are at most `chunk_size` characters. Each cut prefers the last
/// newline inside the window so lines stay intact where possible; a run of
/// text longer than `chunk_size` without a newline is cut at the size
/// bound. Consecutive chunks share `chunk_overlap` characters of context
/// so an answer spanning a cut is not lost.
///
/// Deterministic: the same text and config always produce the same chunk
/// sequence. Empty text produces no chunks.
pub fn split_page(page_number: u32, text: &str, config: &ChunkingConfig) -> Vec<Chunk> {
    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();

    if total == 0 {
        return Vec::new();
    }

    let chunk_size = config.chunk_size.max(1);
    // Overlap must leave room to advance
    let overlap = config.chunk_overlap.min(chunk_size - 1);

    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        let hard_end = (start + chunk_size).min(total);

        let end = if hard_end < total {
            // Prefer to cut just after the last newline in the window
            match chars[start..hard_end].iter().rposition(|&c| c == '\n') {
                Some(pos) => start + pos + 1,
                None => hard_end,
            }
        } else {
            hard_end
        };

        chunks.push(Chunk {
            text: chars[start..end].iter().collect(),
            page_number,
            start_offset: start,
            end_offset: end,
        });

        if end >= total {
            break;
        }

        // Step back by the overlap; if the chunk was shorter than the
        // overlap, advance without one so the walk always makes progress.
        let next = end.saturating_sub(overlap);
        start = if next > start { next } else { end };
    }

    debug!(
        page = page_number,
        input_len = total,
        chunk_count = chunks.len(),
        chunk_size = config.chunk_size,
        "Page chunked"
    );

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(chunk_size: usize, chunk_overlap: usize) -> ChunkingConfig {
        ChunkingConfig {
            chunk_size,
            chunk_overlap,
        }
    }

    #[test]
    fn test_empty_text() {
        let chunks = split_page(1, "", &ChunkingConfig::default());
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_sliding_window_without_newlines() {
        // 2000 chars, size 500, overlap 100 -> 5 chunks, each consecutive
        // pair sharing a 100-char region
        let text = "a".repeat(2000);
        let chunks = split_page(1, &text, &config(500, 100));

        assert_eq!(chunks.len(), 5);
        for pair in chunks.windows(2) {
            assert_eq!(pair[0].end_offset - pair[1].start_offset, 100);
        }
        assert_eq!(chunks[0].start_offset, 0);
        assert_eq!(chunks[4].end_offset, 2000);
    }

    #[test]
    fn test_prefers_newline_boundary() {
        let text = format!("{}\n{}", "a".repeat(30), "b".repeat(30));
        let chunks = split_page(1, &text, &config(40, 5));

        // First cut lands just after the newline, not at the size bound
        assert!(chunks[0].text.ends_with('\n'));
        assert_eq!(chunks[0].end_offset, 31);
    }

    #[test]
    fn test_coverage_no_gaps() {
        let text = "line one\nline two\nline three\n".repeat(40);
        let chunks = split_page(1, &text, &config(100, 20));

        assert_eq!(chunks[0].start_offset, 0);
        assert_eq!(chunks.last().unwrap().end_offset, text.chars().count());
        for pair in chunks.windows(2) {
            // Next chunk starts at or before the previous end
            assert!(pair[1].start_offset <= pair[0].end_offset);
        }
    }

    #[test]
    fn test_deterministic() {
        let text = "The quick brown fox\njumps over the lazy dog. ".repeat(25);
        let cfg = config(120, 30);

        let first = split_page(3, &text, &cfg);
        let second = split_page(3, &text, &cfg);

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.text, b.text);
            assert_eq!(a.start_offset, b.start_offset);
            assert_eq!(a.end_offset, b.end_offset);
            assert_eq!(a.page_number, 3);
        }
    }

    #[test]
    fn test_offsets_match_text_length() {
        let text = "short\nlines\nrepeated here\n".repeat(30);
        for chunk in split_page(2, &text, &config(80, 15)) {
            assert_eq!(
                chunk.end_offset - chunk.start_offset,
                chunk.text.chars().count()
            );
        }
    }

    #[test]
    fn test_multibyte_text_never_splits_chars() {
        let text = "héllo wörld ünïcode ".repeat(60);
        let chunks = split_page(1, &text, &config(50, 10));

        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert_eq!(
                chunk.end_offset - chunk.start_offset,
                chunk.text.chars().count()
            );
        }
    }

    #[test]
    fn test_overlap_larger_than_chunk_still_terminates() {
        let text = "x".repeat(300);
        let chunks = split_page(1, &text, &config(50, 200));

        assert!(!chunks.is_empty());
        assert_eq!(chunks.last().unwrap().end_offset, 300);
    }
}
