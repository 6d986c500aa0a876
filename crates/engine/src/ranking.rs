//! Parallel ranking engine
//!
//! Fans one scoring call per chunk out over a bounded pool, collects the
//! results as they complete, and keeps the top-scoring survivors.

use crate::chunker::Chunk;
use crate::scorer::ScorerAdapter;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

/// A chunk the oracle found an answer in
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    /// Answer span the oracle extracted from the chunk text
    pub answer: String,
    /// Oracle confidence, higher = more relevant
    pub score: f64,
    /// Start of the answer within the chunk text (char offset, first
    /// occurrence - repeated substrings resolve to the earliest match)
    pub answer_start_offset: usize,
    /// End of the answer within the chunk text (char offset)
    pub answer_end_offset: usize,
}

/// Parameters for one ranking pass
#[derive(Debug, Clone, Copy)]
pub struct RankingParams {
    /// Chunks retained after the relevance filter
    pub top_k: usize,
    /// Bounded pool size; a resource knob, not a correctness one -
    /// results are identical for any pool size
    pub worker_count: usize,
    /// Per-chunk answer length cap forwarded to the oracle
    pub max_answer_len: usize,
}

/// Score every chunk against the question and return the top `top_k`
/// survivors ordered by score descending.
///
/// One scoring task runs per chunk, at most `worker_count` at a time.
/// Collection waits for the whole batch (all scores are needed before
/// ranking), chunks whose answer is empty or whitespace-only are dropped,
/// and score ties keep their completion order - callers may only rely on
/// the score-descending property. Scoring failures shrink the result but
/// never fail the pass.
pub async fn rank(
    scorer: &ScorerAdapter,
    chunks: Vec<Chunk>,
    question: &str,
    params: RankingParams,
) -> Vec<ScoredChunk> {
    let submitted = chunks.len();

    let mut survivors: Vec<ScoredChunk> = stream::iter(chunks)
        .map(|chunk| async move {
            let verdict = scorer
                .score(question, &chunk.text, params.max_answer_len)
                .await;

            debug!(
                page = chunk.page_number,
                start_offset = chunk.start_offset,
                score = verdict.score,
                answer_len = verdict.answer.len(),
                "Chunk scored"
            );

            if verdict.is_no_answer() {
                None
            } else {
                Some(locate_answer(chunk, verdict.answer, verdict.score))
            }
        })
        .buffer_unordered(params.worker_count.max(1))
        .filter_map(|scored| async move { scored })
        .collect()
        .await;

    // Stable sort: equal scores keep their completion order
    survivors.sort_by(|a, b| b.score.total_cmp(&a.score));
    survivors.truncate(params.top_k);

    info!(
        submitted,
        survivors = survivors.len(),
        top_k = params.top_k,
        "Ranking complete"
    );

    survivors
}

/// Attach answer offsets to a surviving chunk.
///
/// Offsets come from the first occurrence of the answer in the chunk
/// text. The oracle extracts spans, so a miss means it rewrote the text;
/// in that case the offsets fall back to the start of the chunk.
fn locate_answer(chunk: Chunk, answer: String, score: f64) -> ScoredChunk {
    let answer_chars = answer.chars().count();

    let answer_start_offset = match chunk.text.find(&answer) {
        Some(byte_pos) => chunk.text[..byte_pos].chars().count(),
        None => {
            warn!(
                page = chunk.page_number,
                start_offset = chunk.start_offset,
                "Answer span not found verbatim in chunk text"
            );
            0
        }
    };

    ScoredChunk {
        chunk,
        answer,
        score,
        answer_start_offset,
        answer_end_offset: answer_start_offset + answer_chars,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_answer_first_occurrence() {
        let chunk = Chunk {
            text: "the cat sat on the cat mat".to_string(),
            page_number: 1,
            start_offset: 0,
            end_offset: 26,
        };

        let scored = locate_answer(chunk, "the cat".to_string(), 0.5);
        assert_eq!(scored.answer_start_offset, 0);
        assert_eq!(scored.answer_end_offset, 7);
    }

    #[test]
    fn test_locate_answer_char_offsets() {
        let chunk = Chunk {
            text: "prix: 42€ après impôts".to_string(),
            page_number: 2,
            start_offset: 10,
            end_offset: 32,
        };

        let scored = locate_answer(chunk, "après".to_string(), 0.7);
        assert_eq!(scored.answer_start_offset, 10);
        assert_eq!(scored.answer_end_offset, 15);
    }
}
