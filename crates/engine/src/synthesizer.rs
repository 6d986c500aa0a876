//! Answer synthesizer
//!
//! Merges the top-ranked chunks into one context, runs a final scoring
//! pass over it, and applies the confidence gate that decides between a
//! real answer and one of the soft refusals.

use crate::ranking::ScoredChunk;
use crate::scorer::ScorerAdapter;
use askpdf_common::config::QaConfig;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Fixed response when no chunk contained an answer
pub const NO_RELEVANT_ANSWER_TEXT: &str = "I couldn't find a relevant answer in the document.";

/// Fixed response when the merged context is too short to be worth a
/// final scoring pass
pub const INSUFFICIENT_CONTEXT_TEXT: &str =
    "The document does not contain enough information to answer this question.";

/// Fixed response when the final score fails the confidence gate
pub const LOW_CONFIDENCE_TEXT: &str =
    "I'm not confident about the answer based on the provided document.";

/// How a question resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerOutcome {
    /// The confidence gate passed and the answer is real
    Answered,
    /// No chunk survived the relevance filter
    NoRelevantContent,
    /// Top chunks merged to less than the minimum useful context
    InsufficientContext,
    /// The final score fell below the confidence threshold
    LowConfidence,
}

impl AnswerOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerOutcome::Answered => "answered",
            AnswerOutcome::NoRelevantContent => "no_relevant_content",
            AnswerOutcome::InsufficientContext => "insufficient_context",
            AnswerOutcome::LowConfidence => "low_confidence",
        }
    }
}

/// One provenance entry backing a final answer
#[derive(Debug, Clone, Serialize)]
pub struct ProvenanceEntry {
    /// Chunk text the evidence came from
    pub text: String,
    /// 1-based source page
    pub page_number: u32,
    /// Chunk position within its page (char offsets)
    pub start_offset: usize,
    pub end_offset: usize,
    /// Answer span the chunk contributed during ranking
    pub answer: String,
    /// Per-chunk relevance score
    pub score: f64,
    /// Answer position within the chunk text (char offsets, first
    /// occurrence - not a guaranteed-unique citation)
    pub answer_start_offset: usize,
    pub answer_end_offset: usize,
}

impl From<&ScoredChunk> for ProvenanceEntry {
    fn from(scored: &ScoredChunk) -> Self {
        Self {
            text: scored.chunk.text.clone(),
            page_number: scored.chunk.page_number,
            start_offset: scored.chunk.start_offset,
            end_offset: scored.chunk.end_offset,
            answer: scored.answer.clone(),
            score: scored.score,
            answer_start_offset: scored.answer_start_offset,
            answer_end_offset: scored.answer_end_offset,
        }
    }
}

/// The engine's one output type
#[derive(Debug, Clone, Serialize)]
pub struct FinalAnswer {
    pub answer_text: String,
    pub confidence_score: f64,
    pub outcome: AnswerOutcome,
    /// Ranked chunks the answer was synthesized from, empty for every
    /// outcome but [`AnswerOutcome::Answered`]
    pub provenance: Vec<ProvenanceEntry>,
}

impl FinalAnswer {
    fn soft(text: &str, outcome: AnswerOutcome) -> Self {
        Self {
            answer_text: text.to_string(),
            confidence_score: 0.0,
            outcome,
            provenance: Vec::new(),
        }
    }
}

/// Produce the final answer from a ranked result.
///
/// The merged context is the ranked chunk texts joined by single spaces,
/// rank order preserved, scored once more with the larger answer-length
/// cap. A final score strictly below `low_confidence_threshold` suppresses
/// the answer; a score exactly at the threshold passes.
pub async fn synthesize(
    scorer: &ScorerAdapter,
    ranked: Vec<ScoredChunk>,
    question: &str,
    config: &QaConfig,
) -> FinalAnswer {
    // 1. Nothing relevant survived ranking - terminal, no scoring call
    if ranked.is_empty() {
        info!("No relevant chunks found");
        return FinalAnswer::soft(NO_RELEVANT_ANSWER_TEXT, AnswerOutcome::NoRelevantContent);
    }

    // 2. Merge the top chunks in rank order
    let combined_context = ranked
        .iter()
        .map(|s| s.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    debug!(
        chunk_count = ranked.len(),
        context_len = combined_context.len(),
        "Combined context assembled"
    );

    // 3. Too little merged evidence to be worth a final pass
    if combined_context.chars().count() < config.min_combined_context_len {
        warn!(
            context_len = combined_context.chars().count(),
            min = config.min_combined_context_len,
            "Combined context below minimum length"
        );
        return FinalAnswer::soft(INSUFFICIENT_CONTEXT_TEXT, AnswerOutcome::InsufficientContext);
    }

    // 4. One scoring pass over the merged context
    let verdict = scorer
        .score(question, &combined_context, config.combined_max_answer_len)
        .await;

    // 5. Confidence gate: strictly below the threshold suppresses the
    // answer entirely; a score exactly at the threshold passes
    if verdict.score < config.low_confidence_threshold {
        info!(
            score = verdict.score,
            threshold = config.low_confidence_threshold,
            "Final answer below confidence threshold"
        );
        return FinalAnswer::soft(LOW_CONFIDENCE_TEXT, AnswerOutcome::LowConfidence);
    }

    // 6. Accept: expose the ranked chunks as citation provenance
    info!(
        score = verdict.score,
        sources = ranked.len(),
        "Question answered"
    );

    FinalAnswer {
        answer_text: verdict.answer,
        confidence_score: verdict.score,
        outcome: AnswerOutcome::Answered,
        provenance: ranked.iter().map(ProvenanceEntry::from).collect(),
    }
}
