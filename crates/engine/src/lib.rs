//! AskPDF QA Engine
//!
//! Answers a natural-language question against page-indexed document text:
//! - Chunker: overlapping, page-tagged text windows
//! - Scorer adapter: infallible facade over the answer oracle
//! - Parallel ranking: bounded fan-out scoring, filter, sort, top-K
//! - Synthesizer: merged-context scoring pass behind a confidence gate
//!
//! The engine holds no state across calls; concurrent questions share
//! nothing but the oracle client.

pub mod chunker;
pub mod ranking;
pub mod scorer;
pub mod synthesizer;

use std::sync::Arc;
use std::time::{Duration, Instant};

use askpdf_common::config::QaConfig;
use askpdf_common::metrics;
use askpdf_common::oracle::AnswerOracle;
use tracing::info;

pub use chunker::{Chunk, ChunkingConfig};
pub use ranking::{RankingParams, ScoredChunk};
pub use synthesizer::{AnswerOutcome, FinalAnswer, ProvenanceEntry};

/// One page of document text, supplied by the extraction collaborator
#[derive(Debug, Clone)]
pub struct Page {
    /// 1-based page number
    pub page_number: u32,
    pub text: String,
}

/// The retrieval orchestrator: chunk, rank, synthesize.
pub struct QaEngine {
    scorer: scorer::ScorerAdapter,
    config: QaConfig,
}

impl QaEngine {
    /// Create an engine over an oracle.
    ///
    /// `oracle_timeout` bounds each scoring call; a worker that exceeds it
    /// contributes nothing and does not stall its siblings.
    pub fn new(oracle: Arc<dyn AnswerOracle>, config: QaConfig, oracle_timeout: Duration) -> Self {
        Self {
            scorer: scorer::ScorerAdapter::new(oracle, oracle_timeout),
            config,
        }
    }

    /// Answer a question against a document's pages using the engine's
    /// configured knobs.
    ///
    /// Never fails: every scoring-side problem degrades into one of the
    /// soft [`FinalAnswer`] outcomes, so a readable document always
    /// produces a well-formed result.
    pub async fn answer_question(&self, pages: &[Page], question: &str) -> FinalAnswer {
        self.answer_question_with(pages, question, &self.config).await
    }

    /// Answer a question with per-call knob overrides.
    pub async fn answer_question_with(
        &self,
        pages: &[Page],
        question: &str,
        config: &QaConfig,
    ) -> FinalAnswer {
        let start = Instant::now();

        // 1. Chunk every page and flatten into one page-tagged list
        let chunking = ChunkingConfig {
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
        };

        let chunks: Vec<Chunk> = pages
            .iter()
            .flat_map(|page| chunker::split_page(page.page_number, &page.text, &chunking))
            .collect();

        let chunk_count = chunks.len();

        info!(
            pages = pages.len(),
            chunks = chunk_count,
            question_len = question.len(),
            "Scoring document chunks"
        );

        // 2. Bounded parallel scoring, filter, sort, truncate
        let params = RankingParams {
            top_k: config.top_k,
            worker_count: config.worker_count,
            max_answer_len: config.per_chunk_max_answer_len,
        };
        let ranked = ranking::rank(&self.scorer, chunks, question, params).await;

        // 3. Merge the survivors and apply the confidence gate
        let answer = synthesizer::synthesize(&self.scorer, ranked, question, config).await;

        let elapsed = start.elapsed().as_secs_f64();
        metrics::record_question(elapsed, answer.outcome.as_str(), chunk_count);

        info!(
            outcome = answer.outcome.as_str(),
            confidence = answer.confidence_score,
            sources = answer.provenance.len(),
            latency_secs = elapsed,
            "Question processed"
        );

        answer
    }
}
