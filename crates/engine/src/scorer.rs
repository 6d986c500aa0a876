//! Scorer adapter
//!
//! Wraps the answer oracle behind an infallible call: every failure mode
//! (transport error, malformed response, per-call timeout) degrades into
//! the no-answer sentinel so one bad chunk can never abort a batch.

use askpdf_common::metrics;
use askpdf_common::oracle::{AnswerOracle, OracleAnswer, ScoreOptions};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, warn};

/// Infallible scoring facade over an [`AnswerOracle`]
pub struct ScorerAdapter {
    oracle: Arc<dyn AnswerOracle>,
    timeout: Duration,
}

impl ScorerAdapter {
    pub fn new(oracle: Arc<dyn AnswerOracle>, timeout: Duration) -> Self {
        Self { oracle, timeout }
    }

    /// Score a question against one context.
    ///
    /// An empty answer means "nothing in this context answers the
    /// question" - a valid outcome the caller filters on, not an error.
    pub async fn score(
        &self,
        question: &str,
        context: &str,
        max_answer_len: usize,
    ) -> OracleAnswer {
        let options = ScoreOptions {
            max_answer_len,
            allow_no_answer: true,
        };

        let start = Instant::now();
        let outcome = tokio::time::timeout(
            self.timeout,
            self.oracle.score(question, context, options),
        )
        .await;

        match outcome {
            Ok(Ok(answer)) => {
                metrics::record_oracle_call(start.elapsed().as_secs_f64(), true);
                answer
            }
            Ok(Err(e)) => {
                error!(
                    error = %e,
                    context_len = context.len(),
                    "Oracle call failed, treating as no answer"
                );
                metrics::record_oracle_call(start.elapsed().as_secs_f64(), false);
                OracleAnswer::no_answer()
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    context_len = context.len(),
                    "Oracle call timed out, treating as no answer"
                );
                metrics::record_oracle_call(start.elapsed().as_secs_f64(), false);
                OracleAnswer::no_answer()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use askpdf_common::oracle::{MockOracle, MockRule};

    #[tokio::test]
    async fn test_score_passes_through() {
        let oracle = Arc::new(MockOracle::new(vec![MockRule {
            answer: "Paris".to_string(),
            score: 0.8,
        }]));
        let scorer = ScorerAdapter::new(oracle, Duration::from_secs(5));

        let result = scorer
            .score("capital of France?", "The capital is Paris.", 100)
            .await;
        assert_eq!(result.answer, "Paris");
        assert_eq!(result.score, 0.8);
    }

    #[tokio::test]
    async fn test_no_answer_is_not_an_error() {
        let oracle = Arc::new(MockOracle::empty());
        let scorer = ScorerAdapter::new(oracle, Duration::from_secs(5));

        let result = scorer.score("anything?", "irrelevant text", 100).await;
        assert!(result.is_no_answer());
    }
}
