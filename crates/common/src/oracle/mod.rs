//! Answer-oracle client abstraction
//!
//! The engine treats extractive question answering as a capability: given a
//! question and a context string, the oracle returns its best answer span
//! and a confidence score. An empty answer is a valid outcome ("nothing in
//! this context answers the question"), not a failure.
//!
//! Scores are oracle-defined (higher = more relevant) and must never be
//! assumed deterministic across calls with identical inputs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::OracleConfig;
use crate::errors::AppError;

/// Policy knobs forwarded unchanged to the oracle
#[derive(Debug, Clone, Copy)]
pub struct ScoreOptions {
    /// Maximum answer span length in characters
    pub max_answer_len: usize,
    /// Allow the oracle to signal "impossible to answer" instead of
    /// forcing a span
    pub allow_no_answer: bool,
}

/// One oracle verdict: best answer span and its confidence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleAnswer {
    pub answer: String,
    pub score: f64,
}

impl OracleAnswer {
    /// The sentinel "no answer found" result
    pub fn no_answer() -> Self {
        Self {
            answer: String::new(),
            score: 0.0,
        }
    }

    /// True when the answer is empty or whitespace-only
    pub fn is_no_answer(&self) -> bool {
        self.answer.trim().is_empty()
    }
}

#[async_trait]
pub trait AnswerOracle: Send + Sync {
    async fn score(
        &self,
        question: &str,
        context: &str,
        options: ScoreOptions,
    ) -> Result<OracleAnswer, AppError>;
}

/// Oracle backed by a hosted extractive-QA inference endpoint.
///
/// Speaks the Hugging Face Inference API question-answering format:
/// `{"inputs": {"question", "context"}, "parameters": {...}}` in,
/// `{"answer", "score", "start", "end"}` out.
pub struct InferenceOracle {
    client: reqwest::Client,
    config: OracleConfig,
}

#[derive(Serialize)]
struct QaInputs<'a> {
    question: &'a str,
    context: &'a str,
}

#[derive(Serialize)]
struct QaParameters {
    max_answer_len: usize,
    handle_impossible_answer: bool,
}

#[derive(Serialize)]
struct QaRequest<'a> {
    inputs: QaInputs<'a>,
    parameters: QaParameters,
}

#[derive(Deserialize)]
struct QaResponse {
    answer: String,
    score: f64,
}

impl InferenceOracle {
    pub fn new(config: OracleConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AppError::Configuration {
                message: format!("Failed to create oracle HTTP client: {}", e),
            })?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl AnswerOracle for InferenceOracle {
    async fn score(
        &self,
        question: &str,
        context: &str,
        options: ScoreOptions,
    ) -> Result<OracleAnswer, AppError> {
        let request = QaRequest {
            inputs: QaInputs { question, context },
            parameters: QaParameters {
                max_answer_len: options.max_answer_len,
                handle_impossible_answer: options.allow_no_answer,
            },
        };

        let mut builder = self.client.post(&self.config.api_url).json(&request);
        if let Some(ref key) = self.config.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        let response = builder.send().await.map_err(|e| AppError::Oracle {
            message: format!("Request failed: {}", e),
        })?;

        if !response.status().is_success() {
            return Err(AppError::Oracle {
                message: format!("API error: {}", response.status()),
            });
        }

        let body: QaResponse = response.json().await.map_err(|e| AppError::Oracle {
            message: format!("Parse error: {}", e),
        })?;

        tracing::debug!(
            score = body.score,
            answer_len = body.answer.len(),
            model = %self.config.model,
            "Oracle call complete"
        );

        Ok(OracleAnswer {
            answer: body.answer,
            score: body.score,
        })
    }
}

/// A canned answer the mock oracle can emit
#[derive(Debug, Clone)]
pub struct MockRule {
    /// Span the rule fires on; must appear verbatim in the context
    pub answer: String,
    pub score: f64,
}

/// Deterministic oracle for tests and offline development.
///
/// Returns the highest-scoring rule whose answer text occurs in the
/// context, or the no-answer sentinel when none matches.
pub struct MockOracle {
    rules: Vec<MockRule>,
}

impl MockOracle {
    pub fn new(rules: Vec<MockRule>) -> Self {
        Self { rules }
    }

    /// An oracle that never finds an answer
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }
}

#[async_trait]
impl AnswerOracle for MockOracle {
    async fn score(
        &self,
        _question: &str,
        context: &str,
        options: ScoreOptions,
    ) -> Result<OracleAnswer, AppError> {
        let best = self
            .rules
            .iter()
            .filter(|r| context.contains(r.answer.as_str()))
            .max_by(|a, b| a.score.total_cmp(&b.score));

        match best {
            Some(rule) => Ok(OracleAnswer {
                answer: rule.answer.chars().take(options.max_answer_len).collect(),
                score: rule.score,
            }),
            None => Ok(OracleAnswer::no_answer()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_oracle_matches_rule() {
        let oracle = MockOracle::new(vec![
            MockRule {
                answer: "42".to_string(),
                score: 0.9,
            },
            MockRule {
                answer: "deep thought".to_string(),
                score: 0.4,
            },
        ]);

        let options = ScoreOptions {
            max_answer_len: 100,
            allow_no_answer: true,
        };

        let result = oracle
            .score("what is the answer?", "the answer is 42", options)
            .await
            .unwrap();
        assert_eq!(result.answer, "42");
        assert_eq!(result.score, 0.9);
    }

    #[tokio::test]
    async fn test_mock_oracle_no_match() {
        let oracle = MockOracle::empty();
        let options = ScoreOptions {
            max_answer_len: 100,
            allow_no_answer: true,
        };

        let result = oracle
            .score("anything?", "unrelated text", options)
            .await
            .unwrap();
        assert!(result.is_no_answer());
        assert_eq!(result.score, 0.0);
    }
}
