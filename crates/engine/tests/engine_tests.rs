//! End-to-end engine tests against deterministic oracles.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use askpdf_common::config::QaConfig;
use askpdf_common::errors::AppError;
use askpdf_common::oracle::{AnswerOracle, OracleAnswer, ScoreOptions};
use askpdf_engine::synthesizer::{LOW_CONFIDENCE_TEXT, NO_RELEVANT_ANSWER_TEXT};
use askpdf_engine::{AnswerOutcome, Page, QaEngine};

/// One scripted verdict: fires when the context contains the marker.
struct Rule {
    marker: &'static str,
    answer: &'static str,
    score: f64,
}

/// Deterministic oracle scripted per test.
///
/// Contexts containing a failure marker error out; otherwise the first
/// matching rule wins; otherwise no answer.
struct ScriptedOracle {
    rules: Vec<Rule>,
    fail_markers: Vec<&'static str>,
}

impl ScriptedOracle {
    fn new(rules: Vec<Rule>) -> Self {
        Self {
            rules,
            fail_markers: Vec::new(),
        }
    }

    fn failing_on(mut self, marker: &'static str) -> Self {
        self.fail_markers.push(marker);
        self
    }
}

#[async_trait]
impl AnswerOracle for ScriptedOracle {
    async fn score(
        &self,
        _question: &str,
        context: &str,
        _options: ScoreOptions,
    ) -> Result<OracleAnswer, AppError> {
        if self.fail_markers.iter().any(|m| context.contains(m)) {
            return Err(AppError::Oracle {
                message: "scripted failure".to_string(),
            });
        }

        for rule in &self.rules {
            if context.contains(rule.marker) {
                return Ok(OracleAnswer {
                    answer: rule.answer.to_string(),
                    score: rule.score,
                });
            }
        }

        Ok(OracleAnswer::no_answer())
    }
}

fn engine(oracle: ScriptedOracle, config: QaConfig) -> QaEngine {
    QaEngine::new(Arc::new(oracle), config, Duration::from_secs(5))
}

fn page(page_number: u32, text: &str) -> Page {
    Page {
        page_number,
        text: text.to_string(),
    }
}

/// Three pages, each long enough that the merged top chunks clear the
/// minimum combined-context length.
fn three_marker_pages() -> Vec<Page> {
    vec![
        page(1, "The alpha section discusses revenue growth across the first fiscal quarter in detail."),
        page(2, "The beta section covers operating expenses and the cost of goods sold for the year."),
        page(3, "The gamma section summarizes net income and the resulting earnings per share figure."),
    ]
}

#[tokio::test]
async fn ranks_chunks_by_score_descending() {
    // Scores 0.9, 0.7, 0.95 must come back ordered 0.95, 0.9, 0.7
    let oracle = ScriptedOracle::new(vec![
        Rule { marker: "alpha", answer: "revenue growth", score: 0.9 },
        Rule { marker: "beta", answer: "operating expenses", score: 0.7 },
        Rule { marker: "gamma", answer: "net income", score: 0.95 },
    ]);

    let result = engine(oracle, QaConfig::default())
        .answer_question(&three_marker_pages(), "What do the sections cover?")
        .await;

    assert_eq!(result.outcome, AnswerOutcome::Answered);
    let scores: Vec<f64> = result.provenance.iter().map(|p| p.score).collect();
    assert_eq!(scores, vec![0.95, 0.9, 0.7]);
    for pair in result.provenance.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[tokio::test]
async fn truncates_to_top_k() {
    let oracle = ScriptedOracle::new(vec![
        Rule { marker: "alpha", answer: "revenue growth", score: 0.9 },
        Rule { marker: "beta", answer: "operating expenses", score: 0.7 },
        Rule { marker: "gamma", answer: "net income", score: 0.95 },
    ]);

    let config = QaConfig {
        top_k: 2,
        ..QaConfig::default()
    };

    let result = engine(oracle, config)
        .answer_question(&three_marker_pages(), "What do the sections cover?")
        .await;

    assert_eq!(result.provenance.len(), 2);
    let scores: Vec<f64> = result.provenance.iter().map(|p| p.score).collect();
    assert_eq!(scores, vec![0.95, 0.9]);
}

#[tokio::test]
async fn no_surviving_chunk_yields_no_relevant_answer() {
    // Scenario: every chunk scores to an empty answer
    let oracle = ScriptedOracle::new(Vec::new());

    let result = engine(oracle, QaConfig::default())
        .answer_question(&three_marker_pages(), "Something the document ignores?")
        .await;

    assert_eq!(result.outcome, AnswerOutcome::NoRelevantContent);
    assert_eq!(result.answer_text, NO_RELEVANT_ANSWER_TEXT);
    assert!(result.provenance.is_empty());
    assert_eq!(result.confidence_score, 0.0);
}

#[tokio::test]
async fn empty_document_yields_no_relevant_answer() {
    let oracle = ScriptedOracle::new(Vec::new());

    let result = engine(oracle, QaConfig::default())
        .answer_question(&[page(1, "")], "Anything?")
        .await;

    assert_eq!(result.outcome, AnswerOutcome::NoRelevantContent);
}

#[tokio::test]
async fn low_final_score_suppresses_answer() {
    // Scenario: best combined context scores 0.05
    let oracle = ScriptedOracle::new(vec![Rule {
        marker: "alpha",
        answer: "revenue growth",
        score: 0.05,
    }]);

    let result = engine(oracle, QaConfig::default())
        .answer_question(&three_marker_pages(), "What grew?")
        .await;

    assert_eq!(result.outcome, AnswerOutcome::LowConfidence);
    assert_eq!(result.answer_text, LOW_CONFIDENCE_TEXT);
    assert!(result.provenance.is_empty());
}

#[tokio::test]
async fn score_exactly_at_threshold_passes_the_gate() {
    let oracle = ScriptedOracle::new(vec![Rule {
        marker: "alpha",
        answer: "revenue growth",
        score: 0.1,
    }]);

    let result = engine(oracle, QaConfig::default())
        .answer_question(&three_marker_pages(), "What grew?")
        .await;

    assert_eq!(result.outcome, AnswerOutcome::Answered);
    assert_eq!(result.answer_text, "revenue growth");
    assert_eq!(result.confidence_score, 0.1);
    assert!(!result.provenance.is_empty());
}

#[tokio::test]
async fn short_combined_context_is_insufficient() {
    let oracle = ScriptedOracle::new(vec![Rule {
        marker: "tiny",
        answer: "tiny",
        score: 0.9,
    }]);

    let result = engine(oracle, QaConfig::default())
        .answer_question(&[page(1, "tiny fact.")], "What is here?")
        .await;

    assert_eq!(result.outcome, AnswerOutcome::InsufficientContext);
    assert!(result.provenance.is_empty());
}

#[tokio::test]
async fn partial_scoring_failures_do_not_abort_the_batch() {
    let oracle = ScriptedOracle::new(vec![
        Rule { marker: "alpha", answer: "revenue growth", score: 0.9 },
        Rule { marker: "gamma", answer: "net income", score: 0.8 },
    ])
    .failing_on("beta");

    let result = engine(oracle, QaConfig::default())
        .answer_question(&three_marker_pages(), "What do the sections cover?")
        .await;

    assert_eq!(result.outcome, AnswerOutcome::Answered);
    assert_eq!(result.provenance.len(), 2);
    assert!(result.provenance.iter().all(|p| !p.text.contains("beta")));
}

#[tokio::test]
async fn results_do_not_depend_on_pool_size() {
    let rules = || {
        vec![
            Rule { marker: "alpha", answer: "revenue growth", score: 0.9 },
            Rule { marker: "beta", answer: "operating expenses", score: 0.7 },
            Rule { marker: "gamma", answer: "net income", score: 0.95 },
        ]
    };

    let serial = engine(
        ScriptedOracle::new(rules()),
        QaConfig { worker_count: 1, ..QaConfig::default() },
    )
    .answer_question(&three_marker_pages(), "What do the sections cover?")
    .await;

    let parallel = engine(
        ScriptedOracle::new(rules()),
        QaConfig { worker_count: 5, ..QaConfig::default() },
    )
    .answer_question(&three_marker_pages(), "What do the sections cover?")
    .await;

    assert_eq!(serial.answer_text, parallel.answer_text);
    assert_eq!(serial.provenance.len(), parallel.provenance.len());
    for (a, b) in serial.provenance.iter().zip(parallel.provenance.iter()) {
        assert_eq!(a.page_number, b.page_number);
        assert_eq!(a.score, b.score);
        assert_eq!(a.text, b.text);
    }
}

#[tokio::test]
async fn provenance_carries_page_and_offsets() {
    let oracle = ScriptedOracle::new(vec![Rule {
        marker: "gamma",
        answer: "net income",
        score: 0.95,
    }]);

    let result = engine(oracle, QaConfig::default())
        .answer_question(&three_marker_pages(), "What is summarized?")
        .await;

    assert_eq!(result.outcome, AnswerOutcome::Answered);
    let source = &result.provenance[0];
    assert_eq!(source.page_number, 3);
    assert_eq!(source.start_offset, 0);
    assert_eq!(
        source.end_offset - source.start_offset,
        source.text.chars().count()
    );

    // Answer offsets point at the first occurrence within the chunk
    let located: String = source
        .text
        .chars()
        .skip(source.answer_start_offset)
        .take(source.answer_end_offset - source.answer_start_offset)
        .collect();
    assert_eq!(located, "net income");
}

/// Oracle that never responds in time.
struct StalledOracle;

#[async_trait]
impl AnswerOracle for StalledOracle {
    async fn score(
        &self,
        _question: &str,
        _context: &str,
        _options: ScoreOptions,
    ) -> Result<OracleAnswer, AppError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(OracleAnswer::no_answer())
    }
}

#[tokio::test]
async fn hung_oracle_calls_time_out_as_no_answer() {
    let engine = QaEngine::new(
        Arc::new(StalledOracle),
        QaConfig::default(),
        Duration::from_millis(50),
    );

    let result = engine
        .answer_question(&three_marker_pages(), "Anything?")
        .await;

    assert_eq!(result.outcome, AnswerOutcome::NoRelevantContent);
}
