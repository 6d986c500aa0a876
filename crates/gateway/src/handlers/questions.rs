//! Question answering handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Instant;
use validator::Validate;

use crate::handlers::documents::sanitize_filename;
use crate::AppState;
use askpdf_common::errors::{AppError, Result};
use askpdf_engine::{AnswerOutcome, Page, ProvenanceEntry};
use askpdf_extraction::extract_pages;

/// Question request
#[derive(Debug, Deserialize, Validate)]
pub struct AskRequest {
    /// Filename of a previously uploaded document
    #[validate(length(min = 1, max = 255))]
    pub document: String,

    #[validate(length(min = 1, max = 1000))]
    pub question: String,

    #[serde(default)]
    pub options: AskOptions,
}

/// Per-call overrides for the retrieval knobs
#[derive(Debug, Default, Deserialize)]
pub struct AskOptions {
    pub chunk_size: Option<usize>,
    pub chunk_overlap: Option<usize>,
    pub top_k: Option<usize>,
    pub worker_count: Option<usize>,
}

/// Question response
#[derive(Serialize)]
pub struct AskResponse {
    pub question: String,
    pub answer: String,
    pub outcome: AnswerOutcome,
    pub confidence: f64,
    /// Ranked source chunks with page numbers and offsets for citation
    pub sources: Vec<ProvenanceEntry>,
    pub processing_time_ms: u64,
}

/// Answer a question against a stored document
pub async fn ask_question(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>> {
    let start = Instant::now();

    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let filename = sanitize_filename(&request.document)?;
    let path = PathBuf::from(&state.config.storage.upload_dir).join(&filename);

    if !path.exists() {
        return Err(AppError::DocumentNotFound { name: filename });
    }

    // PDF parsing is CPU-bound, keep it off the async workers
    let pages = tokio::task::spawn_blocking(move || extract_pages(&path))
        .await
        .map_err(|e| AppError::Internal {
            message: format!("Extraction task failed: {}", e),
        })??;

    let pages: Vec<Page> = pages
        .into_iter()
        .map(|p| Page {
            page_number: p.page_number,
            text: p.text,
        })
        .collect();

    // Apply per-call overrides on top of the process-wide knobs
    let mut qa_config = state.config.qa.clone();
    if let Some(chunk_size) = request.options.chunk_size {
        qa_config.chunk_size = chunk_size;
    }
    if let Some(chunk_overlap) = request.options.chunk_overlap {
        qa_config.chunk_overlap = chunk_overlap;
    }
    if let Some(top_k) = request.options.top_k {
        qa_config.top_k = top_k;
    }
    if let Some(worker_count) = request.options.worker_count {
        qa_config.worker_count = worker_count;
    }

    let answer = state
        .engine
        .answer_question_with(&pages, &request.question, &qa_config)
        .await;

    let processing_time_ms = start.elapsed().as_millis() as u64;

    tracing::info!(
        document = %filename,
        outcome = answer.outcome.as_str(),
        confidence = answer.confidence_score,
        sources = answer.provenance.len(),
        latency_ms = processing_time_ms,
        "Question handled"
    );

    Ok(Json(AskResponse {
        question: request.question,
        answer: answer.answer_text,
        outcome: answer.outcome,
        confidence: answer.confidence_score,
        sources: answer.provenance,
        processing_time_ms,
    }))
}
