//! Document upload handlers

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::AppState;
use askpdf_common::{
    errors::{AppError, Result},
    metrics,
};
use askpdf_extraction::extract_pages;

/// Response after storing an uploaded PDF
#[derive(Serialize)]
pub struct UploadResponse {
    pub filename: String,
    pub size_bytes: usize,
    pub page_count: usize,
    /// First characters of the extracted text, as an upload sanity check
    pub preview: String,
}

/// Characters of extracted text returned as the upload preview
const PREVIEW_CHARS: usize = 300;

/// Accept a multipart PDF upload, store it, and return a text preview
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>)> {
    while let Some(field) = multipart.next_field().await.map_err(|e| AppError::Validation {
        message: format!("Malformed multipart body: {}", e),
        field: None,
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(sanitize_filename)
            .transpose()?
            .ok_or_else(|| AppError::Validation {
                message: "Missing filename on file field".to_string(),
                field: Some("file".to_string()),
            })?;

        let data = field.bytes().await.map_err(|e| AppError::Validation {
            message: format!("Failed to read upload: {}", e),
            field: Some("file".to_string()),
        })?;

        let limit = state.config.storage.max_upload_bytes;
        if data.len() > limit {
            return Err(AppError::PayloadTooLarge {
                size: data.len(),
                limit,
            });
        }

        let path = PathBuf::from(&state.config.storage.upload_dir).join(&filename);
        tokio::fs::write(&path, &data).await?;

        // Extract text now so a broken PDF is rejected at upload time
        let pages = {
            let path = path.clone();
            tokio::task::spawn_blocking(move || extract_pages(&path))
                .await
                .map_err(|e| AppError::Internal {
                    message: format!("Extraction task failed: {}", e),
                })??
        };

        let preview: String = pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
            .chars()
            .take(PREVIEW_CHARS)
            .collect();

        metrics::record_upload(data.len());

        tracing::info!(
            filename = %filename,
            size_bytes = data.len(),
            pages = pages.len(),
            "Document uploaded"
        );

        return Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                filename,
                size_bytes: data.len(),
                page_count: pages.len(),
                preview,
            }),
        ));
    }

    Err(AppError::Validation {
        message: "Multipart body must contain a 'file' field".to_string(),
        field: Some("file".to_string()),
    })
}

/// Validate a client-supplied filename and strip any path components.
///
/// Rejects anything that is not a bare `.pdf` filename so a stored
/// document can never escape the upload directory.
pub(crate) fn sanitize_filename(name: &str) -> Result<String> {
    let bare = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    if bare.is_empty() || bare != name || bare == ".." {
        return Err(AppError::Validation {
            message: format!("Invalid document name: {:?}", name),
            field: Some("file".to_string()),
        });
    }

    if !bare.to_ascii_lowercase().ends_with(".pdf") {
        return Err(AppError::Validation {
            message: "Only .pdf documents are supported".to_string(),
            field: Some("file".to_string()),
        });
    }

    Ok(bare.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_accepts_plain_pdf() {
        assert_eq!(sanitize_filename("report.pdf").unwrap(), "report.pdf");
        assert_eq!(sanitize_filename("Q3 Review.PDF").unwrap(), "Q3 Review.PDF");
    }

    #[test]
    fn test_sanitize_rejects_traversal() {
        assert!(sanitize_filename("../etc/passwd.pdf").is_err());
        assert!(sanitize_filename("/tmp/abs.pdf").is_err());
        assert!(sanitize_filename("dir/nested.pdf").is_err());
        assert!(sanitize_filename("..").is_err());
        assert!(sanitize_filename("").is_err());
    }

    #[test]
    fn test_sanitize_rejects_other_extensions() {
        assert!(sanitize_filename("notes.txt").is_err());
        assert!(sanitize_filename("archive.pdf.exe").is_err());
    }
}
