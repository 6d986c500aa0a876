//! Extraction error types

use askpdf_common::errors::AppError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("PDF parse error for {path}: {message}")]
    PdfParseError { path: String, message: String },

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<ExtractionError> for AppError {
    fn from(e: ExtractionError) -> Self {
        match e {
            ExtractionError::PdfParseError { path, message } => AppError::Extraction {
                document: path,
                message,
            },
            ExtractionError::FileNotFound(name) => AppError::DocumentNotFound { name },
            ExtractionError::IoError(err) => AppError::Internal {
                message: err.to_string(),
            },
        }
    }
}
