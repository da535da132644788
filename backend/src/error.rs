use crate::docx::DocxError;
use crate::replacements::ValidationError;
use crate::storage::StoreError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use common::responses::ErrorBody;
use log::error;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Every failure a request can end with.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid form submission: {0}")]
    InvalidForm(String),

    #[error("Unknown document type: {0}")]
    UnknownDocType(String),

    #[error("Unknown form: {0}")]
    UnknownFamily(String),

    #[error(transparent)]
    Docx(#[from] DocxError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("None of the {attempted} templates could be generated")]
    BatchFailed { attempted: usize },

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable identifier sent as `error` in the JSON body.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::InvalidForm(_) => "invalid_form",
            AppError::UnknownDocType(_) => "unknown_doc_type",
            AppError::UnknownFamily(_) => "unknown_form",
            AppError::Docx(DocxError::TemplateNotFound(_)) => "template_not_found",
            AppError::Docx(_) => "substitution_failed",
            AppError::Store(StoreError::InvalidKey(_)) => "invalid_key",
            AppError::Store(_) => "store_unavailable",
            AppError::BatchFailed { .. } => "batch_failed",
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidForm(_) => StatusCode::BAD_REQUEST,
            AppError::UnknownDocType(_)
            | AppError::UnknownFamily(_)
            | AppError::Docx(DocxError::TemplateNotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Store(StoreError::InvalidKey(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Docx(_) | AppError::BatchFailed { .. } | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        let missing = match self {
            AppError::Validation(e) => e.missing.clone(),
            _ => Vec::new(),
        };
        HttpResponse::build(status).json(ErrorBody {
            error: self.kind().to_string(),
            message: self.to_string(),
            missing,
        })
    }
}
