//! # Document Service Module
//!
//! Generates documents from the submitted form and returns them as downloads.
//!
//! ## Sub-modules:
//! - `generate`: one document per `docType`, plus the render-upload-serve
//!   pipeline shared with the plain form submission.
//! - `batch`: every configured `docType` bundled into a single zip.

mod batch;
pub(crate) mod generate;

use actix_web::web::{post, ServiceConfig};

/// Registers the document routes.
///
/// # Registered Routes:
///
/// *   **`POST /download-document/{doc_type}`**:
///     - **Handler**: `generate::process`
///     - **Description**: Validates the form against the family owning
///       `doc_type`, fills that family's template, stores the result and
///       returns it as an attachment.
///
/// *   **`POST /download-all-documents-zip`**:
///     - **Handler**: `batch::process`
///     - **Description**: Fills every configured template, skipping the ones
///       that fail, and returns them in one zip archive.
pub fn configure_routes(cfg: &mut ServiceConfig) {
    cfg.route("/download-document/{doc_type}", post().to(generate::process))
        .route("/download-all-documents-zip", post().to(batch::process));
}
