//! # Document Substitution Engine
//!
//! Fills placeholders inside `.docx` templates.
//!
//! ## Workflow
//!
//! 1.  **Load**: `render_template` reads the template file; `substitute` opens
//!     the bytes as a zip package (`package`) and pulls out
//!     `word/document.xml`.
//!
//! 2.  **Locate**: every leaf `<w:p>` in the part is found and tagged as a body
//!     paragraph or a table-cell paragraph (`substitute::locate_paragraphs`).
//!     Paragraphs that contain other paragraphs (text boxes) are not rebuilt
//!     whole; their inner paragraphs are, and so are the groups of their own
//!     runs on either side of the text box.
//!
//! 3.  **Replace**: each paragraph is viewed through `TextContainer`. If its
//!     text contains a placeholder, all placeholders are replaced in a single
//!     pass (values are never rescanned) and the paragraph is rebuilt as a
//!     single run carrying the first run's font, size, bold, italic, underline
//!     and color. Paragraphs without a
//!     placeholder are copied byte for byte.
//!
//! 4.  **Save**: the part is written back and the package re-zipped in the
//!     original entry order.

pub mod package;
pub mod paragraph;
pub mod substitute;
pub(crate) mod xml;

pub use substitute::render_template;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocxError {
    #[error("Template file not found: {}", .0.display())]
    TemplateNotFound(PathBuf),
    #[error("failed to read template {}: {source}", path.display())]
    TemplateIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid docx archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("docx package has no word/document.xml")]
    MissingDocumentPart,
    #[error("document part is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
    #[error("docx I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
