//! Object keys and download names for generated documents.

use chrono::NaiveDateTime;

/// `DD_MM_YYYYTHH_MM_SS`, second resolution.
pub fn timestamp_label(at: NaiveDateTime) -> String {
    at.format("%d_%m_%YT%H_%M_%S").to_string()
}

/// `{stamp}_output.docx`, or `{stamp}_{doc_type}_output.docx`.
pub fn document_file_name(stamp: &str, doc_type: Option<&str>) -> String {
    match doc_type {
        Some(doc_type) => format!("{stamp}_{doc_type}_output.docx"),
        None => format!("{stamp}_output.docx"),
    }
}

pub fn archive_file_name(stamp: &str) -> String {
    format!("{stamp}_all_documents.zip")
}

/// Joins the configured prefix and a file name with exactly one `/`.
pub fn output_key(prefix: &str, file_name: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), file_name)
}
