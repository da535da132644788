//! `.docx` zip package I/O.

use crate::docx::DocxError;
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const DOCUMENT_PART: &str = "word/document.xml";

/// A `.docx` package held in memory as its ordered zip entries.
pub struct DocxPackage {
    entries: Vec<(String, Vec<u8>)>,
}

impl DocxPackage {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DocxError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let name = entry.name().to_string();
            let mut data = Vec::new();
            entry.read_to_end(&mut data)?;
            entries.push((name, data));
        }
        Ok(Self { entries })
    }

    pub fn document_xml(&self) -> Result<String, DocxError> {
        let (_, data) = self
            .entries
            .iter()
            .find(|(name, _)| name == DOCUMENT_PART)
            .ok_or(DocxError::MissingDocumentPart)?;
        Ok(String::from_utf8(data.clone())?)
    }

    pub fn set_document_xml(&mut self, xml: String) {
        match self.entries.iter_mut().find(|(name, _)| name == DOCUMENT_PART) {
            Some((_, data)) => *data = xml.into_bytes(),
            None => self.entries.push((DOCUMENT_PART.to_string(), xml.into_bytes())),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DocxError> {
        write_archive(&self.entries)
    }
}

/// Writes `(name, bytes)` entries into a new zip, keeping their order.
///
/// Media files are stored and everything else deflated, the layout Word
/// itself produces.
pub fn write_archive(entries: &[(String, Vec<u8>)]) -> Result<Vec<u8>, DocxError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (name, data) in entries {
        let options = if name.starts_with("word/media/") {
            stored
        } else {
            deflated
        };
        zip.start_file(name.as_str(), options)?;
        zip.write_all(data)?;
    }
    Ok(zip.finish()?.into_inner())
}
