use crate::storage::{BlobStore, StoreError};
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::HttpResponse;
use mime_guess::from_path;

/// A stored object ready to be sent as a download.
#[derive(Debug)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    /// Reads `key` back from the store through a temporary file.
    pub fn fetch(
        store: &dyn BlobStore,
        bucket: &str,
        key: &str,
        filename: &str,
    ) -> Result<Self, StoreError> {
        let temp = store.download_to_temp(bucket, key)?;
        let bytes = std::fs::read(temp.path())?;
        Ok(Self {
            filename: filename.to_string(),
            content_type: from_path(filename).first_or_octet_stream().to_string(),
            bytes,
        })
    }

    pub fn into_response(self) -> HttpResponse {
        HttpResponse::Ok()
            .content_type(self.content_type)
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(self.filename)],
            })
            .body(self.bytes)
    }
}
