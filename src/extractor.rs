use lopdf::Document;
use std::path::Path;
use tracing::{debug, info};

use crate::error::ExtractionError;
use crate::log_processing_start;

/// Basic facts about a loaded PDF, logged before extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfInfo {
    pub page_count: usize,
    pub file_size_bytes: u64,
}

/// Extracts the full text of the PDF at `path`.
///
/// Pages are visited in page-number order and their text is concatenated
/// without any separator added between pages.
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String, ExtractionError> {
    let path = path.as_ref();
    let path_str = path.display().to_string();

    let bytes = std::fs::read(path).map_err(|e| ExtractionError::FileIO {
        path: path_str.clone(),
        source: e,
    })?;

    log_processing_start!(path_str, bytes.len());

    let mut document = Document::load_mem(&bytes).map_err(|e| ExtractionError::Parse {
        path: path_str.clone(),
        message: e.to_string(),
    })?;

    if document.is_encrypted() {
        // Permissions-only PDFs open with the empty user password
        if let Err(e) = document.decrypt("") {
            debug!(error = %e, "Empty user password rejected");
            return Err(ExtractionError::Encrypted { path: path_str });
        }
        info!(file = %path_str, "Decrypted PDF with empty user password");
    }

    let info = PdfInfo {
        page_count: document.get_pages().len(),
        file_size_bytes: bytes.len() as u64,
    };
    debug!(pages = info.page_count, size_bytes = info.file_size_bytes, "Loaded PDF");

    concat_pages(&document)
}

/// Page text in document order, no separators.
pub fn concat_pages(document: &Document) -> Result<String, ExtractionError> {
    let mut text = String::new();

    // get_pages is keyed by page number, so iteration is already in order
    for page_number in document.get_pages().keys() {
        let page_text = document
            .extract_text(&[*page_number])
            .map_err(|e| ExtractionError::Page {
                page: *page_number,
                message: e.to_string(),
            })?;
        debug!(page = page_number, chars = page_text.chars().count(), "Extracted page");
        text.push_str(&page_text);
    }

    Ok(text)
}
