//! PDF page-text extraction boundary.
//!
//! Converts uploaded PDF bytes into an ordered list of plain page texts —
//! the only shape the rest of the pipeline depends on. Page text is
//! whitespace-normalized on the way in so segmentation sees clean input.

/// Extraction error. Fatal to the registration attempt that triggered it;
/// nothing is indexed and the document list is unchanged.
#[derive(Debug)]
pub enum ExtractError {
    Pdf(String),
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractError::Pdf(e) => write!(f, "PDF extraction failed: {}", e),
        }
    }
}

impl std::error::Error for ExtractError {}

/// Extract the text of every page, in reading order. Pages without text
/// come back as empty strings; they keep their position so page numbers
/// stay aligned with the source document.
pub fn extract_pages(bytes: &[u8]) -> Result<Vec<String>, ExtractError> {
    let raw = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| ExtractError::Pdf(e.to_string()))?;
    Ok(raw.iter().map(|text| normalize_whitespace(text)).collect())
}

/// Number of pages in the document, or 0 when the bytes cannot be parsed.
/// Failures are swallowed here: callers use this for display only.
pub fn page_count(bytes: &[u8]) -> usize {
    pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map(|pages| pages.len())
        .unwrap_or(0)
}

/// Collapse runs of whitespace (including newlines from PDF layout) into
/// single spaces and trim the ends.
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
