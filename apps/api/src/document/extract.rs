use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::debug;

use super::DocumentError;

/// Plain text of every page, in page order.
///
/// pdf_extract can panic on malformed input, so the call is isolated and a
/// panic is reported as a format error like any other parse failure.
pub fn extract_pages(bytes: &[u8]) -> Result<Vec<String>, DocumentError> {
    let result = catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    }));

    match result {
        Ok(Ok(pages)) => {
            debug!(pages = pages.len(), "Extracted PDF text");
            Ok(pages)
        }
        Ok(Err(e)) => Err(DocumentError::Format(format!("failed to extract PDF text: {e}"))),
        Err(_) => Err(DocumentError::Format(
            "failed to extract PDF text: malformed document".to_string(),
        )),
    }
}

/// Resume text: trimmed non-empty pages joined by a blank line.
pub fn extract_text(bytes: &[u8]) -> Result<String, DocumentError> {
    let pages = extract_pages(bytes)?;
    Ok(join_pages(&pages))
}

fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
