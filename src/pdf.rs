use std::panic::{self, AssertUnwindSafe};

use anyhow::{anyhow, Result};

/// Extract one `String` of text per page from a PDF byte slice.
///
/// The underlying library can panic on malformed input rather than return an
/// error, so the call is wrapped in `catch_unwind` and panics surface as
/// ordinary errors.
pub fn page_texts(data: &[u8]) -> Result<Vec<String>> {
    let data = data.to_vec(); // owned copy for the unwind boundary
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(&data)
    }));
    match result {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(anyhow!("PDF text extraction failed: {e}")),
        Err(_) => Err(anyhow!("PDF extraction panicked (malformed document)")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_are_an_error() {
        assert!(page_texts(b"not a pdf at all").is_err());
    }

    #[test]
    fn bare_pdf_header_is_an_error() {
        assert!(page_texts(b"%PDF-1.4\n%%EOF\n").is_err());
    }
}
