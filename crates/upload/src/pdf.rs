//! PDF page-count capping.

use lopdf::Document;

/// Documents are truncated to this many pages before upload.
const MAX_PAGES: usize = 100;

/// Cap a PDF at [`MAX_PAGES`] pages.
///
/// Documents at or under the cap, and documents that fail to parse or
/// rewrite, come back as the original bytes unmodified — truncation is
/// best-effort and silent.
pub(crate) fn cap_pages(bytes: Vec<u8>) -> Vec<u8> {
    match truncate(&bytes) {
        Ok(Some(truncated)) => truncated,
        Ok(None) => bytes,
        Err(e) => {
            tracing::warn!("pdf processing error: {e}");
            bytes
        }
    }
}

fn truncate(bytes: &[u8]) -> Result<Option<Vec<u8>>, lopdf::Error> {
    let mut doc = Document::load_mem(bytes)?;
    let pages = doc.get_pages();
    if pages.len() <= MAX_PAGES {
        return Ok(None);
    }

    let excess: Vec<u32> = pages
        .keys()
        .copied()
        .filter(|page| *page > MAX_PAGES as u32)
        .collect();
    doc.delete_pages(&excess);

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(Some(out))
}
