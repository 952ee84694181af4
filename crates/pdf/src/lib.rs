use std::ops::Range;

use serde::Serialize;
use thiserror::Error;

use parser::backend::{LopdfBackend, PdfBackend};

pub mod parser;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF parsing error: {0}")]
    Parse(String),
    #[error("Document is encrypted")]
    Encrypted,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Text fragments of one physical page, in reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageText {
    /// 1-based physical page number.
    pub number: usize,
    pub fragments: Vec<String>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// A loaded PDF document.
///
/// Constructed via [`PlansDocument::from_bytes`]. Pages are laid out on demand.
pub struct PlansDocument {
    backend: LopdfBackend,
}

impl PlansDocument {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PdfError> {
        Ok(Self {
            backend: LopdfBackend::load_bytes(bytes)?,
        })
    }

    pub fn page_count(&self) -> usize {
        self.backend.page_count()
    }

    /// Fragments for the selected pages (0-based index range), or every page.
    ///
    /// A page whose content stream cannot be read comes back with no
    /// fragments rather than failing the whole document.
    pub fn pages(&self, indices: Option<Range<usize>>) -> Vec<PageText> {
        extract_with(&self.backend, indices)
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn extract_with(backend: &dyn PdfBackend, indices: Option<Range<usize>>) -> Vec<PageText> {
    backend
        .select_pages(indices)
        .into_iter()
        .map(|(number, page_id)| {
            let fragments = match parser::layout::extract_page_fragments(backend, page_id) {
                Ok(fragments) => fragments,
                Err(e) => {
                    log::warn!("page {}: {}", number, e);
                    Vec::new()
                }
            };
            log::debug!("page {}: {} fragments", number, fragments.len());
            PageText {
                number: number as usize,
                fragments,
            }
        })
        .collect()
}
