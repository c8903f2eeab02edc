//! Document loading: raw files to normalized text units.

use crate::types::TextUnit;
use docqa_core::{AppError, AppResult};
use std::fmt;
use std::path::Path;

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// One text unit per page
    Pdf,
    /// One text unit for the whole file
    Text,
}

impl DocumentFormat {
    /// Resolve the format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> AppResult<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "txt" => Ok(Self::Text),
            other => Err(AppError::UnsupportedFormat(if other.is_empty() {
                "<no extension>".to_string()
            } else {
                other.to_string()
            })),
        }
    }

    pub fn from_path(path: &Path) -> AppResult<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        Self::from_extension(ext)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Load a file into text units tagged with their provenance.
///
/// This is blocking I/O; async callers should run it on a blocking thread.
pub fn load_document(path: &Path) -> AppResult<Vec<TextUnit>> {
    let format = DocumentFormat::from_path(path)?;
    let source = path.to_string_lossy().to_string();

    tracing::debug!(path = %source, %format, "Loading document");

    match format {
        DocumentFormat::Text => load_text(path, source),
        DocumentFormat::Pdf => load_pdf(path, source),
    }
}

fn load_text(path: &Path, source: String) -> AppResult<Vec<TextUnit>> {
    let text = std::fs::read_to_string(path)?;
    Ok(vec![TextUnit::new(text, source)])
}

fn load_pdf(path: &Path, source: String) -> AppResult<Vec<TextUnit>> {
    let doc = lopdf::Document::load(path)
        .map_err(|e| AppError::Other(format!("Failed to load PDF {:?}: {}", path, e)))?;
    Ok(pdf_pages(&doc, &source))
}

/// Extract one unit per page, numbered from 1 in document order.
///
/// A page whose text cannot be extracted still yields an (empty) unit so page
/// numbering stays aligned with the document.
pub fn pdf_pages(doc: &lopdf::Document, source: &str) -> Vec<TextUnit> {
    doc.get_pages()
        .keys()
        .map(|&page_number| {
            let text = match doc.extract_text(&[page_number]) {
                Ok(text) => text.trim().to_string(),
                Err(e) => {
                    tracing::warn!(source, page_number, "Could not extract page text: {}", e);
                    String::new()
                }
            };
            TextUnit::new(text, source).with_page(page_number)
        })
        .collect()
}
