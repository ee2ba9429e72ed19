//! Local PDF text extraction.
//!
//! Uses pdf-extract for page-by-page text.

use std::panic;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("error reading PDF file at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("error reading PDF file at {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },
}

/// Anything that can hand out the text of its pages in order
pub trait PageSource {
    fn page_texts(&self) -> Result<Vec<String>, PdfError>;
}

/// A PDF document on disk
#[derive(Debug, Clone)]
pub struct PdfFile {
    path: PathBuf,
}

impl PdfFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PageSource for PdfFile {
    fn page_texts(&self) -> Result<Vec<String>, PdfError> {
        let bytes = std::fs::read(&self.path).map_err(|source| PdfError::Io {
            path: self.path.clone(),
            source,
        })?;

        // pdf-extract panics on some malformed documents
        let pages = quietly(|| pdf_extract::extract_text_from_mem_by_pages(&bytes))
            .map_err(|payload| PdfError::Unreadable {
                path: self.path.clone(),
                reason: panic_message(payload.as_ref()),
            })?
            .map_err(|e| PdfError::Unreadable {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        tracing::debug!("read {} pages from {}", pages.len(), self.path.display());
        Ok(pages)
    }
}

/// Concatenate the text of every page, in order, with no separator
pub fn extract_text<S: PageSource + ?Sized>(source: &S) -> Result<String, PdfError> {
    Ok(source.page_texts()?.concat())
}

/// Run `f`, turning a panic into an `Err` without the default hook printing it
fn quietly<F, R>(f: F) -> std::thread::Result<R>
where
    F: FnOnce() -> R + panic::UnwindSafe,
{
    let previous = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let outcome = panic::catch_unwind(f);
    panic::set_hook(previous);
    outcome
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "PDF parser panicked".to_string()
    }
}
