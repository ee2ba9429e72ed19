//! # ssai
//!
//! Summarise a web page, a PDF, or a YouTube video with an LLM and put the
//! result on the clipboard.
//!
//! ## Pipeline
//!
//! - **Classify**: `target::classify` decides between PDF path, YouTube link and website
//! - **Extract**: `extract::Extractor` pulls raw text with pdf-extract, the YouTube transcript endpoints, or scraper
//! - **Summarise**: `agent::summarize` sends one prompt and parses the JSON reply
//! - **Output**: `SummaryResult::render` plus `clipboard::copy_to_clipboard`

pub mod agent;
pub mod clipboard;
pub mod config;
pub mod extract;
pub mod pdf;
pub mod scraper;
pub mod summary;
pub mod target;
pub mod youtube;

pub use config::Config;
pub use extract::{ExtractedDocument, Extractor};
pub use summary::SummaryResult;
pub use target::SourceKind;
