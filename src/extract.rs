//! Turns a classified target into raw text.

use crate::config::Config;
use crate::pdf::{self, PdfError, PdfFile};
use crate::scraper::{self, ScraperError};
use crate::target::SourceKind;
use crate::youtube::{YoutubeClient, YoutubeError};
use reqwest::Client;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error(transparent)]
    Pdf(#[from] PdfError),
    #[error(transparent)]
    Youtube(#[from] YoutubeError),
    #[error(transparent)]
    Website(#[from] ScraperError),
    #[error("failed to create HTTP client: {0}")]
    ClientError(#[from] reqwest::Error),
}

/// Raw text pulled from a target, tagged with where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    pub source: SourceKind,
    pub text: String,
}

/// Dispatches a target to the PDF, YouTube or website extractor
pub struct Extractor {
    http: Client,
    youtube: YoutubeClient,
}

impl Extractor {
    pub fn new(config: &Config) -> Result<Self, ExtractError> {
        let http = scraper::create_client()?;
        let youtube = YoutubeClient::new(http.clone(), &config.youtube);
        Ok(Self { http, youtube })
    }

    /// Extract the text of `target` using the extractor for `source`
    pub async fn extract(
        &self,
        target: &str,
        source: SourceKind,
    ) -> Result<ExtractedDocument, ExtractError> {
        let text = match source {
            SourceKind::Pdf => pdf::extract_text(&PdfFile::new(target))?,
            SourceKind::Youtube => self.youtube.fetch_transcript(target).await?,
            SourceKind::Website => scraper::fetch_paragraphs(&self.http, target).await?,
        };
        tracing::debug!("extracted {} characters ({})", text.len(), source);

        Ok(ExtractedDocument { source, text })
    }
}
