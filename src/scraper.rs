//! Web scraping module for website extraction.
//!
//! Uses reqwest for fetching and scraper for HTML parsing.

use lazy_static::lazy_static;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use thiserror::Error;

/// User-Agent string identifying this scraper
pub const USER_AGENT: &str = concat!("ssai/", env!("CARGO_PKG_VERSION"));

/// Default timeout for HTTP requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

lazy_static! {
    static ref PARAGRAPH: Selector = Selector::parse("p").unwrap();
}

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("error fetching URL {url}: {source}")]
    FetchError {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Create a configured HTTP client for scraping
pub fn create_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
}

/// Fetch a page and return the text of its paragraphs.
///
/// An unsuccessful status is an error; a page without paragraphs is not.
pub async fn fetch_paragraphs(client: &Client, url: &str) -> Result<String, ScraperError> {
    let fetch_error = |source| ScraperError::FetchError {
        url: url.to_string(),
        source,
    };

    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(fetch_error)?;
    let html = response.text().await.map_err(fetch_error)?;
    tracing::debug!("fetched {} bytes from {}", html.len(), url);

    Ok(extract_paragraphs(&html))
}

/// Join the text content of every `<p>` element with single spaces
pub fn extract_paragraphs(html: &str) -> String {
    let document = Html::parse_document(html);
    document
        .select(&PARAGRAPH)
        .map(|p| p.text().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}
