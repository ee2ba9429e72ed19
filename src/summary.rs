//! SummaryResult - the parsed reply from the LLM and how it is rendered.

use serde_json::Value;
use thiserror::Error;

/// Title used when the model leaves it out
pub const TITLE_PLACEHOLDER: &str = "Title Not Found";

#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("reply is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("reply is not a JSON object")]
    NotAnObject,
    #[error("reply has no \"summary\" string")]
    MissingSummary,
}

/// Title and body of a generated summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryResult {
    pub title: String,
    pub summary: String,
}

impl SummaryResult {
    /// Parse a model reply.
    ///
    /// The reply is untrusted: it must be a JSON object with a string
    /// `summary`; a missing or non-string `title` becomes the placeholder.
    pub fn from_reply(reply: &str) -> Result<Self, SummaryError> {
        let cleaned = strip_markdown_json(reply);
        let value: Value = serde_json::from_str(cleaned)?;
        let object = value.as_object().ok_or(SummaryError::NotAnObject)?;

        let summary = object
            .get("summary")
            .and_then(Value::as_str)
            .ok_or(SummaryError::MissingSummary)?;
        let title = object
            .get("title")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(TITLE_PLACEHOLDER);

        Ok(Self {
            title: title.to_string(),
            summary: summary.trim().to_string(),
        })
    }

    /// Render the block that ends up on the clipboard
    pub fn render(&self, target: &str) -> String {
        format!(
            "{}\n\n{}\n\nSource: {}\n",
            self.title,
            self.summary.replace("\\n", "\n"),
            target
        )
    }
}

/// Strip markdown code block wrappers from a JSON reply
fn strip_markdown_json(text: &str) -> &str {
    let trimmed = text.trim();

    // Remove ```json ... ``` or ``` ... ```
    if let Some(without_prefix) = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
    {
        if let Some(end_idx) = without_prefix.rfind("```") {
            return without_prefix[..end_idx].trim();
        }
    }

    trimmed
}
