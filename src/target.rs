//! Target classification.
//!
//! A target is either a URL (website or YouTube video) or a local PDF path.

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

lazy_static! {
    /// Conservative URL check: scheme, host (domain, localhost, IPv4 or IPv6),
    /// optional port, optional path. Anything else is treated as a file path.
    static ref URL_REGEX: Regex = Regex::new(concat!(
        r"(?i)^(?:http|ftp)s?://",
        r"(?:(?:[A-Z0-9](?:[A-Z0-9-]{0,61}[A-Z0-9])?\.)+(?:[A-Z]{2,6}\.?|[A-Z0-9-]{2,}\.?)|",
        r"localhost|",
        r"\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}|",
        r"\[?[A-F0-9]*:[A-F0-9:]+\]?)",
        r"(?::\d+)?",
        r"(?:/?|[/?]\S+)$",
    ))
    .unwrap();
}

/// Where the text of a target comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Pdf,
    Youtube,
    Website,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Pdf => "pdf",
            SourceKind::Youtube => "youtube",
            SourceKind::Website => "website",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check if the given string is a well-formed URL
pub fn is_url(target: &str) -> bool {
    URL_REGEX.is_match(target)
}

/// Decide which extractor handles `target`
pub fn classify(target: &str) -> SourceKind {
    if !is_url(target) {
        SourceKind::Pdf
    } else if target.contains("youtube.com") || target.contains("youtu.be") {
        SourceKind::Youtube
    } else {
        SourceKind::Website
    }
}
