//! YouTube transcript fetching.
//!
//! Reads the innertube API key from the watch page, asks the player endpoint
//! for caption tracks, then downloads and flattens the timedtext XML.

use crate::config::YoutubeConfig;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use scraper::Html;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use url::Url;

const YOUTUBE_BASE_URL: &str = "https://www.youtube.com";

/// Client identity sent to the player endpoint; the Android client still gets caption URLs
const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";

lazy_static! {
    static ref API_KEY_REGEX: Regex =
        Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#).unwrap();
}

#[derive(Error, Debug)]
pub enum YoutubeError {
    #[error("could not find a video id in {0}")]
    InvalidUrl(String),
    #[error("request to YouTube failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("YouTube is asking for a captcha, too many requests from this IP")]
    Blocked,
    #[error("could not find player data for video {0}")]
    NoPlayerData(String),
    #[error("video {video_id} is unavailable: {reason}")]
    Unplayable { video_id: String, reason: String },
    #[error("no transcript available for video {0}")]
    NoTranscript(String),
    #[error("failed to parse transcript: {0}")]
    ParseError(#[from] quick_xml::de::DeError),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    playability_status: Option<PlayabilityStatus>,
    captions: Option<Captions>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: String,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Captions {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    track_list: Option<TrackList>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackList {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
}

/// One caption track offered for a video
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    pub language_code: String,
    /// "asr" for auto-generated tracks
    #[serde(default)]
    pub kind: Option<String>,
}

impl CaptionTrack {
    pub fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

#[derive(Debug, Deserialize)]
struct TimedText {
    #[serde(rename = "text", default)]
    cues: Vec<Cue>,
}

#[derive(Debug, Deserialize)]
struct Cue {
    #[serde(rename = "$text", default)]
    text: String,
}

/// Fetches transcripts for YouTube videos
pub struct YoutubeClient {
    client: Client,
    base_url: String,
    languages: Vec<String>,
}

impl YoutubeClient {
    pub fn new(client: Client, config: &YoutubeConfig) -> Self {
        Self {
            client,
            base_url: YOUTUBE_BASE_URL.to_string(),
            languages: config.languages.clone(),
        }
    }

    /// Point the client at a different host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Fetch the transcript of the video at `url` as plain text
    pub async fn fetch_transcript(&self, url: &str) -> Result<String, YoutubeError> {
        let video_id = video_id(url).ok_or_else(|| YoutubeError::InvalidUrl(url.to_string()))?;
        tracing::debug!("fetching transcript for video {}", video_id);

        let watch_html = self
            .client
            .get(format!("{}/watch?v={}", self.base_url, video_id))
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let api_key = innertube_api_key(&watch_html).ok_or_else(|| {
            if watch_html.contains("class=\"g-recaptcha\"") {
                YoutubeError::Blocked
            } else {
                YoutubeError::NoPlayerData(video_id.clone())
            }
        })?;

        let player: PlayerResponse = self
            .client
            .post(format!("{}/youtubei/v1/player?key={}", self.base_url, api_key))
            .json(&json!({
                "context": {
                    "client": {
                        "clientName": INNERTUBE_CLIENT_NAME,
                        "clientVersion": INNERTUBE_CLIENT_VERSION,
                    }
                },
                "videoId": video_id,
            }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let tracks = caption_tracks(&video_id, player)?;
        let track = select_track(&tracks, &self.languages)
            .ok_or_else(|| YoutubeError::NoTranscript(video_id.clone()))?;
        tracing::debug!(
            "using {} caption track ({})",
            track.language_code,
            if track.is_generated() { "generated" } else { "manual" }
        );

        let xml = self
            .client
            .get(track.base_url.replace("&fmt=srv3", ""))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_timed_text(&xml)
    }
}

/// Pull the video id out of any of the usual YouTube URL shapes
pub fn video_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    let mut segments = parsed.path_segments()?.filter(|s| !s.is_empty());

    let id = if host == "youtu.be" || host.ends_with(".youtu.be") {
        segments.next().map(str::to_string)
    } else if host == "youtube.com" || host.ends_with(".youtube.com") {
        match segments.next() {
            Some("watch") => parsed
                .query_pairs()
                .find(|(k, _)| k == "v")
                .map(|(_, v)| v.into_owned()),
            Some("shorts" | "embed" | "live" | "v") => segments.next().map(str::to_string),
            _ => None,
        }
    } else {
        None
    };

    id.filter(|id| {
        !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    })
}

fn innertube_api_key(html: &str) -> Option<String> {
    API_KEY_REGEX
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn caption_tracks(video_id: &str, player: PlayerResponse) -> Result<Vec<CaptionTrack>, YoutubeError> {
    if let Some(status) = player.playability_status {
        if status.status != "OK" {
            return Err(YoutubeError::Unplayable {
                video_id: video_id.to_string(),
                reason: status.reason.unwrap_or(status.status),
            });
        }
    }

    let tracks = player
        .captions
        .and_then(|c| c.track_list)
        .map(|list| list.caption_tracks)
        .unwrap_or_default();

    if tracks.is_empty() {
        return Err(YoutubeError::NoTranscript(video_id.to_string()));
    }
    Ok(tracks)
}

/// Prefer a manual track in a wanted language, then a generated one, then whatever is first
pub fn select_track<'a>(tracks: &'a [CaptionTrack], languages: &[String]) -> Option<&'a CaptionTrack> {
    let wanted = |generated: bool| {
        languages.iter().find_map(|lang| {
            tracks
                .iter()
                .find(|t| t.language_code == *lang && t.is_generated() == generated)
        })
    };
    wanted(false).or_else(|| wanted(true)).or_else(|| tracks.first())
}

/// Flatten timedtext XML into a single line of text
pub fn parse_timed_text(xml: &str) -> Result<String, YoutubeError> {
    let timed: TimedText = quick_xml::de::from_str(xml)?;

    let text = timed
        .cues
        .iter()
        .map(|cue| {
            // Cue bodies are HTML-escaped a second time and may carry <font> tags
            let fragment = Html::parse_fragment(&cue.text);
            let plain: String = fragment.root_element().text().collect();
            plain.split_whitespace().collect::<Vec<_>>().join(" ")
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(lang: &str, kind: Option<&str>) -> CaptionTrack {
        CaptionTrack {
            base_url: format!("https://example.com/api/timedtext?lang={lang}"),
            language_code: lang.to_string(),
            kind: kind.map(str::to_string),
        }
    }

    #[test]
    fn video_id_from_common_url_shapes() {
        let id = Some("dQw4w9WgXcQ".to_string());
        assert_eq!(video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), id);
        assert_eq!(video_id("https://youtube.com/watch?feature=share&v=dQw4w9WgXcQ"), id);
        assert_eq!(video_id("https://m.youtube.com/watch?v=dQw4w9WgXcQ&t=42s"), id);
        assert_eq!(video_id("https://youtu.be/dQw4w9WgXcQ?si=abc"), id);
        assert_eq!(video_id("https://www.youtube.com/shorts/dQw4w9WgXcQ"), id);
        assert_eq!(video_id("https://www.youtube.com/embed/dQw4w9WgXcQ"), id);
        assert_eq!(video_id("https://www.youtube.com/live/dQw4w9WgXcQ"), id);
    }

    #[test]
    fn video_id_rejects_other_pages() {
        assert_eq!(video_id("https://www.youtube.com/"), None);
        assert_eq!(video_id("https://www.youtube.com/@channel"), None);
        assert_eq!(video_id("https://www.youtube.com/watch"), None);
        assert_eq!(video_id("https://example.com/watch?v=dQw4w9WgXcQ"), None);
        assert_eq!(video_id("https://notyoutube.com/watch?v=dQw4w9WgXcQ"), None);
        assert_eq!(video_id("https://www.youtube.com/watch?v=bad%20id"), None);
    }

    #[test]
    fn api_key_is_read_from_watch_page() {
        let html = r#"<script>ytcfg.set({"INNERTUBE_API_KEY": "AIzaSyA-key_123","OTHER":1});</script>"#;
        assert_eq!(innertube_api_key(html), Some("AIzaSyA-key_123".to_string()));
        assert_eq!(innertube_api_key("<html></html>"), None);
    }

    #[test]
    fn manual_track_in_wanted_language_wins() {
        let tracks = vec![
            track("de", None),
            track("en", Some("asr")),
            track("en", None),
        ];
        let chosen = select_track(&tracks, &["en".to_string()]).unwrap();
        assert_eq!(chosen.language_code, "en");
        assert!(!chosen.is_generated());
    }

    #[test]
    fn generated_track_used_when_no_manual_one() {
        let tracks = vec![track("de", None), track("en", Some("asr"))];
        let chosen = select_track(&tracks, &["en".to_string()]).unwrap();
        assert!(chosen.is_generated());
    }

    #[test]
    fn language_order_is_respected() {
        let tracks = vec![track("en", None), track("sv", None)];
        let langs = vec!["sv".to_string(), "en".to_string()];
        assert_eq!(select_track(&tracks, &langs).unwrap().language_code, "sv");
    }

    #[test]
    fn falls_back_to_first_track() {
        let tracks = vec![track("fr", None), track("de", None)];
        assert_eq!(
            select_track(&tracks, &["en".to_string()]).unwrap().language_code,
            "fr"
        );
        assert!(select_track(&[], &["en".to_string()]).is_none());
    }

    #[test]
    fn player_response_yields_tracks() {
        let body = r#"{
            "playabilityStatus": {"status": "OK"},
            "captions": {"playerCaptionsTracklistRenderer": {"captionTracks": [
                {"baseUrl": "https://www.youtube.com/api/timedtext?v=x&lang=en", "languageCode": "en", "kind": "asr"}
            ]}}
        }"#;
        let player: PlayerResponse = serde_json::from_str(body).unwrap();
        let tracks = caption_tracks("x", player).unwrap();
        assert_eq!(tracks.len(), 1);
        assert!(tracks[0].is_generated());
    }

    #[test]
    fn video_without_captions_has_no_transcript() {
        let player: PlayerResponse =
            serde_json::from_str(r#"{"playabilityStatus": {"status": "OK"}}"#).unwrap();
        assert!(matches!(
            caption_tracks("x", player),
            Err(YoutubeError::NoTranscript(id)) if id == "x"
        ));
    }

    #[test]
    fn unplayable_video_reports_reason() {
        let player: PlayerResponse = serde_json::from_str(
            r#"{"playabilityStatus": {"status": "ERROR", "reason": "Video unavailable"}}"#,
        )
        .unwrap();
        let err = caption_tracks("x", player).unwrap_err();
        assert_eq!(err.to_string(), "video x is unavailable: Video unavailable");
    }

    #[test]
    fn timed_text_is_flattened_and_unescaped() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?><transcript>
            <text start="0.0" dur="1.5">Hello there</text>
            <text start="1.5" dur="2.0">it&amp;#39;s a
 test</text>
            <text start="3.5" dur="1.0"></text>
            <text start="4.5" dur="1.0">&lt;font color=&quot;#E5E5E5&quot;&gt;fish&lt;/font&gt; &amp;amp; chips</text>
        </transcript>"#;
        assert_eq!(
            parse_timed_text(xml).unwrap(),
            "Hello there it's a test fish & chips"
        );
    }

    #[test]
    fn malformed_timed_text_is_an_error() {
        assert!(matches!(
            parse_timed_text("<transcript><text>unclosed"),
            Err(YoutubeError::ParseError(_))
        ));
    }
}
