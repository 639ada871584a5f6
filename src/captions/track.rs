//! Caption track selection
//!
//! A video usually offers several caption tracks. The practice transcript uses
//! the preferred language when present and falls back to auto-generated or
//! simply the first available track.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static VIDEO_ID_PARAM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[?&]v=([^&#]+)").expect("valid regex"));

/// A caption track advertised by the player
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub language_code: String,
    /// `Some("asr")` for auto-generated tracks
    #[serde(default)]
    pub kind: Option<String>,
}

impl CaptionTrack {
    pub fn is_auto_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

/// Pick the track to practice with.
///
/// Order of preference:
/// 1. Exact `preferred` language code
/// 2. A language code starting with `preferred` (e.g. `en-GB` for `en`)
/// 3. An auto-generated track
/// 4. The first track
///
/// Tracks without a base URL cannot be fetched and are never returned.
///
/// # Example
/// ```rust
/// use shadowing::captions::{select_track, CaptionTrack};
///
/// let tracks = vec![
///     CaptionTrack { base_url: "u1".into(), language_code: "de".into(), kind: None },
///     CaptionTrack { base_url: "u2".into(), language_code: "en-GB".into(), kind: None },
/// ];
/// assert_eq!(select_track(&tracks, "en").unwrap().language_code, "en-GB");
/// ```
pub fn select_track<'a>(tracks: &'a [CaptionTrack], preferred: &str) -> Option<&'a CaptionTrack> {
    let track = tracks
        .iter()
        .find(|t| t.language_code == preferred)
        .or_else(|| {
            tracks
                .iter()
                .find(|t| !t.language_code.is_empty() && t.language_code.starts_with(preferred))
        })
        .or_else(|| tracks.iter().find(|t| t.is_auto_generated()))
        .or_else(|| tracks.first())?;

    if track.base_url.is_empty() {
        None
    } else {
        Some(track)
    }
}

/// Timed-text request URL for a track, asking for the JSON event format.
pub fn caption_request_url(track: &CaptionTrack, token: Option<&str>) -> String {
    let token_param = token.map(|t| format!("&pot={}", t)).unwrap_or_default();
    format!(
        "{}&fmt=json3{}&c=WEB&lang={}",
        track.base_url, token_param, track.language_code
    )
}

/// The `v` query parameter of a watch or timed-text URL.
pub fn video_id_from_url(url: &str) -> Option<String> {
    VIDEO_ID_PARAM
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}
