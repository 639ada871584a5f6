//! Per-video store for the access token the player attaches to caption
//! requests.
//!
//! The token is observed on the player's own timed-text requests and reused
//! for ours. It is scoped to a video: switching videos keeps only the new
//! video's entry.

use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

#[cfg(feature = "async")]
use std::time::Duration;
#[cfg(feature = "async")]
use tokio::sync::Notify;

use crate::captions::video_id_from_url;

static POT_PARAM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[?&]pot=([^&#]+)").expect("valid regex"));

#[derive(Debug, Default)]
pub struct CaptionTokenStore {
    tokens: Mutex<HashMap<String, String>>,
    #[cfg(feature = "async")]
    captured: Notify,
}

impl CaptionTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the token carried by a timed-text request URL.
    ///
    /// The token is filed under the URL's `v` parameter, or under
    /// `active_video` when the URL has none. Returns the video id the token
    /// was stored for.
    pub fn capture_from_url(&self, url: &str, active_video: Option<&str>) -> Option<String> {
        if !url.contains("timedtext") {
            return None;
        }
        let token = POT_PARAM.captures(url)?.get(1)?.as_str().to_string();
        let video_id = video_id_from_url(url).or_else(|| active_video.map(str::to_string))?;

        info!("captured caption token for {}", video_id);
        self.insert(video_id.clone(), token);
        Some(video_id)
    }

    pub fn insert(&self, video_id: impl Into<String>, token: impl Into<String>) {
        self.tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(video_id.into(), token.into());
        #[cfg(feature = "async")]
        self.captured.notify_waiters();
    }

    pub fn get(&self, video_id: &str) -> Option<String> {
        self.tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(video_id)
            .cloned()
    }

    /// Drop every token except `video_id`'s.
    pub fn retain_only(&self, video_id: &str) {
        let mut tokens = self.tokens.lock().unwrap_or_else(PoisonError::into_inner);
        let before = tokens.len();
        tokens.retain(|k, _| k == video_id);
        if tokens.len() != before {
            debug!("dropped {} caption tokens", before - tokens.len());
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wait until a token for `video_id` is captured.
    ///
    /// Resolves immediately when one is already stored, and to `None` once
    /// `timeout` elapses without one.
    #[cfg(feature = "async")]
    pub async fn wait_for(&self, video_id: &str, timeout: Duration) -> Option<String> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let notified = self.captured.notified();
            tokio::pin!(notified);
            // Register before checking so a capture in between is not missed
            notified.as_mut().enable();

            if let Some(token) = self.get(video_id) {
                return Some(token);
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                debug!("no caption token for {} within {:?}", video_id, timeout);
                return self.get(video_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://www.youtube.com/api/timedtext?v=abc123&ei=x&pot=TOKEN42&lang=en";

    #[test]
    fn test_capture_from_timedtext_url() {
        let store = CaptionTokenStore::new();
        assert_eq!(store.capture_from_url(URL, None), Some("abc123".to_string()));
        assert_eq!(store.get("abc123"), Some("TOKEN42".to_string()));
    }

    #[test]
    fn test_capture_uses_active_video_without_v_param() {
        let store = CaptionTokenStore::new();
        let url = "https://www.youtube.com/api/timedtext?pot=T1&lang=en";
        assert_eq!(store.capture_from_url(url, Some("vid")), Some("vid".to_string()));
        assert_eq!(store.get("vid"), Some("T1".to_string()));

        let store = CaptionTokenStore::new();
        assert_eq!(store.capture_from_url(url, None), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_capture_ignores_other_urls() {
        let store = CaptionTokenStore::new();
        assert_eq!(store.capture_from_url("https://example.test/watch?v=a&pot=x", None), None);
        assert_eq!(store.capture_from_url("https://www.youtube.com/api/timedtext?v=a", None), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_retain_only() {
        let store = CaptionTokenStore::new();
        store.insert("a", "1");
        store.insert("b", "2");
        store.retain_only("b");
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a"), None);
        assert_eq!(store.get("b"), Some("2".to_string()));
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn test_wait_for_existing_token() {
        let store = CaptionTokenStore::new();
        store.insert("a", "1");
        let token = store.wait_for("a", Duration::from_millis(10)).await;
        assert_eq!(token, Some("1".to_string()));
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn test_wait_for_times_out() {
        let store = CaptionTokenStore::new();
        store.insert("other", "1");
        let token = store.wait_for("a", Duration::from_millis(20)).await;
        assert_eq!(token, None);
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn test_wait_for_wakes_on_capture() {
        use std::sync::Arc;

        let store = Arc::new(CaptionTokenStore::new());
        let waiter = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.wait_for("abc123", Duration::from_secs(5)).await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        store.insert("unrelated", "x");
        store.capture_from_url(URL, None);

        let token = waiter.await.unwrap();
        assert_eq!(token, Some("TOKEN42".to_string()));
    }
}
