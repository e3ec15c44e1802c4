use crate::clipboard::ClipboardSink;
use crate::config::MAX_SUGGESTIONS;
use std::time::{Duration, Instant};

/// Lifetime of the suggestion popup
#[derive(Debug, Clone, Copy)]
pub struct PopupTimings {
    pub timeout: Duration,
    pub copy_confirm: Duration,
}

/// What the user did inside the popup this frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupAction {
    None,
    Copy(String),
    AddToDictionary,
    Close,
}

#[derive(Debug, Clone)]
pub struct SuggestionPopup {
    word: String,
    suggestions: Vec<String>,
    opened_at: Instant,
    copied: Option<(String, Instant)>,
    timings: PopupTimings,
}

impl SuggestionPopup {
    /// A popup for `word`, or `None` when there is nothing to suggest
    pub fn open(
        word: String,
        mut suggestions: Vec<String>,
        now: Instant,
        timings: PopupTimings,
    ) -> Option<Self> {
        if suggestions.is_empty() {
            return None;
        }
        suggestions.truncate(MAX_SUGGESTIONS);

        Some(Self {
            word,
            suggestions,
            opened_at: now,
            copied: None,
            timings,
        })
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    /// The suggestion just copied, for the confirmation line
    pub fn copied(&self) -> Option<&str> {
        self.copied.as_ref().map(|(text, _)| text.as_str())
    }

    /// Copy a suggestion; clipboard failures are logged and otherwise ignored
    pub fn copy(&mut self, suggestion: &str, clipboard: &mut dyn ClipboardSink, now: Instant) {
        match clipboard.copy_text(suggestion) {
            Ok(()) => {
                tracing::info!(suggestion, "copied suggestion to clipboard");
                self.copied = Some((suggestion.to_string(), now));
            }
            Err(e) => tracing::warn!(error = %e, "could not copy suggestion"),
        }
    }

    /// When the popup is due to close on its own
    pub fn deadline(&self) -> Instant {
        let timeout = self.opened_at + self.timings.timeout;
        match &self.copied {
            Some((_, at)) => timeout.min(*at + self.timings.copy_confirm),
            None => timeout,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.deadline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::testing::RecordingClipboard;

    fn timings() -> PopupTimings {
        PopupTimings {
            timeout: Duration::from_secs(3),
            copy_confirm: Duration::from_secs(1),
        }
    }

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_popup_without_suggestions() {
        assert!(SuggestionPopup::open("xyz".into(), Vec::new(), Instant::now(), timings()).is_none());
    }

    #[test]
    fn test_suggestions_capped_at_three() {
        let popup = SuggestionPopup::open(
            "cta".into(),
            words(&["cat", "act", "cut", "cot"]),
            Instant::now(),
            timings(),
        )
        .unwrap();
        assert_eq!(popup.suggestions(), &["cat", "act", "cut"]);
    }

    #[test]
    fn test_auto_close_after_timeout() {
        let now = Instant::now();
        let popup = SuggestionPopup::open("cta".into(), words(&["cat"]), now, timings()).unwrap();
        assert!(!popup.is_expired(now + Duration::from_millis(2999)));
        assert!(popup.is_expired(now + Duration::from_secs(3)));
    }

    #[test]
    fn test_copy_confirms_then_closes() {
        let now = Instant::now();
        let mut clipboard = RecordingClipboard::default();
        let mut popup =
            SuggestionPopup::open("cta".into(), words(&["cat", "act"]), now, timings()).unwrap();

        let clicked = now + Duration::from_millis(500);
        popup.copy("act", &mut clipboard, clicked);

        assert_eq!(clipboard.copied, vec!["act"]);
        assert_eq!(popup.copied(), Some("act"));
        assert_eq!(popup.deadline(), clicked + Duration::from_secs(1));
    }

    #[test]
    fn test_copy_late_keeps_original_timeout() {
        let now = Instant::now();
        let mut clipboard = RecordingClipboard::default();
        let mut popup = SuggestionPopup::open("cta".into(), words(&["cat"]), now, timings()).unwrap();

        popup.copy("cat", &mut clipboard, now + Duration::from_millis(2500));
        assert_eq!(popup.deadline(), now + Duration::from_secs(3));
    }

    #[test]
    fn test_failed_copy_is_swallowed() {
        let now = Instant::now();
        let mut clipboard = RecordingClipboard {
            fail: true,
            ..Default::default()
        };
        let mut popup = SuggestionPopup::open("cta".into(), words(&["cat"]), now, timings()).unwrap();

        popup.copy("cat", &mut clipboard, now);
        assert_eq!(popup.copied(), None);
        assert_eq!(popup.deadline(), now + Duration::from_secs(3));
    }
}
