//! Typing session state owned by the UI thread.
//!
//! Key inputs come in one at a time from the listener channel; completed words
//! run through the checker and may produce a popup request.

use crate::checker::{tokenizer, SpellChecker};
use crate::config::{clamp_min_word_length, Config};
use crate::keyboard::KeyInput;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Counters shared with `main` so it can print a summary after the window closes
#[derive(Debug, Default)]
pub struct SessionStats {
    words_checked: AtomicUsize,
    misspelled: AtomicUsize,
}

impl SessionStats {
    pub fn words_checked(&self) -> usize {
        self.words_checked.load(Ordering::Relaxed)
    }

    pub fn misspelled(&self) -> usize {
        self.misspelled.load(Ordering::Relaxed)
    }
}

/// The word currently being typed
#[derive(Debug, Default)]
pub struct WordAccumulator {
    current: String,
}

impl WordAccumulator {
    /// Feed one key; returns the finished word when a boundary closes it
    pub fn push(&mut self, input: KeyInput) -> Option<String> {
        match input {
            KeyInput::Letter(c) => {
                self.current.extend(c.to_lowercase());
                None
            }
            KeyInput::Backspace => {
                self.current.pop();
                None
            }
            KeyInput::Boundary => {
                if self.current.is_empty() {
                    None
                } else {
                    Some(std::mem::take(&mut self.current))
                }
            }
        }
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn clear(&mut self) {
        self.current.clear();
    }
}

/// Most recent checked words, oldest evicted first
#[derive(Debug)]
pub struct WordHistory {
    words: VecDeque<String>,
    capacity: usize,
}

impl WordHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            words: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, word: String) {
        if self.words.len() == self.capacity {
            self.words.pop_front();
        }
        self.words.push_back(word);
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The last `n` words, oldest first, joined for display
    pub fn recent(&self, n: usize) -> String {
        let skip = self.words.len().saturating_sub(n);
        self.words
            .iter()
            .skip(skip)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Result of checking one finished word
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    /// Too short, or nothing left after cleaning
    Skipped,
    Correct(String),
    /// Suggestions are looked up off this thread, and only when `show_popup` is set
    Misspelled {
        word: String,
        /// False when the popup throttle suppressed it
        show_popup: bool,
    },
}

pub struct Session {
    checker: SpellChecker,
    accumulator: WordAccumulator,
    history: WordHistory,
    stats: Arc<SessionStats>,
    monitoring: bool,
    min_word_length: usize,
    throttle: Duration,
    last_popup: Option<Instant>,
}

impl Session {
    pub fn new(checker: SpellChecker, config: &Config) -> Self {
        Self {
            checker,
            accumulator: WordAccumulator::default(),
            history: WordHistory::new(config.history_capacity),
            stats: Arc::new(SessionStats::default()),
            monitoring: false,
            min_word_length: clamp_min_word_length(config.min_word_length),
            throttle: Duration::from_millis(config.throttle_ms),
            last_popup: None,
        }
    }

    pub fn stats(&self) -> Arc<SessionStats> {
        Arc::clone(&self.stats)
    }

    pub fn is_monitoring(&self) -> bool {
        self.monitoring
    }

    pub fn start(&mut self) {
        self.monitoring = true;
    }

    /// Stop monitoring and drop the half-typed word
    pub fn stop(&mut self) {
        self.monitoring = false;
        self.accumulator.clear();
    }

    pub fn min_word_length(&self) -> usize {
        self.min_word_length
    }

    pub fn set_min_word_length(&mut self, value: usize) {
        self.min_word_length = clamp_min_word_length(value);
    }

    pub fn history(&self) -> &WordHistory {
        &self.history
    }

    pub fn current_word(&self) -> &str {
        self.accumulator.current()
    }

    pub fn checker(&self) -> &SpellChecker {
        &self.checker
    }

    pub fn checker_mut(&mut self) -> &mut SpellChecker {
        &mut self.checker
    }

    /// Feed one key press. Ignored while monitoring is off.
    pub fn handle_key(&mut self, input: KeyInput, now: Instant) -> Option<CheckOutcome> {
        if !self.monitoring {
            return None;
        }
        let word = self.accumulator.push(input)?;
        Some(self.check_word(&word, now))
    }

    pub fn check_word(&mut self, word: &str, now: Instant) -> CheckOutcome {
        if word.chars().count() < self.min_word_length {
            return CheckOutcome::Skipped;
        }

        let Some(word) = tokenizer::clean_word(word) else {
            return CheckOutcome::Skipped;
        };

        self.stats.words_checked.fetch_add(1, Ordering::Relaxed);
        self.history.push(word.clone());

        if self.checker.is_known(&word) {
            return CheckOutcome::Correct(word);
        }

        self.stats.misspelled.fetch_add(1, Ordering::Relaxed);

        let show_popup = match self.last_popup {
            Some(last) => now.saturating_duration_since(last) > self.throttle,
            None => true,
        };
        if show_popup {
            self.last_popup = Some(now);
        }

        tracing::debug!(word = %word, show_popup, "misspelled word");

        CheckOutcome::Misspelled { word, show_popup }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::dictionary::Dictionary;

    fn session() -> Session {
        let config = Config::default();
        let dictionary =
            Dictionary::from_words(["the", "quick", "brown", "fox", "jumps", "spelling"]).unwrap();
        let checker = SpellChecker::with_dictionary(dictionary, &config).unwrap();
        let mut session = Session::new(checker, &config);
        session.start();
        session
    }

    fn type_word(session: &mut Session, text: &str, now: Instant) -> Option<CheckOutcome> {
        for c in text.chars() {
            assert!(session.handle_key(KeyInput::Letter(c), now).is_none());
        }
        session.handle_key(KeyInput::Boundary, now)
    }

    #[test]
    fn test_accumulator_letters_and_backspace() {
        let mut acc = WordAccumulator::default();
        for c in "Helpo".chars() {
            assert_eq!(acc.push(KeyInput::Letter(c)), None);
        }
        acc.push(KeyInput::Backspace);
        acc.push(KeyInput::Backspace);
        acc.push(KeyInput::Letter('p'));
        assert_eq!(acc.current(), "help");
        assert_eq!(acc.push(KeyInput::Boundary), Some("help".to_string()));
        assert_eq!(acc.current(), "");
    }

    #[test]
    fn test_boundary_without_word_is_ignored() {
        let mut acc = WordAccumulator::default();
        assert_eq!(acc.push(KeyInput::Boundary), None);
        assert_eq!(acc.push(KeyInput::Backspace), None);
        assert_eq!(acc.current(), "");
    }

    #[test]
    fn test_history_evicts_oldest() {
        let mut history = WordHistory::new(50);
        for i in 0..60 {
            history.push(format!("w{i}"));
        }
        assert_eq!(history.len(), 50);
        assert!(history.recent(50).starts_with("w10, w11, "));
        assert!(!history.recent(50).contains("w9,"));
        assert_eq!(history.recent(2), "w58, w59");
    }

    #[test]
    fn test_short_words_are_never_checked() {
        let mut s = session();
        s.set_min_word_length(4);
        let now = Instant::now();

        assert_eq!(type_word(&mut s, "fox", now), Some(CheckOutcome::Skipped));
        assert_eq!(s.stats().words_checked(), 0);
        assert!(s.history().is_empty());

        assert_eq!(
            type_word(&mut s, "quick", now),
            Some(CheckOutcome::Correct("quick".to_string()))
        );
        assert_eq!(s.stats().words_checked(), 1);
    }

    #[test]
    fn test_misspelled_iff_absent() {
        let mut s = session();
        let now = Instant::now();

        assert!(matches!(
            type_word(&mut s, "Brown", now),
            Some(CheckOutcome::Correct(_))
        ));
        match type_word(&mut s, "speling", now) {
            Some(CheckOutcome::Misspelled { word, show_popup }) => {
                assert_eq!(word, "speling");
                assert!(show_popup);
                assert_eq!(s.checker().suggest(&word), vec!["spelling"]);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(s.stats().words_checked(), 2);
        assert_eq!(s.stats().misspelled(), 1);
    }

    #[test]
    fn test_popup_throttle() {
        let mut s = session();
        let start = Instant::now();

        let popup = |outcome: CheckOutcome| match outcome {
            CheckOutcome::Misspelled { show_popup, .. } => show_popup,
            other => panic!("unexpected outcome: {other:?}"),
        };

        assert!(popup(s.check_word("qwik", start)));
        assert!(!popup(s.check_word("brwn", start + Duration::from_millis(500))));
        assert!(!popup(s.check_word("brwn", start + Duration::from_millis(1000))));
        assert!(popup(s.check_word("brwn", start + Duration::from_millis(1001))));
        assert_eq!(s.stats().misspelled(), 4);
    }

    #[test]
    fn test_keys_ignored_while_stopped() {
        let mut s = session();
        s.stop();
        let now = Instant::now();
        assert_eq!(s.handle_key(KeyInput::Letter('a'), now), None);
        assert_eq!(s.current_word(), "");

        s.start();
        s.handle_key(KeyInput::Letter('t'), now);
        s.stop();
        assert_eq!(s.current_word(), "");
    }

    #[test]
    fn test_min_length_clamped() {
        let mut s = session();
        s.set_min_word_length(1);
        assert_eq!(s.min_word_length(), 2);
        s.set_min_word_length(40);
        assert_eq!(s.min_word_length(), 10);
    }
}
