//! Global keyboard hook.
//!
//! The hook runs on its own thread and never touches session or GUI state: it
//! translates raw events into [`KeyInput`]s and pushes them through a bounded
//! channel, then wakes the UI so the queue gets drained.

use anyhow::{Context, Result};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use rdev::{listen, Event, EventType, Key};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

/// What a key press means for the word being typed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Letter(char),
    Backspace,
    /// Whitespace or any other non-letter character
    Boundary,
}

/// Messages sent from the hook thread to the UI thread
#[derive(Debug, Clone, PartialEq)]
pub enum ListenerEvent {
    /// `at` is when the hook saw the key, not when the UI drained it
    Key { input: KeyInput, at: Instant },
    /// The platform hook could not be installed; no more keys will arrive
    Failed(String),
}

/// Map a raw hook event to a [`KeyInput`]. Releases and non-text keys map to `None`.
pub fn translate(event: &Event) -> Option<KeyInput> {
    let EventType::KeyPress(key) = event.event_type else {
        return None;
    };

    match key {
        Key::Backspace => Some(KeyInput::Backspace),
        Key::Space | Key::Return | Key::KpReturn | Key::Tab => Some(KeyInput::Boundary),
        _ => event.name.as_deref().and_then(classify_text),
    }
}

fn classify_text(text: &str) -> Option<KeyInput> {
    let c = text.chars().next()?;
    if c.is_alphabetic() {
        Some(KeyInput::Letter(c))
    } else if c.is_control() {
        // Ctrl shortcuts and escape codes are not typing
        None
    } else {
        Some(KeyInput::Boundary)
    }
}

/// Handle to the hook thread.
///
/// The platform hook cannot be removed once installed, so stopping only gates
/// the callback.
pub struct KeyboardListener {
    enabled: Arc<AtomicBool>,
}

impl KeyboardListener {
    /// Install the hook on a background thread.
    ///
    /// `wake` is called after every delivered message so the UI can repaint.
    pub fn spawn<W>(capacity: usize, wake: W) -> Result<(Self, Receiver<ListenerEvent>)>
    where
        W: Fn() + Send + Sync + 'static,
    {
        let (tx, rx) = bounded(capacity.max(1));
        let enabled = Arc::new(AtomicBool::new(true));
        let wake = Arc::new(wake);

        let thread_enabled = Arc::clone(&enabled);
        thread::Builder::new()
            .name("keyboard-hook".to_string())
            .spawn(move || run_hook(tx, thread_enabled, wake))
            .context("Failed to spawn keyboard hook thread")?;

        tracing::info!(capacity, "keyboard hook thread started");
        Ok((Self { enabled }, rx))
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }
}

fn run_hook<W>(tx: Sender<ListenerEvent>, enabled: Arc<AtomicBool>, wake: Arc<W>)
where
    W: Fn() + Send + Sync + 'static,
{
    let failure_tx = tx.clone();
    let failure_wake = Arc::clone(&wake);

    let callback = move |event: Event| on_event(&event, &enabled, &tx, wake.as_ref());

    if let Err(e) = listen(callback) {
        let message = format!("{:?}", e);
        tracing::error!(error = %message, "keyboard hook failed");
        deliver(&failure_tx, ListenerEvent::Failed(message), failure_wake.as_ref());
    }
}

/// Hook callback body. Never unwinds.
fn on_event<W: Fn() + ?Sized>(
    event: &Event,
    enabled: &AtomicBool,
    tx: &Sender<ListenerEvent>,
    wake: &W,
) {
    // Unwinding into the OS hook aborts the process, so contain any panic here
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        if !enabled.load(Ordering::Relaxed) {
            return;
        }
        let Some(input) = translate(event) else {
            return;
        };
        let at = Instant::now();
        deliver(tx, ListenerEvent::Key { input, at }, wake);
    }));
    if outcome.is_err() {
        tracing::debug!("panic in keyboard callback swallowed");
    }
}

/// Best-effort hand-off: a full queue drops the message
fn deliver<W: Fn() + ?Sized>(tx: &Sender<ListenerEvent>, event: ListenerEvent, wake: &W) {
    match tx.try_send(event) {
        Ok(()) => wake(),
        Err(TrySendError::Full(dropped)) => {
            tracing::debug!(event = ?dropped, "key queue full, dropping event");
            wake();
        }
        Err(TrySendError::Disconnected(_)) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::SystemTime;

    fn press(key: Key, name: Option<&str>) -> Event {
        Event {
            time: SystemTime::now(),
            name: name.map(str::to_string),
            event_type: EventType::KeyPress(key),
        }
    }

    #[test]
    fn test_letters_are_passed_through() {
        assert_eq!(
            translate(&press(Key::KeyA, Some("a"))),
            Some(KeyInput::Letter('a'))
        );
        assert_eq!(
            translate(&press(Key::KeyQ, Some("Q"))),
            Some(KeyInput::Letter('Q'))
        );
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(translate(&press(Key::Space, Some(" "))), Some(KeyInput::Boundary));
        assert_eq!(translate(&press(Key::Return, None)), Some(KeyInput::Boundary));
        assert_eq!(translate(&press(Key::Tab, Some("\t"))), Some(KeyInput::Boundary));
        assert_eq!(translate(&press(Key::Comma, Some(","))), Some(KeyInput::Boundary));
        assert_eq!(translate(&press(Key::Num1, Some("1"))), Some(KeyInput::Boundary));
    }

    #[test]
    fn test_backspace_wins_over_its_control_char() {
        assert_eq!(
            translate(&press(Key::Backspace, Some("\u{8}"))),
            Some(KeyInput::Backspace)
        );
    }

    #[test]
    fn test_non_text_keys_are_ignored() {
        assert_eq!(translate(&press(Key::ShiftLeft, None)), None);
        assert_eq!(translate(&press(Key::KeyC, Some("\u{3}"))), None);
        let release = Event {
            time: SystemTime::now(),
            name: Some("a".to_string()),
            event_type: EventType::KeyRelease(Key::KeyA),
        };
        assert_eq!(translate(&release), None);
    }

    fn key(input: KeyInput) -> ListenerEvent {
        ListenerEvent::Key {
            input,
            at: Instant::now(),
        }
    }

    #[test]
    fn test_deliver_drops_when_full() {
        let (tx, rx) = bounded(1);
        let wakes = AtomicUsize::new(0);
        let wake = || {
            wakes.fetch_add(1, Ordering::SeqCst);
        };

        let first = key(KeyInput::Letter('a'));
        deliver(&tx, first.clone(), &wake);
        deliver(&tx, key(KeyInput::Letter('b')), &wake);

        assert_eq!(rx.try_recv(), Ok(first));
        assert!(rx.try_recv().is_err());
        assert_eq!(wakes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_event_is_stamped_in_the_hook() {
        let (tx, rx) = bounded(4);
        let enabled = AtomicBool::new(true);
        let before = Instant::now();

        on_event(&press(Key::KeyA, Some("a")), &enabled, &tx, &|| {});
        match rx.try_recv() {
            Ok(ListenerEvent::Key { input, at }) => {
                assert_eq!(input, KeyInput::Letter('a'));
                assert!(at >= before);
            }
            other => panic!("unexpected event: {other:?}"),
        }

        enabled.store(false, Ordering::SeqCst);
        on_event(&press(Key::KeyB, Some("b")), &enabled, &tx, &|| {});
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_panicking_handler_does_not_unwind() {
        let (tx, rx) = bounded(4);
        let enabled = AtomicBool::new(true);
        let wake = || panic!("repaint failed");

        on_event(&press(Key::KeyA, Some("a")), &enabled, &tx, &wake);
        on_event(&press(Key::KeyB, Some("b")), &enabled, &tx, &wake);

        // Both keys were queued before the wake blew up
        assert_eq!(rx.try_iter().count(), 2);
    }

    #[test]
    fn test_deliver_ignores_closed_channel() {
        let (tx, rx) = bounded(1);
        drop(rx);
        let wakes = AtomicUsize::new(0);
        let wake = || {
            wakes.fetch_add(1, Ordering::SeqCst);
        };

        deliver(&tx, ListenerEvent::Failed("gone".to_string()), &wake);
        assert_eq!(wakes.load(Ordering::SeqCst), 0);
    }
}
