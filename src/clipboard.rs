use arboard::Clipboard;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("failed to write clipboard: {0}")]
    Write(String),
}

/// Destination for a chosen suggestion
pub trait ClipboardSink {
    fn copy_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// System clipboard, opened lazily and reopened after a failure
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<Clipboard>,
}

impl ClipboardSink for SystemClipboard {
    fn copy_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard = match self.inner.take() {
            Some(clipboard) => clipboard,
            None => Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?,
        };

        clipboard
            .set_text(text)
            .map_err(|e| ClipboardError::Write(e.to_string()))?;

        self.inner = Some(clipboard);
        Ok(())
    }
}
