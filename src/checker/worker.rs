//! Suggestion lookups off the UI thread.
//!
//! The fuzzy fallback can scan a large part of the vocabulary, so the UI only
//! queues the misspelled word and picks the answer up on a later frame.

use super::Suggester;
use anyhow::{Context, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::thread;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRequest {
    pub id: u64,
    pub word: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionReply {
    pub id: u64,
    pub word: String,
    pub suggestions: Vec<String>,
}

pub struct SuggestionWorker {
    requests: Sender<SuggestionRequest>,
    replies: Receiver<SuggestionReply>,
    next_id: u64,
}

impl SuggestionWorker {
    /// Start the worker thread. `wake` runs after every reply.
    pub fn spawn<W>(suggester: Suggester, wake: W) -> Result<Self>
    where
        W: Fn() + Send + 'static,
    {
        // The popup throttle keeps this queue to a request or two
        let (request_tx, request_rx) = unbounded();
        let (reply_tx, reply_rx) = unbounded();

        thread::Builder::new()
            .name("suggestions".to_string())
            .spawn(move || serve(&suggester, &request_rx, &reply_tx, &wake))
            .context("Failed to spawn suggestion thread")?;

        Ok(Self {
            requests: request_tx,
            replies: reply_rx,
            next_id: 0,
        })
    }

    /// Queue `word` and return the id its reply will carry
    pub fn request(&mut self, word: String) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        if self.requests.send(SuggestionRequest { id, word }).is_err() {
            tracing::warn!(id, "suggestion thread is gone");
        }
        id
    }

    pub fn replies(&self) -> &Receiver<SuggestionReply> {
        &self.replies
    }
}

fn serve<W: Fn()>(
    suggester: &Suggester,
    requests: &Receiver<SuggestionRequest>,
    replies: &Sender<SuggestionReply>,
    wake: &W,
) {
    while let Ok(mut request) = requests.recv() {
        // Only the newest word can still open a popup
        while let Ok(newer) = requests.try_recv() {
            request = newer;
        }

        let suggestions = suggester.suggest(&request.word);
        tracing::debug!(id = request.id, word = %request.word, ?suggestions, "suggestions ready");

        let reply = SuggestionReply {
            id: request.id,
            word: request.word,
            suggestions,
        };
        if replies.send(reply).is_err() {
            break;
        }
        wake();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::dictionary::Dictionary;
    use crate::checker::SpellChecker;
    use crate::Config;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn suggester() -> Suggester {
        let dictionary = Dictionary::from_words(["spelling", "receive", "elephant"]).unwrap();
        SpellChecker::with_dictionary(dictionary, &Config::default())
            .unwrap()
            .suggester()
    }

    #[test]
    fn test_reply_carries_request_id() {
        let wakes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&wakes);
        let mut worker = SuggestionWorker::spawn(suggester(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        let id = worker.request("speling".to_string());
        let reply = worker.replies().recv_timeout(Duration::from_secs(5)).unwrap();

        assert_eq!(reply.id, id);
        assert_eq!(reply.word, "speling");
        assert_eq!(reply.suggestions, vec!["spelling"]);
        assert_eq!(wakes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stale_requests_are_skipped() {
        let (request_tx, request_rx) = unbounded();
        let (reply_tx, reply_rx) = unbounded();
        for (id, word) in [(1, "recieve"), (2, "elefant")] {
            request_tx
                .send(SuggestionRequest {
                    id,
                    word: word.to_string(),
                })
                .unwrap();
        }
        drop(request_tx);

        serve(&suggester(), &request_rx, &reply_tx, &|| {});

        let replies: Vec<SuggestionReply> = reply_rx.try_iter().collect();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].id, 2);
        assert_eq!(replies[0].suggestions, vec!["elephant"]);
    }
}
