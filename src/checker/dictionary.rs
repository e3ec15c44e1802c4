use fst::automaton::Levenshtein;
use fst::{IntoStreamer, Set, SetBuilder, Streamer};
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("no dictionary installed for '{language}' (expected {})", path.display())]
    NotInstalled { language: String, path: PathBuf },

    #[error("dictionary at {} is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: fst::Error,
    },

    #[error("failed to build dictionary: {0}")]
    Build(#[from] fst::Error),

    #[error("dictionary I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("data directory is unavailable on this platform")]
    NoDataDir,
}

/// Sorted word set backed by a finite state transducer.
pub struct Dictionary {
    set: Set<Vec<u8>>,
    /// Vocabulary grouped by character count, built on the first fuzzy lookup
    by_length: OnceLock<Vec<Vec<String>>>,
}

impl Dictionary {
    /// Load the installed dictionary for a language
    pub fn load(language: &str) -> Result<Self, DictionaryError> {
        let dict_path = Self::path_for(language)?;

        if !dict_path.exists() {
            return Err(DictionaryError::NotInstalled {
                language: language.to_string(),
                path: dict_path,
            });
        }

        Self::load_from_path(&dict_path)
    }

    /// Load dictionary from a specific path (useful for testing)
    pub fn load_from_path(path: &Path) -> Result<Self, DictionaryError> {
        let bytes = fs::read(path).map_err(|source| DictionaryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let set = Set::new(bytes).map_err(|source| DictionaryError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self::from_set(set))
    }

    /// Build an in-memory dictionary without touching the disk
    pub fn from_words<I, S>(words: I) -> Result<Self, DictionaryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut sorted: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        sorted.sort();
        sorted.dedup();

        let set = Set::from_iter(sorted)?;
        Ok(Self::from_set(set))
    }

    fn from_set(set: Set<Vec<u8>>) -> Self {
        Self {
            set,
            by_length: OnceLock::new(),
        }
    }

    /// Check if word exists in dictionary
    pub fn contains(&self, word: &str) -> bool {
        self.set.contains(word.as_bytes())
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Words within `distance` Levenshtein edits of `word`.
    ///
    /// `None` when the automaton for `word` would be too large to build.
    pub fn within_distance(&self, word: &str, distance: u32) -> Option<Vec<String>> {
        let automaton = match Levenshtein::new(word, distance) {
            Ok(automaton) => automaton,
            Err(e) => {
                tracing::debug!(word, distance, error = %e, "levenshtein automaton rejected");
                return None;
            }
        };

        let mut results = Vec::new();
        let mut stream = self.set.search(automaton).into_stream();

        while let Some(key) = stream.next() {
            if let Ok(word) = String::from_utf8(key.to_vec()) {
                results.push(word);
            }
        }

        Some(results)
    }

    /// Words whose character count falls in `lengths`
    pub fn words_with_length(&self, lengths: RangeInclusive<usize>) -> Vec<&str> {
        let buckets = self.by_length.get_or_init(|| {
            let mut buckets: Vec<Vec<String>> = Vec::new();
            for word in self.all_words() {
                let len = word.chars().count();
                if buckets.len() <= len {
                    buckets.resize_with(len + 1, Vec::new);
                }
                buckets[len].push(word);
            }
            tracing::debug!(words = self.set.len(), "vocabulary grouped by length");
            buckets
        });

        let end = (*lengths.end()).min(buckets.len().saturating_sub(1));
        let start = *lengths.start();
        if buckets.is_empty() || start > end {
            return Vec::new();
        }

        buckets[start..=end]
            .iter()
            .flatten()
            .map(String::as_str)
            .collect()
    }

    /// Get all words in dictionary
    ///
    /// WARNING: This materializes the whole vocabulary.
    pub fn all_words(&self) -> Vec<String> {
        let mut words = Vec::with_capacity(self.set.len());
        let mut stream = self.set.stream();

        while let Some(key) = stream.next() {
            if let Ok(word) = String::from_utf8(key.to_vec()) {
                words.push(word);
            }
        }

        words
    }

    /// Build dictionary file from word list
    pub fn build_from_words(words: &[String], output_path: &Path) -> Result<(), DictionaryError> {
        let mut sorted_words = words.to_vec();
        sorted_words.sort();
        sorted_words.dedup();

        let io_err = |source: io::Error| DictionaryError::Io {
            path: output_path.to_path_buf(),
            source,
        };

        let file = File::create(output_path).map_err(io_err)?;
        let writer = BufWriter::new(file);
        let mut builder = SetBuilder::new(writer)?;

        for word in sorted_words {
            builder.insert(word.as_bytes())?;
        }

        builder.finish()?;

        Ok(())
    }

    /// Location of the installed dictionary file for a language
    pub fn path_for(language: &str) -> Result<PathBuf, DictionaryError> {
        let data_dir = crate::config::Config::data_dir().ok_or(DictionaryError::NoDataDir)?;
        Ok(data_dir.join(format!("{}.dict", language)))
    }
}
