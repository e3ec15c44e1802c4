pub mod dictionary;
pub mod suggestions;
pub mod tokenizer;
pub mod worker;

use crate::Config;
use anyhow::{Context, Result};
use dictionary::Dictionary;
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct SpellChecker {
    dictionary: Arc<Dictionary>,
    personal_words: HashSet<String>,
    personal_dict_path: Option<PathBuf>,
    max_suggestions: usize,
    fuzzy_cutoff: f64,
}

/// Suggestion lookup that can be moved to another thread
#[derive(Clone)]
pub struct Suggester {
    dictionary: Arc<Dictionary>,
    max_suggestions: usize,
    fuzzy_cutoff: f64,
}

impl Suggester {
    pub fn suggest(&self, word: &str) -> Vec<String> {
        suggestions::generate(word, &self.dictionary, self.max_suggestions, self.fuzzy_cutoff)
    }
}

impl SpellChecker {
    pub fn new(config: &Config) -> Result<Self> {
        // Load main dictionary
        let dictionary = Dictionary::load(&config.language)?;
        tracing::info!(
            language = %config.language,
            words = dictionary.len(),
            "dictionary loaded"
        );

        Self::with_dictionary(dictionary, config)
    }

    /// Build a checker around an already loaded dictionary
    pub fn with_dictionary(dictionary: Dictionary, config: &Config) -> Result<Self> {
        let personal_words = match &config.personal_dictionary {
            Some(path) => load_personal_words(path)?,
            None => HashSet::new(),
        };

        Ok(Self {
            dictionary: Arc::new(dictionary),
            personal_words,
            personal_dict_path: config.personal_dictionary.clone(),
            max_suggestions: config.max_suggestions,
            fuzzy_cutoff: config.fuzzy_cutoff,
        })
    }

    /// Whether a cleaned, lowercase word counts as correctly spelled
    pub fn is_known(&self, word: &str) -> bool {
        self.personal_words.contains(word) || self.dictionary.contains(word)
    }

    /// Corrections for a misspelled word, never more than the configured cap
    pub fn suggest(&self, word: &str) -> Vec<String> {
        self.suggester().suggest(word)
    }

    pub fn suggester(&self) -> Suggester {
        Suggester {
            dictionary: Arc::clone(&self.dictionary),
            max_suggestions: self.max_suggestions,
            fuzzy_cutoff: self.fuzzy_cutoff,
        }
    }

    /// Accept `word` from now on and append it to the personal dictionary file
    pub fn add_personal_word(&mut self, word: &str) -> Result<()> {
        let word = word.trim().to_lowercase();
        if word.is_empty() || !self.personal_words.insert(word.clone()) {
            return Ok(());
        }

        if let Some(path) = &self.personal_dict_path {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open personal dictionary: {}", path.display()))?;
            writeln!(file, "{}", word).context("Failed to update personal dictionary")?;
        }

        tracing::info!(word = %word, "added to personal dictionary");
        Ok(())
    }
}

fn load_personal_words(path: &Path) -> Result<HashSet<String>> {
    let mut personal_words = HashSet::new();
    if !path.exists() {
        return Ok(personal_words);
    }

    let content = fs::read_to_string(path).context("Failed to read personal dictionary")?;
    for line in content.lines() {
        let word = line.trim();
        if !word.is_empty() && !word.starts_with('#') {
            personal_words.insert(word.to_lowercase());
        }
    }

    Ok(personal_words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn checker(personal: Option<PathBuf>) -> SpellChecker {
        let dictionary = Dictionary::from_words(["hello", "world", "spelling"]).unwrap();
        let config = Config {
            personal_dictionary: personal,
            ..Default::default()
        };
        SpellChecker::with_dictionary(dictionary, &config).unwrap()
    }

    #[test]
    fn test_membership_decides_spelling() {
        let checker = checker(None);
        assert!(checker.is_known("hello"));
        assert!(!checker.is_known("helo"));
    }

    #[test]
    fn test_personal_words_are_known() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("personal.txt");
        fs::write(&path, "# my words\nRustacean\n\n").unwrap();

        let checker = checker(Some(path));
        assert!(checker.is_known("rustacean"));
        assert!(!checker.is_known("# my words"));
    }

    #[test]
    fn test_add_personal_word_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("personal.txt");

        let mut checker = checker(Some(path.clone()));
        checker.add_personal_word("Ferris").unwrap();
        checker.add_personal_word("ferris").unwrap();

        assert!(checker.is_known("ferris"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "ferris\n");
    }

    #[test]
    fn test_suggest_caps_results() {
        let checker = checker(None);
        let suggestions = checker.suggest("speling");
        assert_eq!(suggestions, vec!["spelling"]);
        assert!(checker.suggest("wrld").len() <= 3);
    }
}
