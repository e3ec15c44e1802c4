use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const MIN_WORD_LENGTH_RANGE: (usize, usize) = (2, 10);
pub const DEFAULT_MIN_WORD_LENGTH: usize = 3;
pub const MAX_SUGGESTIONS: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_language")]
    pub language: String,
    pub personal_dictionary: Option<PathBuf>,

    #[serde(default = "default_min_word_length")]
    pub min_word_length: usize,

    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,

    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Minimum gap between two suggestion popups
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,

    #[serde(default = "default_popup_timeout_ms")]
    pub popup_timeout_ms: u64,

    #[serde(default = "default_copy_confirm_ms")]
    pub copy_confirm_ms: u64,

    /// Similarity ratio a vocabulary word needs to count as a fuzzy match
    #[serde(default = "default_fuzzy_cutoff")]
    pub fuzzy_cutoff: f64,

    #[serde(default = "default_popup_position")]
    pub popup_position: [f32; 2],

    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_language() -> String {
    "en_US".to_string()
}

fn default_min_word_length() -> usize {
    DEFAULT_MIN_WORD_LENGTH
}

fn default_max_suggestions() -> usize {
    MAX_SUGGESTIONS
}

fn default_history_capacity() -> usize {
    50
}

fn default_throttle_ms() -> u64 {
    1000
}

fn default_popup_timeout_ms() -> u64 {
    3000
}

fn default_copy_confirm_ms() -> u64 {
    1000
}

fn default_fuzzy_cutoff() -> f64 {
    0.6
}

fn default_popup_position() -> [f32; 2] {
    [200.0, 200.0]
}

fn default_channel_capacity() -> usize {
    256
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: default_language(),
            personal_dictionary: None,
            min_word_length: default_min_word_length(),
            max_suggestions: default_max_suggestions(),
            history_capacity: default_history_capacity(),
            throttle_ms: default_throttle_ms(),
            popup_timeout_ms: default_popup_timeout_ms(),
            copy_confirm_ms: default_copy_confirm_ms(),
            fuzzy_cutoff: default_fuzzy_cutoff(),
            popup_position: default_popup_position(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// One config file as written on disk; unset keys leave the layer below alone
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub language: Option<String>,
    pub personal_dictionary: Option<PathBuf>,
    pub min_word_length: Option<usize>,
    pub max_suggestions: Option<usize>,
    pub history_capacity: Option<usize>,
    pub throttle_ms: Option<u64>,
    pub popup_timeout_ms: Option<u64>,
    pub copy_confirm_ms: Option<u64>,
    pub fuzzy_cutoff: Option<f64>,
    pub popup_position: Option<[f32; 2]>,
    pub channel_capacity: Option<usize>,
}

impl ConfigFile {
    pub fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

/// Values the command line may override on top of the config files
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub language: Option<String>,
    pub personal_dictionary: Option<PathBuf>,
    pub min_word_length: Option<usize>,
    pub config_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration with priority: CLI args > local config > global config > defaults
    pub fn load(overrides: Overrides) -> Result<Self> {
        let mut config = Self::default();

        // Load global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                config = config.overlay(ConfigFile::read(&global_path)?);
            }
        }

        // Load local config (overrides global); an explicit --config replaces the local lookup
        let local_path = overrides
            .config_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(".spellwatch.toml"));
        if local_path.exists() {
            config = config.overlay(ConfigFile::read(&local_path)?);
        } else if overrides.config_file.is_some() {
            anyhow::bail!("Config file not found: {}", local_path.display());
        }

        // Apply CLI overrides
        if let Some(language) = overrides.language {
            config.language = language;
        }
        if let Some(dict) = overrides.personal_dictionary {
            config.personal_dictionary = Some(dict);
        }
        if let Some(min) = overrides.min_word_length {
            config.min_word_length = min;
        }

        // Set default personal dictionary if not specified
        if config.personal_dictionary.is_none() {
            config.personal_dictionary = Self::default_personal_dict_path();
        }

        // Ensure personal dictionary file exists
        if let Some(path) = &config.personal_dictionary {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .context("Failed to create personal dictionary directory")?;
            }
            if !path.exists() {
                fs::write(path, "").context("Failed to create personal dictionary file")?;
            }
        }

        Ok(config.normalized())
    }

    /// A single config file on top of the defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        Ok(Self::default().overlay(ConfigFile::read(path)?))
    }

    /// Apply every key `file` sets, including ones set back to their default
    pub fn overlay(mut self, file: ConfigFile) -> Self {
        if let Some(language) = file.language {
            self.language = language;
        }
        if let Some(path) = file.personal_dictionary {
            self.personal_dictionary = Some(path);
        }
        if let Some(min) = file.min_word_length {
            self.min_word_length = min;
        }
        if let Some(max) = file.max_suggestions {
            self.max_suggestions = max;
        }
        if let Some(capacity) = file.history_capacity {
            self.history_capacity = capacity;
        }
        if let Some(ms) = file.throttle_ms {
            self.throttle_ms = ms;
        }
        if let Some(ms) = file.popup_timeout_ms {
            self.popup_timeout_ms = ms;
        }
        if let Some(ms) = file.copy_confirm_ms {
            self.copy_confirm_ms = ms;
        }
        if let Some(cutoff) = file.fuzzy_cutoff {
            self.fuzzy_cutoff = cutoff;
        }
        if let Some(position) = file.popup_position {
            self.popup_position = position;
        }
        if let Some(capacity) = file.channel_capacity {
            self.channel_capacity = capacity;
        }
        self
    }

    /// Clamp values into the ranges the rest of the program relies on
    pub fn normalized(mut self) -> Self {
        self.min_word_length = clamp_min_word_length(self.min_word_length);
        self.max_suggestions = self.max_suggestions.clamp(1, MAX_SUGGESTIONS);
        self.history_capacity = self.history_capacity.max(1);
        self.channel_capacity = self.channel_capacity.max(1);
        self.fuzzy_cutoff = self.fuzzy_cutoff.clamp(0.0, 1.0);
        self
    }

    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "spellwatch").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn default_personal_dict_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "spellwatch").map(|dirs| dirs.config_dir().join("personal.txt"))
    }

    pub fn data_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "spellwatch").map(|dirs| dirs.data_dir().to_path_buf())
    }
}

pub fn clamp_min_word_length(value: usize) -> usize {
    value.clamp(MIN_WORD_LENGTH_RANGE.0, MIN_WORD_LENGTH_RANGE.1)
}

/// Parse the minimum-length field as typed by the user.
///
/// Anything that is not a number falls back to [`DEFAULT_MIN_WORD_LENGTH`].
pub fn parse_min_word_length(input: &str) -> usize {
    match input.trim().parse::<usize>() {
        Ok(value) => clamp_min_word_length(value),
        Err(_) => DEFAULT_MIN_WORD_LENGTH,
    }
}
