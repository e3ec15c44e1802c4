use crate::checker::dictionary::Dictionary;
use anyhow::{Context, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

// Pinned commit so a re-download always yields the same word list
const WORDLIST_BASE_URL: &str =
    "https://raw.githubusercontent.com/dwyl/english-words/6e4bc58ad764c3e6df8b5be4048671962c9d6a23";
const WORDLIST_VERSION: &str = "2023.12";

#[derive(Debug, Clone)]
pub struct DictionaryInfo {
    pub language: String,
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Word list URL for a language, if we know one
pub fn wordlist_url(language: &str) -> Result<String> {
    match language {
        "en_US" | "en_GB" => Ok(format!("{}/words_alpha.txt", WORDLIST_BASE_URL)),
        other => anyhow::bail!(
            "Language '{}' is not supported. Only 'en_US' and 'en_GB' are currently available.",
            other
        ),
    }
}

/// Every `*.dict` file in `data_dir`, sorted by language
pub fn installed_dictionaries(data_dir: &Path) -> Result<Vec<DictionaryInfo>> {
    let mut found = Vec::new();
    if !data_dir.exists() {
        return Ok(found);
    }

    for entry in fs::read_dir(data_dir)
        .with_context(|| format!("Failed to read {}", data_dir.display()))?
    {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) != Some("dict") {
            continue;
        }
        let Some(language) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        found.push(DictionaryInfo {
            language: language.to_string(),
            size_bytes: fs::metadata(&path)?.len(),
            path,
        });
    }

    found.sort_by(|a, b| a.language.cmp(&b.language));
    Ok(found)
}

pub fn list_dictionaries() -> Result<()> {
    let data_dir = crate::config::Config::data_dir().context("Failed to get data directory")?;
    let installed = installed_dictionaries(&data_dir)?;

    if installed.is_empty() {
        println!("{}", "No dictionaries installed.".yellow());
        println!(
            "Run {} to download a dictionary.",
            "spellwatch dict download en_US".cyan()
        );
        return Ok(());
    }

    println!("{}", "Installed dictionaries:".bold());
    println!();

    for info in &installed {
        println!(
            "  {} {} ({})",
            "✓".green(),
            info.language.cyan().bold(),
            format!("{}KB", info.size_bytes / 1024).dimmed()
        );
    }

    println!();
    println!(
        "Data directory: {}",
        data_dir.display().to_string().dimmed()
    );

    Ok(())
}

pub fn download_dictionary(language: &str) -> Result<()> {
    let url = wordlist_url(language)?;

    println!(
        "{} dictionary for {} (version: {})...",
        "Downloading".cyan().bold(),
        language.yellow(),
        WORDLIST_VERSION.dimmed()
    );
    println!("Source: {}", url.dimmed());

    let data_dir = crate::config::Config::data_dir().context("Failed to get data directory")?;
    fs::create_dir_all(&data_dir).context("Failed to create data directory")?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .context("Invalid progress template")?,
    );
    pb.set_message("Downloading...");
    pb.enable_steady_tick(Duration::from_millis(100));

    let response = reqwest::blocking::get(&url).context("Failed to download dictionary")?;
    if !response.status().is_success() {
        pb.abandon_with_message("Download failed");
        anyhow::bail!("Failed to download dictionary: HTTP {}", response.status());
    }

    let content = response.text().context("Failed to read dictionary body")?;
    pb.finish_with_message("Download complete");

    println!("{}", "Building dictionary...".cyan());
    let words = parse_wordlist(&content);
    println!("Found {} words", words.len().to_string().yellow());

    let dict_path = data_dir.join(format!("{}.dict", language));
    Dictionary::build_from_words(&words, &dict_path)?;
    tracing::info!(
        language,
        words = words.len(),
        path = %dict_path.display(),
        "dictionary installed"
    );

    println!(
        "{} Dictionary installed: {}",
        "✓".green().bold(),
        dict_path.display().to_string().cyan()
    );
    println!("Restart spellwatch to pick it up.");

    Ok(())
}

pub fn update_dictionaries() -> Result<()> {
    let data_dir = crate::config::Config::data_dir().context("Failed to get data directory")?;
    let installed = installed_dictionaries(&data_dir)?;

    if installed.is_empty() {
        println!("{}", "No dictionaries to update.".yellow());
        return Ok(());
    }

    println!(
        "{} {} {}...",
        "Updating".cyan().bold(),
        installed.len(),
        if installed.len() == 1 {
            "dictionary"
        } else {
            "dictionaries"
        }
    );
    println!();

    for info in installed {
        download_dictionary(&info.language)?;
        println!();
    }

    println!("{} All dictionaries updated!", "✓".green().bold());

    Ok(())
}

pub fn show_info(language: &str) -> Result<()> {
    let dict_path = Dictionary::path_for(language)?;

    if !dict_path.exists() {
        println!(
            "{} Dictionary for {} not found.",
            "✗".red().bold(),
            language.yellow()
        );
        println!(
            "Run {} to download it.",
            format!("spellwatch dict download {}", language).cyan()
        );
        return Ok(());
    }

    let metadata = fs::metadata(&dict_path)?;

    println!("{}", format!("Dictionary: {}", language).bold());
    println!("  Path: {}", dict_path.display());
    println!("  Size: {} KB", metadata.len() / 1024);
    println!("  Version: {}", WORDLIST_VERSION);
    println!("  Format: FST (Finite State Transducer)");

    match Dictionary::load_from_path(&dict_path) {
        Ok(dict) => println!("  Words: {}", dict.len().to_string().yellow()),
        Err(e) => println!("  {}: {}", "Error loading dictionary".red(), e),
    }

    Ok(())
}

/// One lowercase word per line; single letters and non-alphabetic entries are dropped
pub fn parse_wordlist(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.trim().to_lowercase())
        .filter(|line| line.len() > 1 && line.chars().all(|c| c.is_ascii_alphabetic()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_wordlist() {
        let words = parse_wordlist("Apple\r\na\n\nzebra\nx-ray\n  mango  \n");
        assert_eq!(words, vec!["apple", "zebra", "mango"]);
    }

    #[test]
    fn test_unsupported_language_is_rejected() {
        let err = wordlist_url("xx_XX").unwrap_err();
        assert!(err.to_string().contains("not supported"));
        assert!(download_dictionary("xx_XX").is_err());
        assert!(wordlist_url("en_GB").unwrap().ends_with("/words_alpha.txt"));
    }

    #[test]
    fn test_installed_dictionaries() {
        let dir = tempdir().unwrap();
        let words = vec!["hello".to_string(), "world".to_string()];
        Dictionary::build_from_words(&words, &dir.path().join("en_US.dict")).unwrap();
        Dictionary::build_from_words(&words, &dir.path().join("en_GB.dict")).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let installed = installed_dictionaries(dir.path()).unwrap();
        let languages: Vec<_> = installed.iter().map(|i| i.language.as_str()).collect();
        assert_eq!(languages, vec!["en_GB", "en_US"]);
        assert!(installed.iter().all(|i| i.size_bytes > 0));
    }

    #[test]
    fn test_missing_data_dir_lists_nothing() {
        let dir = tempdir().unwrap();
        let installed = installed_dictionaries(&dir.path().join("absent")).unwrap();
        assert!(installed.is_empty());
    }
}
