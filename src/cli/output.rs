use crate::session::SessionStats;
use colored::*;

pub fn print_banner(language: &str, min_word_length: usize, colored_output: bool) {
    let title = "System-wide Spell Checker";
    if colored_output {
        println!("{}", title.bold());
        println!("{}", "=".repeat(title.len()).dimmed());
        println!(
            "Dictionary {} · minimum word length {}",
            language.cyan(),
            min_word_length.to_string().yellow()
        );
    } else {
        println!("{}", title);
        println!("{}", "=".repeat(title.len()));
        println!(
            "Dictionary {} · minimum word length {}",
            language, min_word_length
        );
    }
}

/// Keyboard hooks are unavailable on some desktops; say so up front
pub fn print_hook_warning(reason: &str, colored_output: bool) {
    if colored_output {
        println!("{} {}", "⚠ Note:".yellow().bold(), reason);
    } else {
        println!("⚠ Note: {}", reason);
    }
}

/// Startup cannot continue without an installed dictionary
pub fn print_missing_dictionary(language: &str, colored_output: bool) {
    if colored_output {
        eprintln!(
            "{} No dictionary installed for {}.",
            "✗".red().bold(),
            language.yellow()
        );
        eprintln!(
            "Run {} and restart the application.",
            format!("spellwatch dict download {}", language).cyan()
        );
    } else {
        eprintln!("✗ No dictionary installed for {}.", language);
        eprintln!(
            "Run spellwatch dict download {} and restart the application.",
            language
        );
    }
}

pub fn summary_line(stats: &SessionStats) -> String {
    let checked = stats.words_checked();
    let misspelled = stats.misspelled();
    format!(
        "{} {} checked, {} misspelled",
        checked,
        if checked == 1 { "word" } else { "words" },
        misspelled
    )
}

pub fn print_session_summary(stats: &SessionStats, colored_output: bool) {
    let line = summary_line(stats);
    println!();
    if !colored_output {
        println!("✓ {}", line);
    } else if stats.misspelled() == 0 {
        println!("{} {}", "✓".green().bold(), line.green());
    } else {
        println!("{} {}", "✓".green().bold(), line);
    }
}
