use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_ALPHA: Regex = Regex::new(r"[^a-zA-Z]").unwrap();
}

/// Strip everything but ASCII letters and lowercase the rest.
///
/// Returns `None` when nothing checkable is left.
pub fn clean_word(word: &str) -> Option<String> {
    let cleaned = NON_ALPHA.replace_all(word, "").to_lowercase();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}
