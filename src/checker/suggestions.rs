use crate::checker::dictionary::Dictionary;
use rayon::prelude::*;
use std::ops::RangeInclusive;

/// Generate at most `max_suggestions` corrections for a misspelled word.
///
/// Known words one edit away win; two edits away are tried next. When neither
/// turns anything up, fall back to a similarity scan over the vocabulary words
/// whose length could still reach `fuzzy_cutoff`.
pub fn generate(
    word: &str,
    dictionary: &Dictionary,
    max_suggestions: usize,
    fuzzy_cutoff: f64,
) -> Vec<String> {
    let mut suggestions = candidates(word, dictionary);

    if suggestions.is_empty() {
        let pool = dictionary.words_with_length(length_window(word.chars().count(), fuzzy_cutoff));
        tracing::debug!(
            word,
            pool = pool.len(),
            "no edit candidates, falling back to fuzzy matching"
        );
        suggestions = fuzzy_matches(word, &pool, max_suggestions, fuzzy_cutoff);
    }

    suggestions.truncate(max_suggestions);
    suggestions
}

/// Known words at the smallest edit distance (1, then 2) from `word`, best first.
pub fn candidates(word: &str, dictionary: &Dictionary) -> Vec<String> {
    // A transposition is two Levenshtein edits, so search wide and rank by edit distance.
    // Long words can exceed the automaton's state limit at distance 2 only.
    let pool = dictionary
        .within_distance(word, 2)
        .or_else(|| dictionary.within_distance(word, 1))
        .unwrap_or_default();

    let mut scored: Vec<(usize, bool, String)> = pool
        .into_iter()
        .filter(|candidate| candidate != word)
        .map(|candidate| {
            let distance = edit_distance(word, &candidate);
            let not_anagram = !is_anagram(word, &candidate);
            (distance, not_anagram, candidate)
        })
        .filter(|(distance, _, _)| *distance <= 2)
        .collect();

    let Some(nearest) = scored.iter().map(|(distance, _, _)| *distance).min() else {
        return Vec::new();
    };
    scored.retain(|(distance, _, _)| *distance == nearest);

    // Swapped letters ("teh") beat a different word at the same distance
    scored.sort();
    scored.into_iter().map(|(_, _, candidate)| candidate).collect()
}

/// Candidate lengths whose ratio with a `len`-char word can reach `cutoff`.
///
/// The ratio is at most `2 * min(a, b) / (a + b)`.
pub fn length_window(len: usize, cutoff: f64) -> RangeInclusive<usize> {
    if cutoff <= 0.0 {
        return 0..=usize::MAX;
    }
    const SLACK: f64 = 1e-9;
    let cutoff = cutoff.min(1.0);
    let shortest = (cutoff * len as f64 / (2.0 - cutoff) - SLACK).ceil() as usize;
    let longest = (len as f64 * (2.0 - cutoff) / cutoff + SLACK).floor() as usize;
    shortest..=longest
}

/// Best `n` vocabulary words whose similarity to `word` is at least `cutoff`.
///
/// Similarity is the Ratcliff/Obershelp ratio `2 * matches / total_len`.
pub fn fuzzy_matches<S>(word: &str, vocabulary: &[S], n: usize, cutoff: f64) -> Vec<String>
where
    S: AsRef<str> + Sync,
{
    if n == 0 || word.is_empty() {
        return Vec::new();
    }

    let target: Vec<char> = word.chars().collect();
    let target_letters = LetterCounts::of(&target);

    let mut scored: Vec<(f64, &str)> = vocabulary
        .par_iter()
        .map(|candidate| AsRef::<str>::as_ref(candidate))
        .filter_map(|candidate| {
            let chars: Vec<char> = candidate.chars().collect();
            let total = (target.len() + chars.len()) as f64;
            // Shared letters bound the matching blocks, so most words stop here
            let bound = 2.0 * target_letters.shared(&LetterCounts::of(&chars)) as f64 / total;
            if bound < cutoff {
                return None;
            }
            let score = similarity(&target, &chars);
            (score >= cutoff).then_some((score, candidate))
        })
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored.truncate(n);
    scored.into_iter().map(|(_, w)| w.to_string()).collect()
}

/// Letter histogram; anything outside `a-z` shares one bucket
struct LetterCounts([u16; 27]);

impl LetterCounts {
    fn of(chars: &[char]) -> Self {
        let mut counts = [0u16; 27];
        for c in chars {
            let slot = match c {
                'a'..='z' => *c as usize - 'a' as usize,
                _ => 26,
            };
            counts[slot] = counts[slot].saturating_add(1);
        }
        Self(counts)
    }

    fn shared(&self, other: &Self) -> usize {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| usize::from(*a.min(b)))
            .sum()
    }
}

/// Ratcliff/Obershelp similarity ratio in `[0, 1]`
pub fn similarity(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(a, b) as f64 / total as f64
}

/// Characters covered by the longest common block and, recursively, the blocks
/// on either side of it.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (start_a, start_b, len) = longest_common_block(a, b);
    if len == 0 {
        return 0;
    }

    len + matching_chars(&a[..start_a], &b[..start_b])
        + matching_chars(&a[start_a + len..], &b[start_b + len..])
}

fn longest_common_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];

    for i in 0..a.len() {
        let mut row = vec![0usize; b.len() + 1];
        for j in 0..b.len() {
            if a[i] == b[j] {
                row[j + 1] = prev[j] + 1;
                if row[j + 1] > best.2 {
                    best = (i + 1 - row[j + 1], j + 1 - row[j + 1], row[j + 1]);
                }
            }
        }
        prev = row;
    }

    best
}

/// Edit distance counting adjacent transpositions as one edit
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut matrix = vec![vec![0; b_len + 1]; a_len + 1];

    for (i, row) in matrix.iter_mut().enumerate().take(a_len + 1) {
        row[0] = i;
    }
    for (j, item) in matrix[0].iter_mut().enumerate().take(b_len + 1) {
        *item = j;
    }

    for i in 1..=a_len {
        for j in 1..=b_len {
            let cost = if a_chars[i - 1] == b_chars[j - 1] { 0 } else { 1 };

            let mut best = std::cmp::min(
                std::cmp::min(
                    matrix[i - 1][j] + 1, // deletion
                    matrix[i][j - 1] + 1, // insertion
                ),
                matrix[i - 1][j - 1] + cost, // substitution
            );

            if i > 1
                && j > 1
                && a_chars[i - 1] == b_chars[j - 2]
                && a_chars[i - 2] == b_chars[j - 1]
            {
                best = best.min(matrix[i - 2][j - 2] + 1); // transposition
            }

            matrix[i][j] = best;
        }
    }

    matrix[a_len][b_len]
}

fn is_anagram(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a_chars: Vec<char> = a.chars().collect();
    let mut b_chars: Vec<char> = b.chars().collect();
    a_chars.sort_unstable();
    b_chars.sort_unstable();
    a_chars == b_chars
}
