// SPDX-FileCopyrightText: 2026 Relaygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lexical content safety checks on raw message text.
//!
//! These are intentionally simplistic pattern matches, not a classifier:
//! a blocked-word list plus fixed structural thresholds for shouting,
//! punctuation density, and platform message length.

use tracing::{debug, warn};

/// Platform maximum message size in characters.
const MAX_MESSAGE_LEN: usize = 2000;

/// Minimum length before the all-caps check applies.
const ALL_CAPS_MIN_LEN: usize = 10;

/// Maximum allowed ratio of punctuation/special characters to total length.
const SPECIAL_CHAR_RATIO_LIMIT: f64 = 0.3;

/// The punctuation/special character set counted toward the ratio check.
const SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{};':\"\\|,.<>?";

/// Checks raw message text against the configured blocked-word list and a
/// set of fixed structural heuristics.
#[derive(Debug, Clone)]
pub struct ContentSafetyGate {
    /// Blocked substrings, stored lowercase.
    blocked_words: Vec<String>,
}

impl ContentSafetyGate {
    /// Create a gate with the given blocked substrings (case-insensitive).
    pub fn new(blocked_words: &[String]) -> Self {
        Self {
            blocked_words: blocked_words.iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    /// Returns `true` if the text is safe to relay.
    ///
    /// Rejects when the text contains a blocked substring, is shouted
    /// (longer than 10 characters and entirely upper-case), exceeds a 0.3
    /// special-character ratio, or exceeds the platform's 2000-character
    /// ceiling. Empty input is treated as unsafe rather than an error.
    pub fn is_safe(&self, text: &str) -> bool {
        if text.is_empty() {
            warn!("content safety check on empty message, treating as unsafe");
            return false;
        }

        let lower = text.to_lowercase();
        if let Some(word) = self.blocked_words.iter().find(|w| lower.contains(w.as_str())) {
            debug!(blocked_word = %word, "message contains blocked word");
            return false;
        }

        let char_count = text.chars().count();

        if char_count > ALL_CAPS_MIN_LEN && is_all_uppercase(text) {
            debug!("message rejected for excessive caps");
            return false;
        }

        let special_count = text.chars().filter(|c| SPECIAL_CHARS.contains(*c)).count();
        let special_ratio = special_count as f64 / char_count as f64;
        if special_ratio > SPECIAL_CHAR_RATIO_LIMIT {
            debug!(special_ratio, "message rejected for excessive special characters");
            return false;
        }

        if char_count > MAX_MESSAGE_LEN {
            debug!(char_count, "message rejected for exceeding platform length limit");
            return false;
        }

        true
    }

    /// Add a blocked word (case-insensitive, idempotent).
    pub fn add_blocked_word(&mut self, word: &str) {
        let word = word.to_lowercase();
        if !self.blocked_words.contains(&word) {
            self.blocked_words.push(word);
        }
    }

    /// Remove a blocked word (case-insensitive).
    pub fn remove_blocked_word(&mut self, word: &str) {
        let word = word.to_lowercase();
        self.blocked_words.retain(|w| *w != word);
    }
}

/// Whether the text has at least one cased character and no lower-case ones.
fn is_all_uppercase(text: &str) -> bool {
    let has_cased = text.chars().any(|c| c.is_uppercase() || c.is_lowercase());
    has_cased && !text.chars().any(char::is_lowercase)
}
