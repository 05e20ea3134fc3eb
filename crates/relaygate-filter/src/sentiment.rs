// SPDX-FileCopyrightText: 2026 Relaygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic sentiment classification by keyword counting.
//!
//! Counts fixed positive/negative keyword occurrences (case-insensitive
//! substring presence) and labels the message by strict majority. Feeds
//! diagnostic metadata only; admission never depends on it.

use relaygate_core::Sentiment;

/// Positive keyword list (contains, case-insensitive).
const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "excellent", "awesome", "love", "like", "happy",
];

/// Negative keyword list (contains, case-insensitive).
const NEGATIVE_WORDS: &[&str] = &[
    "bad", "terrible", "awful", "hate", "dislike", "sad", "angry",
];

/// Classify message sentiment by keyword-presence counting.
///
/// Returns `Positive` if more positive keywords are present than negative,
/// `Negative` for the reverse, and `Neutral` on equality.
pub fn classify_sentiment(text: &str) -> Sentiment {
    let lower = text.to_lowercase();

    let positive = POSITIVE_WORDS.iter().filter(|w| lower.contains(*w)).count();
    let negative = NEGATIVE_WORDS.iter().filter(|w| lower.contains(*w)).count();

    if positive > negative {
        Sentiment::Positive
    } else if negative > positive {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}
