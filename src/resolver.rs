//! Rule-based intent resolution over the static catalog

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::catalog;

/// Metric keyword groups scanned in priority order; the first group with a
/// substring hit in the question becomes the detected metric.
pub const METRIC_PRIORITY: &[(&str, &[&str])] = &[
    ("revenue", &["revenue"]),
    ("average_order_value", &["average", "aov", "order value"]),
    ("units", &["units", "sold"]),
];

lazy_static! {
    static ref WORD_RE: Regex = Regex::new(r"\b\w+\b").unwrap();
}

/// First metric whose keyword group matches the (lower-cased) question.
pub fn detect_metric(question: &str) -> Option<&'static str> {
    METRIC_PRIORITY
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| question.contains(k)))
        .map(|(metric, _)| *metric)
}

fn word_set(question: &str) -> HashSet<&str> {
    WORD_RE.find_iter(question).map(|m| m.as_str()).collect()
}

/// Order-insensitive match: every word of a multi-word phrase occurs
/// somewhere in the question. Single-word phrases never match here.
fn all_phrase_words_present(phrase: &str, words: &HashSet<&str>) -> bool {
    let phrase_words: Vec<&str> = phrase.split_whitespace().collect();
    phrase_words.len() >= 2 && phrase_words.iter().all(|w| words.contains(w))
}

/// Resolve a question to an intent identifier, or `None` when no phrase
/// matches and the caller should fall back to the classifier or memory.
///
/// Three steps: detect an explicit metric, prefer intents whose identifier is
/// prefixed by that metric, then scan the whole catalog. Catalog order and
/// phrase order are the only tie-breakers, so resolution is a pure function
/// of the question text.
pub fn detect_intent(question: &str) -> Option<&'static str> {
    let lowered = question.to_lowercase();
    let q = lowered.trim();
    let words = word_set(q);

    if let Some(metric) = detect_metric(q) {
        debug!("🔍 Detected metric '{}' in question", metric);
        for spec in catalog::INTENTS.iter().filter(|s| s.name.starts_with(metric)) {
            for &phrase in spec.phrases {
                if q.contains(phrase) || all_phrase_words_present(phrase, &words) {
                    return Some(spec.name);
                }
            }
        }
    }

    for spec in catalog::INTENTS {
        for &phrase in spec.phrases {
            let matched = if phrase.split_whitespace().count() == 1 {
                words.contains(phrase)
            } else {
                q.contains(phrase) || all_phrase_words_present(phrase, &words)
            };
            if matched {
                return Some(spec.name);
            }
        }
    }

    None
}
