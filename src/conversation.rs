//! Conversational gate answering greetings, small talk and definitions

use lazy_static::lazy_static;
use regex::Regex;

use crate::knowledge::Knowledge;

/// Words that mark a question as analytical. Definition lookups are skipped
/// when any of these occur, so "show revenue by category" never short-circuits
/// into a glossary answer.
pub const ANALYTICAL_TRIGGERS: &[&str] = &[
    "which", "show", "top", "total", "trend", "compare", "highest", "lowest", "average",
];

lazy_static! {
    static ref PUNCTUATION_RE: Regex = Regex::new(r"[^\w\s]").unwrap();
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
}

/// Lower-case, strip punctuation and collapse whitespace. Underscores survive
/// intact, unlike [`crate::knowledge::normalize`] which folds separators.
pub(crate) fn normalize_question(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = PUNCTUATION_RE.replace_all(&lowered, "");
    let collapsed = WHITESPACE_RE.replace_all(&stripped, " ");
    collapsed.trim().to_string()
}

/// Answer small talk and definition questions directly, or return `None` when
/// the question should continue into intent resolution.
pub fn handle_conversation(question: &str, knowledge: &Knowledge) -> Option<String> {
    let q = normalize_question(question);

    // CLV is both a glossary term and an intent name; the definition wins so
    // "define customer lifetime value" never runs a query.
    if q.contains("customer lifetime value") || q.contains("clv") {
        return Some(
            "Customer Lifetime Value (CLV) represents the total revenue a customer \
             is expected to generate over their entire relationship with the business."
                .to_string(),
        );
    }

    if !ANALYTICAL_TRIGGERS.iter().any(|w| q.contains(w)) {
        if let Some(definition) = knowledge.lookup_definition(&q) {
            return Some(definition.to_string());
        }
    }

    match q.as_str() {
        "hi" | "hello" | "hey" | "good morning" | "good evening" => {
            return Some("Hello 👋 I’m your Olist e-commerce analytics assistant.".to_string());
        }
        "how are you" | "how are you doing" => {
            return Some(
                "I’m doing great 😊 Ready to help you explore the Olist e-commerce data."
                    .to_string(),
            );
        }
        "what is your name" | "who are you" => {
            return Some(
                "I’m an AI-powered analytics assistant built to help you analyze \
                 and understand the Brazilian Olist e-commerce dataset."
                    .to_string(),
            );
        }
        _ => {}
    }

    if q.contains("help") || q.contains("what can you do") {
        return Some(
            "I can analyze the Brazilian Olist e-commerce dataset.\n\n\
             Examples:\n\
             - Show revenue by category\n\
             - Highest revenue category\n\
             - Average order value by category\n\
             - Top 5 categories\n"
                .to_string(),
        );
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_question_strips_punctuation() {
        assert_eq!(normalize_question("HELLO!!!"), "hello");
        assert_eq!(normalize_question("  What   is your name ?  "), "what is your name");
        assert_eq!(normalize_question("pet_shop"), "pet_shop");
    }

    #[test]
    fn test_greetings_match_exactly() {
        let knowledge = Knowledge::default();
        let reply = handle_conversation("HELLO!!!", &knowledge).unwrap();
        assert!(reply.contains("Olist e-commerce analytics assistant"));
        assert!(handle_conversation("hello there friend", &knowledge).is_none());
    }

    #[test]
    fn test_small_talk_and_identity() {
        let knowledge = Knowledge::default();
        assert!(handle_conversation("How are you?", &knowledge)
            .unwrap()
            .contains("doing great"));
        assert!(handle_conversation("Who are you?", &knowledge)
            .unwrap()
            .contains("AI-powered analytics assistant"));
    }

    #[test]
    fn test_help_matches_by_containment() {
        let knowledge = Knowledge::default();
        let reply = handle_conversation("what can you do for me", &knowledge).unwrap();
        assert!(reply.contains("Examples:"));
        assert!(reply.contains("Show revenue by category"));
    }

    #[test]
    fn test_clv_definition_beats_intent_resolution() {
        let knowledge = Knowledge::default();
        // Even with the analytical trigger "show", the definition wins.
        let reply = handle_conversation("show customer lifetime value", &knowledge).unwrap();
        assert!(reply.contains("total revenue a customer is expected to generate"));
    }

    #[test]
    fn test_glossary_lookup_for_non_analytical_questions() {
        let knowledge = Knowledge::default();
        let reply = handle_conversation("what is olist", &knowledge).unwrap();
        assert!(reply.contains("Brazilian marketplace"));
    }

    #[test]
    fn test_category_definition_via_alias() {
        let knowledge = Knowledge::default();
        let reply = handle_conversation("what are bed bath products?", &knowledge).unwrap();
        assert!(reply.contains("textiles"));
    }

    #[test]
    fn test_triggers_suppress_definition_lookup() {
        let knowledge = Knowledge::default();
        // "show" marks the question analytical, so the glossary is skipped
        // and the gate passes the question through.
        assert!(handle_conversation("show olist", &knowledge).is_none());
    }

    #[test]
    fn test_analytical_questions_pass_through() {
        let knowledge = Knowledge::default();
        assert!(handle_conversation("show revenue by category", &knowledge).is_none());
        assert!(handle_conversation("top 5 categories", &knowledge).is_none());
    }
}
