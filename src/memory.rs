//! Session memory - conversation-scoped state for follow-up questions
//!
//! Remembers the last successfully executed intent and the filters that were
//! applied, so refinements like "top 3" can reuse the previous analysis.
//! Memory is owned by the agent instance; each conversation gets its own.

use crate::filters::FilterSet;
use serde::{Deserialize, Serialize};

/// Per-conversation memory of the last executed analysis.
///
/// Updated only after successful query execution; error paths and
/// conversational replies leave it untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionMemory {
    last_intent: Option<String>,
    last_filters: FilterSet,
}

impl SessionMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace both the remembered intent and its filters.
    pub fn remember(&mut self, intent: &str, filters: FilterSet) {
        self.last_intent = Some(intent.to_string());
        self.last_filters = filters;
    }

    pub fn last_intent(&self) -> Option<&str> {
        self.last_intent.as_deref()
    }

    pub fn last_filters(&self) -> &FilterSet {
        &self.last_filters
    }

    /// Clear all remembered state.
    pub fn reset(&mut self) {
        self.last_intent = None;
        self.last_filters = FilterSet::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_memory_recalls_nothing() {
        let memory = SessionMemory::new();
        assert!(memory.last_intent().is_none());
        assert!(memory.last_filters().is_empty());
    }

    #[test]
    fn test_remember_replaces_previous_state() {
        let mut memory = SessionMemory::new();
        memory.remember("revenue_by_category", FilterSet::default());
        memory.remember(
            "highest_revenue_category",
            FilterSet {
                limit: Some(1),
                ..Default::default()
            },
        );

        assert_eq!(memory.last_intent(), Some("highest_revenue_category"));
        assert_eq!(memory.last_filters().limit, Some(1));
    }

    #[test]
    fn test_reset_clears_intent_and_filters() {
        let mut memory = SessionMemory::new();
        memory.remember(
            "units_by_category",
            FilterSet {
                category: Some("pet_shop".to_string()),
                ..Default::default()
            },
        );

        memory.reset();

        assert!(memory.last_intent().is_none());
        assert!(memory.last_filters().is_empty());
    }
}
