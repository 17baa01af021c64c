//! Query orchestrator sequencing gates, resolvers, compilation and execution

use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog;
use crate::conversation;
use crate::error::{AgentError, Result};
use crate::execution::{QueryEngine, Table};
use crate::filters::{self, FilterSet};
use crate::followups;
use crate::guardrails;
use crate::insights;
use crate::knowledge::{self, title_case, Knowledge};
use crate::llm::IntentClassifier;
use crate::memory::SessionMemory;
use crate::resolver;

lazy_static! {
    static ref MUTATION_RE: Regex = Regex::new(r"\b(drop|delete|truncate|alter)\b").unwrap();
}

/// Metric keyword groups for the explicit-override check. Names align with
/// the first identifier segment of the intents they may override.
const METRIC_KEYWORDS: &[(&str, &[&str])] = &[
    ("revenue", &["revenue"]),
    ("average", &["average", "aov", "order value"]),
    ("units", &["units", "sold"]),
];

fn metric_from_question(q: &str) -> Option<&'static str> {
    METRIC_KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| q.contains(w)))
        .map(|(metric, _)| *metric)
}

fn metric_from_intent(intent: &str) -> &str {
    intent.split('_').next().unwrap_or(intent)
}

/// Successful analysis: the resolved intent, its rows, a markdown heading and
/// an optional canned insight about the leading category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub intent: String,
    pub table: Table,
    pub summary: String,
    pub insight: Option<String>,
}

/// Every question terminates in either a plain text reply or an analysis.
/// Rejections, definitions and error reports all travel as `Message`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AgentReply {
    Message(String),
    Analysis(AnalysisResult),
}

/// Conversational analytics agent over the precomputed Olist views.
/// Holds the per-conversation session memory; one instance per conversation.
pub struct AnalyticsAgent {
    engine: Arc<dyn QueryEngine>,
    classifier: Option<Arc<dyn IntentClassifier>>,
    knowledge: Knowledge,
    memory: SessionMemory,
}

impl AnalyticsAgent {
    pub fn new(engine: Arc<dyn QueryEngine>, knowledge: Knowledge) -> Self {
        Self {
            engine,
            classifier: None,
            knowledge,
            memory: SessionMemory::new(),
        }
    }

    /// Attach a fallback intent classifier, consulted only when the rule
    /// resolvers fail.
    pub fn with_classifier(mut self, classifier: Arc<dyn IntentClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn memory(&self) -> &SessionMemory {
        &self.memory
    }

    pub fn reset_memory(&mut self) {
        self.memory.reset();
    }

    /// Answer one question, mutating session memory only on success.
    pub async fn answer(&mut self, question: &str) -> AgentReply {
        let q = question.trim().to_lowercase();
        info!("💬 Question: {}", question.trim());

        if MUTATION_RE.is_match(&q) {
            warn!("🚫 Mutation keywords in question, rejecting");
            return AgentReply::Message("Unsafe or unsupported query detected.".to_string());
        }

        if q.contains("predict") || q.contains("forecast") {
            return AgentReply::Message(
                "I can’t predict future outcomes with the current dataset.".to_string(),
            );
        }

        if let Some(reply) = conversation::handle_conversation(&q, &self.knowledge) {
            debug!("🗣️ Conversational short-circuit");
            return AgentReply::Message(reply);
        }

        // Computed up front, independent of how the intent resolves.
        let explicit_metric = metric_from_question(&q);

        let (resolved, mut filters) = match followups::handle_follow_up(&q, &self.memory) {
            Some((intent, filters)) => (Some(intent), filters),
            None => {
                let mut intent = resolver::detect_intent(&q).map(str::to_string);
                if intent.is_none() {
                    if let Some(classifier) = &self.classifier {
                        let allowed = catalog::intent_names();
                        intent = classifier.classify(&q, &allowed).await;
                        if let Some(name) = &intent {
                            info!("🤖 Fallback classifier chose '{}'", name);
                        }
                    }
                } else {
                    debug!("🎯 Rules resolved intent {:?}", intent);
                }
                (intent, FilterSet::default())
            }
        };
        let mut intent = resolved;

        // An explicit metric conflicting with the remembered intent discards
        // memory, so a fresh metric question never inherits stale filters.
        let mut last = self.memory.last_intent().map(str::to_string);
        if let Some(metric) = explicit_metric {
            if let Some(prev) = last.as_deref() {
                if metric_from_intent(prev) != metric {
                    info!("♻️ Metric '{}' overrides remembered '{}', clearing memory", metric, prev);
                    last = None;
                    self.memory.reset();
                    filters = FilterSet::default();
                }
            }
        }

        if intent.is_none() {
            intent = last;
        }

        let intent = match intent {
            Some(intent) => intent,
            None => {
                return AgentReply::Message(
                    "Sorry, I couldn’t map this question to a supported analysis.".to_string(),
                );
            }
        };

        if catalog::find(&intent).is_none() {
            return AgentReply::Message("This analysis is not supported yet.".to_string());
        }

        if let Some(category) = knowledge::translate_category(&q) {
            debug!("🏷️ Category filter: {}", category);
            filters.category = Some(category.to_string());
        }

        // A metric asked FOR a specific category must come back as a single
        // row, not as the full ranking filtered down.
        let mut intent = intent;
        if filters.category.is_some() {
            if intent == "revenue_by_category" {
                intent = "highest_revenue_category".to_string();
                filters.limit = Some(1);
            } else if intent == "units_by_category" {
                intent = "most_selling_category".to_string();
                filters.limit = Some(1);
            }
        }

        let table = match self.run_analysis(&intent, &filters).await {
            Ok(table) => table,
            Err(AgentError::Catalog(_)) => {
                return AgentReply::Message(format!(
                    "Intent '{}' not found in SQL templates.",
                    intent
                ));
            }
            Err(e @ AgentError::Validation(_)) => return AgentReply::Message(e.to_string()),
            Err(AgentError::Database(e)) => {
                return AgentReply::Message(format!("Database error: {}", e));
            }
            Err(e) => return AgentReply::Message(format!("Database error: {}", e)),
        };

        if table.is_empty() {
            debug!("📭 Empty result, memory left untouched");
            return AgentReply::Message(
                "No data found for your query. Try adjusting your filters or question.".to_string(),
            );
        }

        self.memory.remember(&intent, filters);
        info!("✅ {} rows for intent '{}'", table.row_count(), intent);

        let insight = insights::generate_insight(&table);
        let summary = format!("### 📊 {}", title_case(&intent));

        AgentReply::Analysis(AnalysisResult {
            intent,
            table,
            summary,
            insight,
        })
    }

    /// Enrichment bullets for the categories present in a result, used by the
    /// rendering layer to ground AI explanations.
    pub fn explanation_context(&self, table: &Table) -> String {
        self.knowledge
            .category_context(&table.distinct_strings("category"), 3)
    }

    async fn run_analysis(&self, intent: &str, filters: &FilterSet) -> Result<Table> {
        let spec = catalog::find(intent)
            .ok_or_else(|| AgentError::Catalog(format!("No SQL template for intent '{}'", intent)))?;
        let sql = filters::apply_filters(spec.sql, filters);
        guardrails::validate_sql(&sql)?;
        info!("🧮 {} on {}: {}", intent, self.engine.name(), sql);
        self.engine.execute(&sql).await
    }
}
