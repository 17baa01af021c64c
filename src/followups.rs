//! Follow-up detection for "top N" refinements of the previous analysis

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::conversation::normalize_question;
use crate::filters::FilterSet;
use crate::memory::SessionMemory;

lazy_static! {
    static ref TOP_N_RE: Regex = Regex::new(r"(top|give top|show top)\s+(\d+)").unwrap();
}

/// Detect a "top N" refinement such as "top 5" or "show top 3".
///
/// Only meaningful with a remembered intent; the previous filters are cloned
/// with the limit replaced so year/month/category scoping carries over.
/// Returns `None` for anything that is not a well-formed positive refinement.
pub fn handle_follow_up(question: &str, memory: &SessionMemory) -> Option<(String, FilterSet)> {
    let q = normalize_question(question);
    let prev_intent = memory.last_intent()?;

    let caps = TOP_N_RE.captures(&q)?;
    let limit: u32 = caps.get(2)?.as_str().parse().ok()?;
    if limit == 0 {
        return None;
    }

    debug!("🔁 Follow-up: repeating '{}' with limit {}", prev_intent, limit);
    Some((prev_intent.to_string(), memory.last_filters().with_limit(limit)))
}
