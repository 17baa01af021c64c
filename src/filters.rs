//! Filter compilation - rewrites SQL templates with resolved filters
//!
//! Templates ship with their own ORDER BY and sometimes a LIMIT. Compilation
//! strips the template LIMIT, lifts the ORDER BY out, injects WHERE predicates
//! for every filter whose target column appears in the template, reattaches
//! the ORDER BY, and applies the row limit as the final clause.

use chrono::{Local, Months};
use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Resolved query parameters applied onto a SQL template.
///
/// The key set is closed; every field is optional. `limit`, when present, is
/// positive, and `category` always holds a canonical category identifier,
/// never raw user text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    /// Calendar year, matched against a `year` column.
    pub year: Option<i32>,
    /// Year-month prefix (e.g. "2017-08"), matched against `year_month`.
    pub month: Option<String>,
    /// Relative window: only rows from the last N calendar months.
    pub months: Option<u32>,
    /// Canonical category identifier.
    pub category: Option<String>,
    /// Row limit, applied as the final clause.
    pub limit: Option<u32>,
}

impl FilterSet {
    pub fn is_empty(&self) -> bool {
        self.year.is_none()
            && self.month.is_none()
            && self.months.is_none()
            && self.category.is_none()
            && self.limit.is_none()
    }

    /// Copy of this filter set with the row limit replaced.
    pub fn with_limit(&self, limit: u32) -> Self {
        let mut filters = self.clone();
        filters.limit = Some(limit);
        filters
    }
}

/// Filter key to candidate column mapping. A predicate is only injected when
/// its column name occurs in the template text, so templates without the
/// column silently ignore the filter.
const YEAR_COLUMNS: &[&str] = &["year"];
const MONTH_COLUMNS: &[&str] = &["year_month"];
const MONTHS_COLUMNS: &[&str] = &["order_purchase_timestamp"];
const CATEGORY_COLUMNS: &[&str] = &["category"];

lazy_static! {
    static ref LIMIT_RE: Regex = Regex::new(r"(?i)\blimit\s+\d+\b").unwrap();
    static ref ORDER_BY_RE: Regex = Regex::new(r"(?i)\border\s+by\s+.+$").unwrap();
}

/// Apply a filter set onto a SQL template, returning the compiled query.
///
/// An empty filter set is the identity transform: the template comes back
/// unchanged. Otherwise any template LIMIT is dropped and the caller's limit
/// (if any) is the single LIMIT in the output, positioned after ORDER BY.
pub fn apply_filters(sql: &str, filters: &FilterSet) -> String {
    if filters.is_empty() {
        return sql.to_string();
    }

    let mut sql_clean = sql.trim().to_string();

    // 1. Remove any existing LIMIT
    sql_clean = LIMIT_RE.replace_all(&sql_clean, "").trim().to_string();

    // 2. Lift out a trailing ORDER BY for reattachment
    let mut order_by = String::new();
    if let Some(m) = ORDER_BY_RE.find(&sql_clean) {
        order_by = m.as_str().to_string();
        sql_clean = sql_clean[..m.start()].trim().to_string();
    }

    let sql_lower = sql_clean.to_lowercase();
    let mut conditions = Vec::new();

    // 3. WHERE predicates, gated on column presence in the template
    if let Some(year) = filters.year {
        for col in YEAR_COLUMNS {
            if sql_lower.contains(col) {
                conditions.push(format!("{} = {}", col, year));
            }
        }
    }
    if let Some(ref month) = filters.month {
        for col in MONTH_COLUMNS {
            if sql_lower.contains(col) {
                conditions.push(format!("{} LIKE '{}%'", col, month));
            }
        }
    }
    if let Some(months) = filters.months {
        for col in MONTHS_COLUMNS {
            if sql_lower.contains(col) {
                if let Some(cutoff) = months_ago(months) {
                    conditions.push(format!("{} >= TIMESTAMP '{}'", col, cutoff));
                }
            }
        }
    }
    if let Some(ref category) = filters.category {
        for col in CATEGORY_COLUMNS {
            if sql_lower.contains(col) {
                conditions.push(format!("{} = '{}'", col, category.replace('\'', "''")));
            }
        }
    }

    if !conditions.is_empty() {
        let joiner = if sql_lower.contains("where") {
            " AND "
        } else {
            " WHERE "
        };
        sql_clean.push_str(joiner);
        sql_clean.push_str(&conditions.iter().join(" AND "));
    }

    // 4. Reattach ORDER BY
    if !order_by.is_empty() {
        sql_clean.push(' ');
        sql_clean.push_str(&order_by);
    }

    // 5. Final LIMIT, exactly once
    if let Some(limit) = filters.limit {
        sql_clean.push_str(&format!(" LIMIT {}", limit));
    }

    sql_clean
}

/// Date N calendar months before now, formatted for a TIMESTAMP literal.
fn months_ago(months: u32) -> Option<String> {
    Local::now()
        .date_naive()
        .checked_sub_months(Months::new(months))
        .map(|d| d.format("%Y-%m-%d").to_string())
}
