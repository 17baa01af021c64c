//! Canned business insight for well-known top categories

use itertools::Itertools;

use crate::execution::Table;
use crate::knowledge::title_case;

/// Curated reasons shown when one of these categories leads a result.
pub const CATEGORY_INSIGHTS: &[(&str, &[&str])] = &[
    (
        "cama_mesa_banho",
        &[
            "Broad product range covering daily essentials",
            "High repeat purchase frequency",
            "Strong seasonal demand",
            "Competitive pricing on Olist",
        ],
    ),
    (
        "beleza_saude",
        &[
            "High repeat consumption products",
            "Strong brand loyalty",
            "Health and wellness demand growth",
        ],
    ),
];

/// Markdown insight block for the leading category of a result, or `None`
/// when the result has no category column or no canned reasons exist for it.
pub fn generate_insight(table: &Table) -> Option<String> {
    let top = table.top_value("category")?.as_str()?;
    let reasons = CATEGORY_INSIGHTS
        .iter()
        .find(|(category, _)| *category == top)
        .map(|(_, reasons)| *reasons)?;

    let bullets = reasons.iter().map(|reason| format!("- {}", reason)).join("\n");
    Some(format!(
        "### 💡 Why this category performs well\n\n**{}**\n\n{}",
        title_case(top),
        bullets
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table_with_top(category: &str) -> Table {
        Table::new(
            vec!["category".to_string(), "revenue".to_string()],
            vec![
                vec![json!(category), json!(1500.0)],
                vec![json!("telefonia"), json!(900.0)],
            ],
        )
    }

    #[test]
    fn test_insight_for_leading_known_category() {
        let insight = generate_insight(&table_with_top("cama_mesa_banho")).unwrap();
        assert!(insight.contains("**Cama Mesa Banho**"));
        assert!(insight.contains("- Broad product range covering daily essentials"));
        assert!(insight.contains("- Competitive pricing on Olist"));
    }

    #[test]
    fn test_no_insight_for_uncurated_category() {
        assert!(generate_insight(&table_with_top("pet_shop")).is_none());
    }

    #[test]
    fn test_no_insight_without_category_column() {
        let table = Table::new(
            vec!["year".to_string(), "revenue".to_string()],
            vec![vec![json!(2017), json!(100.0)]],
        );
        assert!(generate_insight(&table).is_none());
    }

    #[test]
    fn test_no_insight_for_empty_result() {
        let table = Table::new(vec!["category".to_string()], vec![]);
        assert!(generate_insight(&table).is_none());
    }
}
