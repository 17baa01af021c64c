//! Domain knowledge - category aliases, glossary, enrichment text
//!
//! Maps free-text category mentions (English synonyms, romanized Portuguese)
//! to canonical Olist category identifiers, and serves definition/enrichment
//! text for conversational answers and result context. Glossary and
//! enrichment entries load from JSON files at startup, falling back to
//! compiled-in defaults when the files are absent.

use crate::error::{AgentError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Category aliases in declaration order. Earlier entries win on overlapping
/// matches; this order is the contract, not an accident of map iteration.
pub const CATEGORY_ALIASES: &[(&str, &[&str])] = &[
    (
        "cama_mesa_banho",
        &[
            "bed bath",
            "bed table bath",
            "home textiles",
            "cama mesa banho",
            "bed and bath",
        ],
    ),
    (
        "beleza_saude",
        &["beauty", "health", "cosmetics", "personal care", "beleza saude"],
    ),
    (
        "moveis_decoracao",
        &["furniture", "home decor", "decor", "moveis decoracao"],
    ),
    (
        "eletrodomesticos",
        &["home appliances", "appliances", "eletrodomesticos"],
    ),
    (
        "telefonia",
        &["phones", "smartphones", "mobile phones", "telefonia"],
    ),
    ("pet_shop", &["pet products", "pet supplies", "pet shop"]),
];

lazy_static! {
    static ref SEPARATORS_RE: Regex = Regex::new(r"[_\-]").unwrap();
    static ref PUNCTUATION_RE: Regex = Regex::new(r"[^\w\s]").unwrap();
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
}

/// Normalization for alias and glossary matching: lower-case, fold
/// underscores and hyphens to spaces, drop punctuation, collapse whitespace.
pub fn normalize(text: &str) -> String {
    let text = text.to_lowercase();
    let text = SEPARATORS_RE.replace_all(&text, " ");
    let text = PUNCTUATION_RE.replace_all(&text, "");
    let text = WHITESPACE_RE.replace_all(&text, " ");
    text.trim().to_string()
}

/// Title-case an identifier for display: `cama_mesa_banho` -> `Cama Mesa Banho`.
pub(crate) fn title_case(text: &str) -> String {
    text.replace('_', " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Translate a category mention anywhere in the text to its canonical
/// identifier, by alias containment. First declared alias wins.
pub fn translate_category(text: &str) -> Option<&'static str> {
    let q_norm = normalize(text);

    for (category, aliases) in CATEGORY_ALIASES {
        for alias in *aliases {
            if q_norm.contains(&normalize(alias)) {
                return Some(category);
            }
        }
    }

    None
}

/// Glossary term with its definition text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlossaryEntry {
    pub term: String,
    pub definition: String,
}

/// Business enrichment text for one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub category: String,
    pub description: String,
}

/// Startup-loaded read-only knowledge base.
#[derive(Debug, Clone)]
pub struct Knowledge {
    glossary: Vec<GlossaryEntry>,
    categories: Vec<CategoryInfo>,
}

impl Default for Knowledge {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Knowledge {
    /// Load glossary and enrichment files from a knowledge directory.
    /// Missing files fall back to the compiled-in defaults; malformed files
    /// are an error.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let builtin = Self::builtin();

        let glossary = match read_entries::<GlossaryEntry>(&dir.join("glossary.json"))? {
            Some(entries) => entries,
            None => {
                debug!("No glossary file under {:?}, using built-in entries", dir);
                builtin.glossary
            }
        };

        let categories =
            match read_entries::<CategoryInfo>(&dir.join("product_enrichment.json"))? {
                Some(entries) => entries,
                None => {
                    debug!(
                        "No enrichment file under {:?}, using built-in entries",
                        dir
                    );
                    builtin.categories
                }
            };

        info!(
            "📚 Knowledge loaded: {} glossary terms, {} category profiles",
            glossary.len(),
            categories.len()
        );

        Ok(Self {
            glossary,
            categories,
        })
    }

    /// Compiled-in knowledge, used when no files are present.
    pub fn builtin() -> Self {
        let glossary = [
            (
                "aov",
                "AOV (average order value) is total revenue divided by the number of \
                 distinct orders, a core measure of basket size.",
            ),
            (
                "gmv",
                "GMV (gross merchandise value) is the total value of merchandise sold \
                 through the marketplace before fees and refunds.",
            ),
            (
                "olist",
                "Olist is a Brazilian marketplace platform connecting small sellers to \
                 large e-commerce channels; this dataset covers its 2016-2018 orders.",
            ),
            (
                "freight",
                "Freight is the shipping charge paid by the buyer, recorded per order \
                 item alongside the product price.",
            ),
            (
                "payment installments",
                "Payment installments split an order's value across monthly credit card \
                 charges, a common checkout option in Brazil.",
            ),
        ];

        let categories = [
            (
                "cama_mesa_banho",
                "Bed, table and bath textiles - sheets, towels and home linens. The \
                 highest-volume category on Olist, driven by everyday essentials.",
            ),
            (
                "beleza_saude",
                "Beauty and health products - cosmetics, personal care and wellness \
                 items with frequent repeat purchases.",
            ),
            (
                "moveis_decoracao",
                "Furniture and home decor - decorative pieces and small furniture with \
                 higher ticket sizes and freight costs.",
            ),
            (
                "eletrodomesticos",
                "Home appliances - kitchen and household electricals, a mid-volume \
                 category with strong price sensitivity.",
            ),
            (
                "telefonia",
                "Telephony - phones and mobile accessories, dominated by low-cost \
                 accessories rather than handsets.",
            ),
            (
                "pet_shop",
                "Pet products - food, toys and supplies with loyal repeat buyers.",
            ),
        ];

        Self {
            glossary: glossary
                .into_iter()
                .map(|(term, definition)| GlossaryEntry {
                    term: term.to_string(),
                    definition: definition.to_string(),
                })
                .collect(),
            categories: categories
                .into_iter()
                .map(|(category, description)| CategoryInfo {
                    category: category.to_string(),
                    description: description.to_string(),
                })
                .collect(),
        }
    }

    /// Definition or category explanation for a free-text question.
    ///
    /// Priority: glossary terms, then alias-resolved category enrichment,
    /// then direct category-name containment.
    pub fn lookup_definition(&self, query: &str) -> Option<&str> {
        let q_norm = normalize(query);

        for entry in &self.glossary {
            if q_norm.contains(&normalize(&entry.term)) {
                return Some(&entry.definition);
            }
        }

        for (category, aliases) in CATEGORY_ALIASES {
            for alias in *aliases {
                if q_norm.contains(&normalize(alias)) {
                    return self.category_description(category);
                }
            }
        }

        for info in &self.categories {
            if q_norm.contains(&normalize(&info.category)) {
                return Some(&info.description);
            }
        }

        None
    }

    /// Enrichment text for a canonical category identifier.
    pub fn category_description(&self, category: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|info| info.category == category)
            .map(|info| info.description.as_str())
    }

    /// Markdown bullet block of enrichment for up to `max_items` result
    /// categories. Used to ground explanations in business context.
    pub fn category_context(&self, categories: &[String], max_items: usize) -> String {
        let bullets: Vec<String> = categories
            .iter()
            .take(max_items)
            .filter_map(|category| {
                self.category_description(category)
                    .map(|description| format!("- **{}**: {}", title_case(category), description))
            })
            .collect();

        if bullets.is_empty() {
            return "No additional category context available.".to_string();
        }

        bullets.join("\n")
    }
}

fn read_entries<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<Vec<T>>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    let entries: Vec<T> = serde_json::from_str(&content)
        .map_err(|e| AgentError::Knowledge(format!("Failed to parse {:?}: {}", path, e)))?;
    Ok(Some(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_normalize_folds_separators_and_punctuation() {
        assert_eq!(normalize("Cama_Mesa-Banho!!"), "cama mesa banho");
        assert_eq!(normalize("  what   is  AOV? "), "what is aov");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("cama_mesa_banho"), "Cama Mesa Banho");
        assert_eq!(title_case("revenue_by_category"), "Revenue By Category");
    }

    #[test]
    fn test_translate_category_by_english_alias() {
        assert_eq!(
            translate_category("show revenue for bed bath"),
            Some("cama_mesa_banho")
        );
        assert_eq!(
            translate_category("how are mobile phones doing"),
            Some("telefonia")
        );
    }

    #[test]
    fn test_translate_category_containment_not_exact_match() {
        // The alias only has to occur somewhere in the text.
        assert_eq!(
            translate_category("I want the furniture numbers please"),
            Some("moveis_decoracao")
        );
    }

    #[test]
    fn test_translate_category_declaration_order_wins() {
        // "bed bath" (cama_mesa_banho) is declared before "health"
        // (beleza_saude); a text containing both resolves to the former.
        assert_eq!(
            translate_category("bed bath and health products"),
            Some("cama_mesa_banho")
        );
    }

    #[test]
    fn test_translate_category_no_match() {
        assert_eq!(translate_category("show yearly revenue"), None);
    }

    #[test]
    fn test_lookup_definition_prefers_glossary() {
        let knowledge = Knowledge::builtin();
        let definition = knowledge.lookup_definition("what is aov").unwrap();
        assert!(definition.contains("average order value"));
    }

    #[test]
    fn test_lookup_definition_via_alias() {
        let knowledge = Knowledge::builtin();
        let text = knowledge.lookup_definition("what are bed bath products").unwrap();
        assert!(text.contains("textiles"));
    }

    #[test]
    fn test_lookup_definition_via_direct_category_name() {
        let knowledge = Knowledge::builtin();
        let text = knowledge.lookup_definition("what is cama mesa banho").unwrap();
        assert!(text.contains("textiles"));
    }

    #[test]
    fn test_lookup_definition_unknown_term() {
        let knowledge = Knowledge::builtin();
        assert!(knowledge.lookup_definition("quantum chromodynamics").is_none());
    }

    #[test]
    fn test_category_context_caps_items_and_titles_names() {
        let knowledge = Knowledge::builtin();
        let context = knowledge.category_context(
            &[
                "cama_mesa_banho".to_string(),
                "beleza_saude".to_string(),
                "telefonia".to_string(),
                "pet_shop".to_string(),
            ],
            3,
        );
        assert!(context.contains("**Cama Mesa Banho**"));
        assert!(context.contains("**Telefonia**"));
        assert!(!context.contains("Pet Shop"));
    }

    #[test]
    fn test_category_context_without_known_categories() {
        let knowledge = Knowledge::builtin();
        let context = knowledge.category_context(&["unknown_stuff".to_string()], 3);
        assert_eq!(context, "No additional category context available.");
    }

    #[test]
    fn test_load_from_files_overrides_builtin() -> std::result::Result<(), Box<dyn std::error::Error>>
    {
        let dir = tempfile::tempdir()?;
        let mut glossary = std::fs::File::create(dir.path().join("glossary.json"))?;
        write!(
            glossary,
            r#"[{{"term": "nps", "definition": "Net promoter score."}}]"#
        )?;

        let knowledge = Knowledge::load(dir.path())?;
        assert_eq!(
            knowledge.lookup_definition("what is nps"),
            Some("Net promoter score.")
        );
        // Enrichment file absent, so the built-in categories still answer.
        assert!(knowledge.lookup_definition("what is pet shop").is_some());
        Ok(())
    }

    #[test]
    fn test_load_missing_dir_falls_back_to_builtin() {
        let knowledge = Knowledge::load("definitely/not/a/dir").unwrap();
        assert!(knowledge.lookup_definition("what is gmv").is_some());
    }
}
