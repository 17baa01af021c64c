//! Intent catalog - every supported analysis with its phrases and SQL
//!
//! Each intent binds a stable identifier to the phrase synonyms the resolver
//! matches against and the SQL template the compiler rewrites. Templates query
//! precomputed analytics views only, never raw tables, and carry no
//! placeholders.
//!
//! Declaration order is a documented contract: the resolver scans intents in
//! this order and returns the first match, which is what lets
//! `average_order_value_by_category` win over the plain `average_order_value`
//! phrase it contains.

/// One supported analysis: identifier, matchable phrases, SQL template.
#[derive(Debug)]
pub struct IntentSpec {
    /// Stable identifier, also the metric prefix used for scoping
    /// (e.g. `revenue_by_category` implies the `revenue` metric).
    pub name: &'static str,

    /// Phrase synonyms in priority order. May be empty for intents reachable
    /// only through the fallback classifier or session memory.
    pub phrases: &'static [&'static str],

    /// Parametrization-free SELECT over analytics views.
    pub sql: &'static str,
}

pub const INTENTS: &[IntentSpec] = &[
    // -- Revenue analytics --
    IntentSpec {
        name: "highest_revenue_category",
        phrases: &[
            "highest revenue category",
            "category with highest revenue",
            "most revenue generating category",
            "which category has the highest revenue",
            "what category has highest revenue",
            "top revenue category",
        ],
        sql: "SELECT category, revenue FROM v_category_revenue ORDER BY revenue DESC LIMIT 1",
    },
    IntentSpec {
        name: "lowest_revenue_category",
        phrases: &["lowest revenue category", "least revenue category"],
        sql: "SELECT category, revenue FROM v_category_revenue ORDER BY revenue ASC LIMIT 1",
    },
    IntentSpec {
        name: "revenue_by_category",
        phrases: &[
            "revenue by category",
            "category wise revenue",
            "show revenue by category",
            "list revenue by category",
        ],
        sql: "SELECT category, revenue FROM v_category_revenue ORDER BY revenue DESC",
    },
    IntentSpec {
        name: "yearly_revenue",
        phrases: &["yearly revenue", "revenue by year"],
        sql: "SELECT year, revenue FROM v_yearly_revenue ORDER BY year",
    },
    IntentSpec {
        name: "monthly_revenue_trend",
        phrases: &["monthly revenue", "revenue by month"],
        sql: "SELECT year_month, revenue FROM v_monthly_revenue ORDER BY year_month",
    },
    IntentSpec {
        name: "category_revenue_by_year",
        phrases: &["category revenue by year"],
        sql: "SELECT year, category, revenue FROM v_category_year_revenue \
              ORDER BY year, revenue DESC",
    },
    // -- Sales / units analytics --
    IntentSpec {
        name: "most_selling_category",
        phrases: &["most selling category"],
        sql: "SELECT category, units_sold FROM v_category_units_sold \
              ORDER BY units_sold DESC LIMIT 1",
    },
    IntentSpec {
        // No phrases: reached via the fallback classifier or memory only.
        name: "least_selling_category",
        phrases: &[],
        sql: "SELECT category, units_sold FROM v_category_units_sold \
              ORDER BY units_sold ASC LIMIT 1",
    },
    IntentSpec {
        name: "units_by_category",
        phrases: &["units sold by category"],
        sql: "SELECT category, units_sold FROM v_category_units_sold ORDER BY units_sold DESC",
    },
    // -- Product analytics --
    IntentSpec {
        name: "top_products_by_revenue",
        phrases: &["top products by revenue"],
        sql: "SELECT product_id, category, revenue FROM v_product_performance \
              ORDER BY revenue DESC LIMIT 10",
    },
    IntentSpec {
        name: "top_products_by_units",
        phrases: &["top selling products"],
        sql: "SELECT product_id, category, units_sold FROM v_product_performance \
              ORDER BY units_sold DESC LIMIT 10",
    },
    IntentSpec {
        name: "product_performance",
        phrases: &["product performance"],
        sql: "SELECT product_id, category, revenue, units_sold, avg_rating \
              FROM v_product_performance ORDER BY revenue DESC",
    },
    // -- Customer analytics --
    IntentSpec {
        name: "customer_lifetime_value",
        phrases: &["customer lifetime value"],
        sql: "SELECT customer_state, SUM(lifetime_value) AS total_ltv FROM v_customer_ltv \
              GROUP BY customer_state ORDER BY total_ltv DESC",
    },
    IntentSpec {
        name: "top_customers",
        phrases: &["top customers"],
        sql: "SELECT customer_id, lifetime_value FROM v_customer_ltv \
              ORDER BY lifetime_value DESC LIMIT 10",
    },
    // -- Seller analytics --
    IntentSpec {
        name: "top_sellers_by_revenue",
        phrases: &["top sellers"],
        sql: "SELECT seller_id, seller_state, revenue FROM v_seller_performance \
              ORDER BY revenue DESC LIMIT 10",
    },
    IntentSpec {
        name: "seller_performance",
        phrases: &["seller performance"],
        sql: "SELECT seller_state, revenue, avg_rating FROM v_seller_performance \
              ORDER BY revenue DESC",
    },
    // -- Payment analytics --
    IntentSpec {
        name: "payment_type_analysis",
        phrases: &["payment methods", "payment type usage"],
        sql: "SELECT payment_type, orders, revenue, avg_payment FROM v_payment_analysis \
              ORDER BY revenue DESC",
    },
    // -- Order value analytics --
    IntentSpec {
        name: "average_order_value_by_category",
        phrases: &[
            "average order value by category",
            "aov by category",
            "average order value per category",
        ],
        sql: "SELECT category, average_order_value FROM v_category_aov \
              ORDER BY average_order_value DESC",
    },
    IntentSpec {
        name: "average_order_value",
        phrases: &["average order value", "what is average order value"],
        sql: "SELECT total_orders, total_revenue, average_order_value FROM v_order_value_metrics",
    },
];

/// Look up an intent by identifier.
pub fn find(name: &str) -> Option<&'static IntentSpec> {
    INTENTS.iter().find(|intent| intent.name == name)
}

/// All intent identifiers, in catalog order. Used as the allowed list for the
/// fallback classifier.
pub fn intent_names() -> Vec<&'static str> {
    INTENTS.iter().map(|intent| intent.name).collect()
}

/// Distinct view names referenced by the templates, in first-use order.
/// The preflight checks these against the configured database.
pub fn referenced_views() -> Vec<&'static str> {
    let mut views = Vec::new();
    for intent in INTENTS {
        let mut tokens = intent.sql.split_whitespace();
        while let Some(token) = tokens.next() {
            if token.eq_ignore_ascii_case("from") {
                if let Some(view) = tokens.next() {
                    if !views.contains(&view) {
                        views.push(view);
                    }
                }
            }
        }
    }
    views
}
