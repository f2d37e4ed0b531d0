//! Knowledge Selector — keyword-triggered fragment retrieval.
//!
//! Pure function over (query, fragment snapshot). Rules are evaluated
//! independently in table order; a query can fire zero, one, or several
//! rules. Matching is case-insensitive substring containment.

use crate::category::Category;
use crate::store::FragmentSet;

/// A trigger rule: if any keyword occurs in the query, the listed
/// categories are appended in order.
struct Rule {
    triggers: &'static [&'static str],
    categories: &'static [Category],
}

/// The rule table, in evaluation order.
///
/// Policy and Eligibility are coupled: policy-flavored queries get both.
/// Trigger sets are currently disjoint, but the selector does not rely on
/// that — a category reachable from two rules would be appended twice
/// (known open question; kept literal rather than deduplicated).
const RULES: [Rule; 3] = [
    Rule {
        triggers: &["policy", "buybox", "eligibility"],
        categories: &[Category::Policy, Category::Eligibility],
    },
    Rule {
        triggers: &["floor plan", "floorplan"],
        categories: &[Category::Procedure],
    },
    Rule {
        triggers: &["repair", "cost", "estimate"],
        categories: &[Category::RepairCost],
    },
];

/// Select the knowledge block for a query.
///
/// Returns the matched fragments' text joined by line breaks, or an empty
/// string when nothing matches (including the empty query). Matched
/// categories with empty text still contribute a zero-length segment.
pub fn select(query: &str, fragments: &FragmentSet) -> String {
    let lowered = query.to_lowercase();

    let mut segments: Vec<&str> = Vec::new();
    for rule in &RULES {
        if rule.triggers.iter().any(|kw| lowered.contains(kw)) {
            for category in rule.categories {
                segments.push(fragments.get(*category));
            }
        }
    }

    segments.join("\n")
}
