//! The closed topic taxonomy.
//!
//! Every knowledge fragment belongs to exactly one category. The set is
//! closed: administrative updates and the Drive sync both resolve their
//! free-text labels through the single key table here, so the two
//! vocabularies cannot drift apart.

use homie_core::error::KnowledgeError;
use serde::{Deserialize, Serialize};

/// A knowledge category.
///
/// `ALL` is the canonical enumeration order; the selector appends matched
/// fragments in this order within each rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "policies")]
    Policy,
    #[serde(rename = "procedures")]
    Procedure,
    #[serde(rename = "repairCosts")]
    RepairCost,
    #[serde(rename = "eligibility")]
    Eligibility,
}

impl Category {
    /// All categories in enumeration order.
    pub const ALL: [Category; 4] = [
        Category::Policy,
        Category::Procedure,
        Category::RepairCost,
        Category::Eligibility,
    ];

    /// The external key used in API payloads and the store file.
    pub fn key(self) -> &'static str {
        match self {
            Category::Policy => "policies",
            Category::Procedure => "procedures",
            Category::RepairCost => "repairCosts",
            Category::Eligibility => "eligibility",
        }
    }

    /// Resolve an external key, case-sensitively.
    ///
    /// Unknown keys are an error, not a default: no `general` alias, no
    /// silent remapping into `policies`.
    pub fn from_key(key: &str) -> Result<Self, KnowledgeError> {
        match key {
            "policies" => Ok(Category::Policy),
            "procedures" => Ok(Category::Procedure),
            "repairCosts" => Ok(Category::RepairCost),
            "eligibility" => Ok(Category::Eligibility),
            other => Err(KnowledgeError::UnknownCategory(other.to_string())),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}
