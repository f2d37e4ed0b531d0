//! The fragment store — the only shared mutable state in the service.
//!
//! Readers call [`KnowledgeStore::snapshot`] and get an `Arc` to an
//! immutable [`FragmentSet`]; administrative updates build a whole new set
//! and swap it in under a write lock. A category's text is replaced as one
//! value, never edited in place.
//!
//! Persistence is a single TOML document (category key → text) loaded on
//! open and rewritten on every replace.

use crate::category::Category;
use homie_core::error::KnowledgeError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// An immutable mapping from every category to its current text.
///
/// Entries may be empty; the selector still appends a zero-length segment
/// for a matched empty category and the composer treats the result as
/// "no content".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentSet {
    #[serde(default)]
    policies: String,
    #[serde(default)]
    procedures: String,
    #[serde(default, rename = "repairCosts")]
    repair_costs: String,
    #[serde(default)]
    eligibility: String,
}

impl FragmentSet {
    /// The text for a category (possibly empty).
    pub fn get(&self, category: Category) -> &str {
        match category {
            Category::Policy => &self.policies,
            Category::Procedure => &self.procedures,
            Category::RepairCost => &self.repair_costs,
            Category::Eligibility => &self.eligibility,
        }
    }

    /// A copy of this set with one category's text replaced wholesale.
    pub fn with(&self, category: Category, text: impl Into<String>) -> Self {
        let mut next = self.clone();
        let slot = match category {
            Category::Policy => &mut next.policies,
            Category::Procedure => &mut next.procedures,
            Category::RepairCost => &mut next.repair_costs,
            Category::Eligibility => &mut next.eligibility,
        };
        *slot = text.into();
        next
    }

    /// True when every category is empty.
    pub fn is_empty(&self) -> bool {
        Category::ALL.iter().all(|c| self.get(*c).is_empty())
    }
}

/// The process-wide knowledge store.
///
/// Owned by the composition root and passed by reference; never a
/// module-level singleton.
pub struct KnowledgeStore {
    current: RwLock<Arc<FragmentSet>>,
    path: Option<PathBuf>,
}

impl KnowledgeStore {
    /// An in-memory store starting from the given set (tests, ephemeral runs).
    pub fn in_memory(initial: FragmentSet) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
            path: None,
        }
    }

    /// Open a file-backed store.
    ///
    /// A missing file starts the store empty; the file is created on the
    /// first replace. A corrupt file is an error rather than silent data loss.
    pub fn open(path: PathBuf) -> Result<Self, KnowledgeError> {
        let initial = match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                KnowledgeError::Storage(format!(
                    "Failed to parse knowledge file {}: {e}",
                    path.display()
                ))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No knowledge file yet, starting empty");
                FragmentSet::default()
            }
            Err(e) => {
                return Err(KnowledgeError::Storage(format!(
                    "Failed to read knowledge file {}: {e}",
                    path.display()
                )));
            }
        };

        Ok(Self {
            current: RwLock::new(Arc::new(initial)),
            path: Some(path),
        })
    }

    /// Default store path: `~/.homie/knowledge.toml`.
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".homie").join("knowledge.toml")
    }

    /// A consistent snapshot of the full fragment set.
    pub async fn snapshot(&self) -> Arc<FragmentSet> {
        self.current.read().await.clone()
    }

    /// Atomically replace one category's entire text.
    ///
    /// Validates that the content is non-empty, builds the successor set,
    /// persists it (when file-backed), then swaps. Readers holding the old
    /// snapshot keep seeing the old, complete set.
    pub async fn replace(
        &self,
        category: Category,
        content: &str,
    ) -> Result<(), KnowledgeError> {
        if content.trim().is_empty() {
            return Err(KnowledgeError::EmptyContent);
        }

        let mut guard = self.current.write().await;
        let next = Arc::new(guard.with(category, content));

        if let Some(path) = &self.path {
            Self::persist(path, &next)?;
        }

        debug!(category = %category, content_len = content.len(), "Knowledge section replaced");
        *guard = next;
        Ok(())
    }

    fn persist(path: &PathBuf, set: &FragmentSet) -> Result<(), KnowledgeError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                KnowledgeError::Storage(format!("Failed to create knowledge directory: {e}"))
            })?;
        }

        let content = toml::to_string_pretty(set)
            .map_err(|e| KnowledgeError::Storage(format!("Failed to serialize knowledge: {e}")))?;

        std::fs::write(path, content).map_err(|e| {
            warn!(path = %path.display(), error = %e, "Knowledge flush failed");
            KnowledgeError::Storage(format!("Failed to write knowledge file: {e}"))
        })
    }
}
