//! Folder sync — extract, categorize, and store.
//!
//! One file's failure never aborts the batch: errors are collected into
//! the report beside the count of files that made it through.

use crate::client::{DriveClient, DriveFile};
use homie_core::error::DriveError;
use homie_knowledge::{Category, KnowledgeStore};
use tracing::{debug, info, warn};

/// Outcome of a folder sync.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SyncReport {
    pub processed_files: usize,
    pub total_files: usize,
    pub errors: Vec<String>,
}

/// Pick the knowledge category for a file from its name.
///
/// The keyword table mirrors the selector's topics; files that match
/// nothing land in Policy as general reference material.
pub fn categorize_file(file_name: &str) -> Category {
    let name = file_name.to_lowercase();

    if name.contains("policy") || name.contains("procedure") || name.contains("guideline") {
        return Category::Policy;
    }
    if name.contains("floor") || name.contains("plan") || name.contains("layout") {
        return Category::Procedure;
    }
    if name.contains("cost") || name.contains("price") || name.contains("estimate") {
        return Category::RepairCost;
    }
    if name.contains("eligibility")
        || name.contains("qualification")
        || name.contains("requirement")
    {
        return Category::Eligibility;
    }

    Category::Policy
}

/// Sync a Drive folder into the knowledge store.
///
/// Listing the folder is the only hard failure; everything after is
/// per-file and recoverable.
pub async fn sync_folder(
    client: &dyn DriveClient,
    store: &KnowledgeStore,
    folder_id: &str,
) -> Result<SyncReport, DriveError> {
    let files = client.list_folder(folder_id).await?;
    info!(folder_id, count = files.len(), "Syncing Drive folder");

    let total_files = files.len();
    let mut processed_files = 0;
    let mut errors = Vec::new();

    for file in &files {
        match process_file(client, store, file).await {
            Ok(true) => processed_files += 1,
            Ok(false) => debug!(file = %file.name, "Skipped file (no text content)"),
            Err(e) => {
                warn!(file = %file.name, error = %e, "Failed to process file");
                errors.push(format!("Error processing {}: {e}", file.name));
            }
        }
    }

    Ok(SyncReport {
        processed_files,
        total_files,
        errors,
    })
}

/// Returns true when the file contributed content to the store.
async fn process_file(
    client: &dyn DriveClient,
    store: &KnowledgeStore,
    file: &DriveFile,
) -> Result<bool, DriveError> {
    let Some(content) = client.fetch_text(file).await? else {
        return Ok(false);
    };

    if content.trim().is_empty() {
        return Ok(false);
    }

    let category = categorize_file(&file.name);
    store
        .replace(category, &content)
        .await
        .map_err(|e| DriveError::ExtractionFailed {
            file_name: file.name.clone(),
            reason: e.to_string(),
        })?;

    debug!(file = %file.name, category = %category, "Stored file content");
    Ok(true)
}
