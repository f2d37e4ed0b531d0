//! `homie knowledge` — Show or replace knowledge sections.

use clap::Subcommand;
use homie_config::AppConfig;
use homie_knowledge::{Category, KnowledgeStore};

#[derive(Subcommand)]
pub enum KnowledgeAction {
    /// Print every section and its size
    Show,

    /// Replace a section's text from a file
    Set {
        /// Section key: policies, procedures, repairCosts, eligibility
        section: String,

        /// Path to the file holding the new text
        file: std::path::PathBuf,
    },
}

pub async fn run(action: KnowledgeAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let store = KnowledgeStore::open(config.knowledge_path())?;

    match action {
        KnowledgeAction::Show => {
            let snapshot = store.snapshot().await;
            println!("🏠 Knowledge base ({})", config.knowledge_path().display());
            for category in Category::ALL {
                let text = snapshot.get(category);
                if text.is_empty() {
                    println!("   {:<12} (empty)", category.key());
                } else {
                    println!("   {:<12} {} chars", category.key(), text.len());
                }
            }
        }
        KnowledgeAction::Set { section, file } => {
            let category = Category::from_key(&section)?;
            let content = std::fs::read_to_string(&file)
                .map_err(|e| format!("Failed to read {}: {e}", file.display()))?;
            store.replace(category, &content).await?;
            println!("✅ Replaced {} ({} chars)", category.key(), content.len());
        }
    }

    Ok(())
}
