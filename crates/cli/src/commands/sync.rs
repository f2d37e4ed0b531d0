//! `homie sync` — Pull a Drive folder into the knowledge base.

use homie_config::AppConfig;
use homie_drive::{sync_folder, HttpDriveClient};
use homie_knowledge::{FragmentSet, KnowledgeStore};

pub async fn run(folder_override: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let Some(token) = config.drive.access_token.clone() else {
        return Err("No Drive access token configured (set DRIVE_ACCESS_TOKEN)".into());
    };

    let Some(folder_id) = folder_override.or_else(|| config.drive.folder_id.clone()) else {
        return Err("No folder ID given and none configured (use --folder)".into());
    };

    let store = if config.knowledge.persist {
        KnowledgeStore::open(config.knowledge_path())?
    } else {
        KnowledgeStore::in_memory(FragmentSet::default())
    };

    let client = HttpDriveClient::new(token);
    let report = sync_folder(&client, &store, &folder_id).await?;

    println!("🏠 Drive sync completed");
    println!("   Processed: {}/{} files", report.processed_files, report.total_files);
    for error in &report.errors {
        println!("   ⚠️  {error}");
    }

    Ok(())
}
