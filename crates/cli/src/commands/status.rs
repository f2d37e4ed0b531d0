//! `homie status` — Show configuration status.

use homie_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!("🏠 Homie Status");
    println!("===============");
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    println!("  Provider:     {}", config.provider);
    println!("  Model:        {}", config.model);
    println!("  Temperature:  {}", config.temperature);
    println!("  Max tokens:   {}", config.max_tokens);
    println!("  Gateway:      {}:{}", config.gateway.host, config.gateway.port);
    println!("  Knowledge:    {}", config.knowledge_path().display());
    println!(
        "  Provider key: {}",
        if config.has_api_key() { "configured" } else { "missing" }
    );
    println!(
        "  Drive token:  {}",
        if config.has_drive_token() { "configured" } else { "missing" }
    );

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file — defaults in effect");
    }

    Ok(())
}
