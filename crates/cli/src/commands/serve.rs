//! `homie serve` — Start the HTTP gateway.

use homie_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("🏠 Homie Gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    if !config.has_api_key() {
        println!("   ⚠️  No provider API key configured — chat requests will fail");
    }

    homie_gateway::serve(config).await?;

    Ok(())
}
