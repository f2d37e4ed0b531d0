//! `homie chat` — Send a single message from the terminal.
//!
//! Runs the same pipeline as the gateway: knowledge selection, prompt
//! composition, completion call, reply printed verbatim.

use homie_config::AppConfig;
use homie_core::message::Conversation;
use homie_core::persona::Persona;
use homie_core::provider::ProviderRequest;
use homie_knowledge::{compose, select, FragmentSet, KnowledgeStore};

pub async fn run(message: String) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    HOMIE_API_KEY=sk-...");
        eprintln!("    OPENAI_API_KEY=sk-...");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let store = if config.knowledge.persist {
        KnowledgeStore::open(config.knowledge_path())?
    } else {
        KnowledgeStore::in_memory(FragmentSet::default())
    };

    let persona = match &config.persona_override {
        Some(instructions) => Persona::custom(instructions.clone()),
        None => Persona::homie(),
    };

    let router = homie_providers::build_from_config(&config);
    let provider = router
        .default()
        .ok_or_else(|| format!("No provider registered for {:?}", config.provider))?;

    let fragments = store.snapshot().await;
    let knowledge = select(&message, &fragments);
    let system = compose(&persona.instructions, &knowledge);

    let conversation = Conversation::single_turn(system, &message);
    let request = ProviderRequest {
        model: config.model.clone(),
        messages: conversation.messages,
        temperature: config.temperature,
        max_tokens: Some(config.max_tokens),
    };

    let response = provider.complete(request).await?;
    println!("{}", response.message.content);

    Ok(())
}
