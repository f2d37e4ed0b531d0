//! Completion provider implementations for Homie.
//!
//! All providers implement the `homie_core::Provider` trait.
//! The router selects the correct provider based on configuration.

pub mod openai_compat;
pub mod router;

pub use openai_compat::OpenAiCompatProvider;
pub use router::{build_from_config, ProviderRouter};
