//! # Homie Core
//!
//! Domain types, traits, and error definitions for the Homie support-chat
//! service. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! The `Provider` trait is the seam to the external completion API; the
//! gateway, CLI, and tests all program against it rather than a concrete
//! HTTP client.

pub mod error;
pub mod message;
pub mod persona;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use error::{DriveError, Error, KnowledgeError, ProviderError, Result};
pub use message::{Conversation, Message, Role};
pub use persona::Persona;
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
