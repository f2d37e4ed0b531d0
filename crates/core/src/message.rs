//! Message and Conversation domain types.
//!
//! These are the value objects that flow through the system:
//! a user message arrives at the gateway, gets wrapped with the persona
//! and any matched knowledge, and goes out to the completion provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role of a message sender in a conversation.
///
/// The system and user channels are distinct on purpose: persona/context
/// guidance and the raw user query are never merged into one message, so
/// the provider keeps its own prioritization between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The assistant's reply
    Assistant,
    /// Persona instructions and knowledge context
    System,
}

/// A single message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// An ordered sequence of messages sent to the provider as one request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conversation {
    /// Ordered messages
    pub messages: Vec<Message>,
}

impl Conversation {
    /// Create a new empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// A single-turn support exchange: system instructions plus the query.
    pub fn single_turn(system: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system), Message::user(query)],
        }
    }

    /// Add a message to the conversation.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }
}
