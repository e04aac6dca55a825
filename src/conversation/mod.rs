//! Chat message types and the append-only history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::Category;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    /// Which rule answered; assistant messages only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Message {
    pub fn user(content: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::User,
            content: content.to_string(),
            category: None,
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: &str, category: Category) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::Assistant,
            content: content.to_string(),
            category: Some(category),
            timestamp: Utc::now(),
        }
    }
}

/// Messages in the order they were sent. Never edited, only appended or cleared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
