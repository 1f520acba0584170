use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

string_enum! {
    pub enum ChatRole {
        System => "system",
        User => "user",
        Assistant => "assistant",
    }
}

/// One message of a conversation, in the shape chat-completion APIs expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub message: String,
    pub is_emergency: bool,
    pub timestamp: DateTime<Utc>,
}

string_enum! {
    pub enum Intent {
        Finder => "finder",
        Symptom => "symptom",
        Navigation => "navigation",
        Education => "education",
    }
}

string_enum! {
    /// Audience of the keyword assistant.
    pub enum AssistantRole {
        Patient => "patient",
        Clinic => "clinic",
        Supplier => "supplier",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatbotStatus {
    pub status: String,
    pub name: String,
    pub description: String,
    pub capabilities: Vec<String>,
    pub disclaimers: Vec<String>,
    pub emergency_number: String,
    pub llm_enabled: bool,
    pub timestamp: DateTime<Utc>,
}
