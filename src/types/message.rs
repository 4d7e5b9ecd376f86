use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::content::{AgentContent, ContentKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
}

/// One entry of the conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: AgentContent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ContentKind>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn new(role: Role, content: AgentContent, kind: Option<ContentKind>) -> Self {
        Self {
            id: format!("msg_{}", Uuid::new_v4().simple()),
            role,
            content,
            kind,
            timestamp: Utc::now(),
        }
    }

    pub fn user<S: Into<String>>(text: S) -> Self {
        Self::new(Role::User, AgentContent::Text(text.into()), None)
    }

    pub fn agent(content: AgentContent, kind: ContentKind) -> Self {
        Self::new(Role::Agent, content, Some(kind))
    }

    /// Agent-authored entry standing in for a reply that never arrived.
    pub fn agent_error<S: AsRef<str>>(description: S) -> Self {
        Self::agent(
            AgentContent::Text(format!("Error: {}", description.as_ref())),
            ContentKind::Markdown,
        )
    }

    pub fn text(&self) -> Option<&str> {
        self.content.as_text()
    }
}
