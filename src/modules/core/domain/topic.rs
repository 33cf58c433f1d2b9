//! Topic definitions

use serde::{Deserialize, Serialize};

/// Namespace grouping commands under a common path prefix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    /// Colon-delimited path (`deploy:functions`)
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub hidden: bool,
}

impl Topic {
    /// Create a topic without a description
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            hidden: false,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Description used for topics that do not declare one: `deploy:functions` → `deploy functions commands`
pub fn default_topic_description(name: &str) -> String {
    format!("{} commands", name.replace(':', " "))
}
