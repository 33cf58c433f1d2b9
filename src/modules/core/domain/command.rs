//! Command definitions

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Flag;

/// Command registered by a plugin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    /// Colon-delimited id (`deploy:functions`); defaults to the manifest key
    #[serde(default)]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Hidden commands are never completed
    #[serde(default)]
    pub hidden: bool,

    /// Alternative ids for this command
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,

    /// When set, aliases still work but are no longer advertised
    #[serde(default)]
    pub deprecate_aliases: bool,

    /// Flags keyed by long name, in declaration order
    #[serde(default)]
    pub flags: IndexMap<String, Flag>,

    /// Path of the full command definition, relative to the manifest
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Command {
    /// Create a new command with the given id
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            summary: None,
            description: None,
            hidden: false,
            aliases: Vec::new(),
            deprecate_aliases: false,
            flags: IndexMap::new(),
            source: None,
        }
    }

    /// Set the summary
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Add a flag, keyed by its name
    pub fn with_flag(mut self, flag: Flag) -> Self {
        self.flags.insert(flag.name.clone(), flag);
        self
    }

    /// Add an alias
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Hide the command
    pub fn hide(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Summary, falling back to the description
    pub fn summary_text(&self) -> Option<&str> {
        self.summary.as_deref().or(self.description.as_deref())
    }

    /// Returns true if `id` is this command's id or one of its aliases
    pub fn answers_to(&self, id: &str) -> bool {
        self.id == id || self.aliases.iter().any(|a| a == id)
    }

    /// Find a flag by long name or short char (dashes optional)
    pub fn find_flag(&self, token: &str) -> Option<&Flag> {
        self.flags.values().find(|f| f.matches(token))
    }

    /// Flags that are not hidden, in declaration order
    pub fn visible_flags(&self) -> impl Iterator<Item = &Flag> {
        self.flags.values().filter(|f| !f.hidden)
    }
}
